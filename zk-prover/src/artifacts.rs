//! Fixed file layout for circuit artifacts and per-record proof files.

use std::path::{Path, PathBuf};

/// Locations of the precompiled circuit artifacts and the external tools.
///
/// The artifacts are produced offline (circom compile + Groth16 setup) and
/// shipped next to the service; nothing here is generated at runtime.
#[derive(Clone, Debug)]
pub struct CircuitArtifacts {
    pub circuit_dir: PathBuf,
    pub node_bin: String,
    pub snarkjs_bin: String,
}

impl CircuitArtifacts {
    pub fn new(circuit_dir: impl Into<PathBuf>) -> Self {
        Self {
            circuit_dir: circuit_dir.into(),
            node_bin: "node".to_string(),
            snarkjs_bin: "snarkjs".to_string(),
        }
    }

    /// Read locations from the environment, falling back to the layout the
    /// circuit build produces (`circuit/` next to the binary).
    pub fn from_env() -> Self {
        let circuit_dir = std::env::var("CIRCUIT_DIR").unwrap_or_else(|_| "circuit".to_string());
        let node_bin = std::env::var("NODE_BIN").unwrap_or_else(|_| "node".to_string());
        let snarkjs_bin = std::env::var("SNARKJS_BIN").unwrap_or_else(|_| "snarkjs".to_string());

        Self {
            circuit_dir: PathBuf::from(circuit_dir),
            node_bin,
            snarkjs_bin,
        }
    }

    /// Compiled circuit (wasm), consumed by the witness generator.
    pub fn wasm(&self) -> PathBuf {
        self.circuit_dir.join("medical_records.wasm")
    }

    /// The witness-generator script emitted by the circuit compiler.
    pub fn witness_generator(&self) -> PathBuf {
        self.circuit_dir.join("generate_witness.js")
    }

    /// Groth16 proving key from the setup ceremony.
    pub fn proving_key(&self) -> PathBuf {
        self.circuit_dir.join("medical_records_0001.zkey")
    }

    /// Groth16 verification key (JSON, as exported by snarkjs).
    pub fn verification_key(&self) -> PathBuf {
        self.circuit_dir.join("verification_key.json")
    }
}

/// Per-record working files, all inside the record's own directory.
#[derive(Clone, Debug)]
pub struct RecordPaths {
    pub dir: PathBuf,
}

impl RecordPaths {
    pub fn new(records_dir: &Path, record_id: &str) -> Self {
        Self {
            dir: records_dir.join(record_id),
        }
    }

    pub fn input(&self) -> PathBuf {
        self.dir.join("input.json")
    }

    pub fn witness(&self) -> PathBuf {
        self.dir.join("witness.wtns")
    }

    pub fn proof(&self) -> PathBuf {
        self.dir.join("proof.json")
    }

    pub fn public_signals(&self) -> PathBuf {
        self.dir.join("public.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_live_under_circuit_dir() {
        let artifacts = CircuitArtifacts::new("/opt/circuit");
        assert_eq!(artifacts.wasm(), PathBuf::from("/opt/circuit/medical_records.wasm"));
        assert_eq!(artifacts.proving_key(), PathBuf::from("/opt/circuit/medical_records_0001.zkey"));
        assert_eq!(artifacts.verification_key(), PathBuf::from("/opt/circuit/verification_key.json"));
    }

    #[test]
    fn record_files_live_under_record_dir() {
        let paths = RecordPaths::new(Path::new("data/records"), "abc123");
        assert_eq!(paths.input(), PathBuf::from("data/records/abc123/input.json"));
        assert_eq!(paths.witness(), PathBuf::from("data/records/abc123/witness.wtns"));
        assert_eq!(paths.proof(), PathBuf::from("data/records/abc123/proof.json"));
        assert_eq!(paths.public_signals(), PathBuf::from("data/records/abc123/public.json"));
    }
}
