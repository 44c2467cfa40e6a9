//! Subprocess layer over the external witness generator and the snarkjs CLI.
//!
//! Every call is a single synchronous tool invocation against fixed file
//! paths; the tools own all binary formats (wtns, zkey) and this crate never
//! parses them.

use crate::artifacts::{CircuitArtifacts, RecordPaths};
use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    Failed { tool: &'static str, stderr: String },

    #[error("{tool} did not produce {}", .path.display())]
    MissingOutput { tool: &'static str, path: PathBuf },
}

fn require(path: PathBuf) -> Result<PathBuf, RunnerError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(RunnerError::MissingArtifact(path))
    }
}

async fn run(tool: &'static str, cmd: &mut Command) -> Result<std::process::Output, RunnerError> {
    let output = cmd
        .output()
        .await
        .map_err(|source| RunnerError::Launch { tool, source })?;

    if !output.status.success() {
        return Err(RunnerError::Failed {
            tool,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Calculate the witness for a record's `input.json`.
///
/// Runs `node generate_witness.js <wasm> <input.json> <witness.wtns>`.
pub async fn generate_witness(
    artifacts: &CircuitArtifacts,
    record: &RecordPaths,
) -> Result<(), RunnerError> {
    let generator = require(artifacts.witness_generator())?;
    let wasm = require(artifacts.wasm())?;

    run(
        "witness generator",
        Command::new(&artifacts.node_bin)
            .arg(generator)
            .arg(wasm)
            .arg(record.input())
            .arg(record.witness()),
    )
    .await?;

    if !record.witness().exists() {
        return Err(RunnerError::MissingOutput {
            tool: "witness generator",
            path: record.witness(),
        });
    }

    Ok(())
}

/// Produce a Groth16 proof and public signals for a record's witness.
///
/// Runs `snarkjs groth16 prove <zkey> <witness.wtns> <proof.json> <public.json>`.
pub async fn prove(artifacts: &CircuitArtifacts, record: &RecordPaths) -> Result<(), RunnerError> {
    let zkey = require(artifacts.proving_key())?;

    run(
        "snarkjs prove",
        Command::new(&artifacts.snarkjs_bin)
            .args(["groth16", "prove"])
            .arg(zkey)
            .arg(record.witness())
            .arg(record.proof())
            .arg(record.public_signals()),
    )
    .await?;

    // snarkjs has been observed to exit 0 without writing outputs.
    for path in [record.proof(), record.public_signals()] {
        if !path.exists() {
            return Err(RunnerError::MissingOutput {
                tool: "snarkjs prove",
                path,
            });
        }
    }

    Ok(())
}

/// Check a record's proof against the verification key.
///
/// Runs `snarkjs groth16 verify <vkey> <public.json> <proof.json>` and reads
/// the verdict off stdout; the CLI prints `OK!` for a valid proof.
pub async fn verify(artifacts: &CircuitArtifacts, record: &RecordPaths) -> Result<bool, RunnerError> {
    let vkey = require(artifacts.verification_key())?;

    let output = run(
        "snarkjs verify",
        Command::new(&artifacts.snarkjs_bin)
            .args(["groth16", "verify"])
            .arg(vkey)
            .arg(record.public_signals())
            .arg(record.proof()),
    )
    .await?;

    Ok(verdict_from_stdout(&String::from_utf8_lossy(&output.stdout)))
}

/// `true` iff the verifier printed its `OK` verdict.
fn verdict_from_stdout(stdout: &str) -> bool {
    stdout.lines().any(|line| line.contains("OK"))
}

/// Convenience for callers that only need to know whether a record has proof
/// files on disk.
pub fn proof_files_exist(record: &RecordPaths) -> bool {
    record.proof().exists() && record.public_signals().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn verdict_requires_ok_on_some_line() {
        assert!(verdict_from_stdout("[INFO]  snarkJS: OK!\n"));
        assert!(verdict_from_stdout("junk\n[INFO]  snarkJS: OK!\n"));
        assert!(!verdict_from_stdout("[ERROR] snarkJS: Invalid proof\n"));
        assert!(!verdict_from_stdout(""));
    }

    #[test]
    fn require_rejects_missing_paths() {
        let err = require(PathBuf::from("/nonexistent/medical_records.wasm")).unwrap_err();
        assert!(matches!(err, RunnerError::MissingArtifact(_)));
    }

    #[test]
    fn proof_files_exist_is_false_for_empty_dir() {
        let record = RecordPaths::new(Path::new("/nonexistent"), "r1");
        assert!(!proof_files_exist(&record));
    }
}
