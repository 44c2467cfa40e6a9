//! ZK layer for the medical-records proof service.
//!
//! The Groth16 circuit for this system is compiled ahead of time; witness
//! calculation, proving and verification all run through external command-line
//! tools against precompiled artifacts (circuit wasm, witness generator,
//! proving/verification keys). This crate contains:
//! - The numeric code tables shared with the circuit.
//! - The circuit-input document (field names bound to the circuit's signals).
//! - Artifact and per-record file layout.
//! - The subprocess layer that drives the external tools.

pub mod artifacts;
pub mod codes;
pub mod snarkjs;
pub mod types;
