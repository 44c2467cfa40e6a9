//! Proof orchestration: drive the external witness generator and prover over
//! a record's working files, then archive the results in the store.

use crate::db;
use crate::errors::ApiError;
use crate::models::RecordStatus;
use crate::state::AppState;
use std::path::Path;
use tracing::{error, info};
use zk_prover::artifacts::RecordPaths;
use zk_prover::snarkjs;
use zk_prover::types::CircuitInput;

/// Write a record's `input.json`, creating the record directory if needed.
pub async fn write_input(paths: &RecordPaths, input: &CircuitInput) -> Result<(), ApiError> {
    tokio::fs::create_dir_all(&paths.dir)
        .await
        .map_err(|_| ApiError::Internal)?;

    let json = serde_json::to_string_pretty(input).map_err(|_| ApiError::Internal)?;
    tokio::fs::write(paths.input(), json)
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(())
}

/// Run witness generation and Groth16 proving for a record, then archive the
/// proof and public signals in the store and mark the record proven.
///
/// The record must already have a complete `input.json` on disk. On failure
/// the record stays in `proof_requested`.
pub async fn generate_record_proof(state: &AppState, record_id: &str) -> Result<(), ApiError> {
    let paths = state.record_paths(record_id);

    snarkjs::generate_witness(&state.artifacts, &paths)
        .await
        .map_err(|e| {
            error!(%record_id, error = %e, "witness generation failed");
            ApiError::Internal
        })?;

    snarkjs::prove(&state.artifacts, &paths).await.map_err(|e| {
        error!(%record_id, error = %e, "proof generation failed");
        ApiError::Internal
    })?;

    let proof = read_json(&paths.proof()).await?;
    let public_signals = read_json(&paths.public_signals()).await?;

    db::insert_proof(&state.db, record_id, &proof, &public_signals).await?;
    db::set_record_status(&state.db, record_id, RecordStatus::ProofGenerated).await?;

    info!(%record_id, "proof generated");
    Ok(())
}

/// Check a record's proof with the external verifier.
///
/// The verifier works on files, so if the working copies are gone they are
/// restored from the store first. Returns `NotFound` when neither exists.
pub async fn verify_record_proof(state: &AppState, record_id: &str) -> Result<bool, ApiError> {
    let paths = state.record_paths(record_id);

    if !snarkjs::proof_files_exist(&paths) {
        let Some((proof, public_signals)) = db::get_proof(&state.db, record_id).await? else {
            return Err(ApiError::NotFound("proof not found".to_string()));
        };

        tokio::fs::create_dir_all(&paths.dir)
            .await
            .map_err(|_| ApiError::Internal)?;
        write_json(&paths.proof(), &proof).await?;
        write_json(&paths.public_signals(), &public_signals).await?;

        info!(%record_id, "restored proof files from store");
    }

    let valid = snarkjs::verify(&state.artifacts, &paths).await.map_err(|e| {
        error!(%record_id, error = %e, "verification failed");
        ApiError::Internal
    })?;

    Ok(valid)
}

async fn read_json(path: &Path) -> Result<serde_json::Value, ApiError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ApiError::Internal)?;
    serde_json::from_str(&text).map_err(|_| ApiError::Internal)
}

async fn write_json(path: &Path, value: &serde_json::Value) -> Result<(), ApiError> {
    let text = serde_json::to_string_pretty(value).map_err(|_| ApiError::Internal)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|_| ApiError::Internal)
}
