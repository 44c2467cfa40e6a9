use crate::errors::ApiError;
use crate::models::RecordStatus;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use zk_prover::types::CircuitInput;

pub type Db = Pool<Sqlite>;

pub async fn connect(db_url: &str) -> Result<Db, ApiError> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|_| ApiError::Internal)
}

pub async fn init_schema(db: &Db) -> Result<(), ApiError> {
    // NOTE: The store keeps the full numeric input document as JSON; the
    // proof rows are opaque blobs produced by the external prover.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS records (
  id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  last_modified TEXT NOT NULL,
  status TEXT NOT NULL,
  input_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS proofs (
  record_id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  proof_json TEXT NOT NULL,
  public_signals_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS access_log (
  record_id TEXT NOT NULL,
  at TEXT NOT NULL,
  doctor_id INTEGER,
  action TEXT NOT NULL,
  result INTEGER
);
"#,
    )
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn insert_record(db: &Db, record_id: &str, input: &CircuitInput) -> Result<(), ApiError> {
    let now = Utc::now().to_rfc3339();
    let input_json = serde_json::to_string(input).map_err(|_| ApiError::Internal)?;

    sqlx::query(
        r#"INSERT INTO records (id, created_at, last_modified, status, input_json)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(record_id)
    .bind(&now)
    .bind(&now)
    .bind(RecordStatus::Pending.as_str())
    .bind(input_json)
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn update_record_input(
    db: &Db,
    record_id: &str,
    input: &CircuitInput,
    status: RecordStatus,
) -> Result<(), ApiError> {
    let now = Utc::now().to_rfc3339();
    let input_json = serde_json::to_string(input).map_err(|_| ApiError::Internal)?;

    sqlx::query(r#"UPDATE records SET input_json = ?, status = ?, last_modified = ? WHERE id = ?"#)
        .bind(input_json)
        .bind(status.as_str())
        .bind(now)
        .bind(record_id)
        .execute(db)
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn set_record_status(db: &Db, record_id: &str, status: RecordStatus) -> Result<(), ApiError> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(r#"UPDATE records SET status = ?, last_modified = ? WHERE id = ?"#)
        .bind(status.as_str())
        .bind(now)
        .bind(record_id)
        .execute(db)
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn get_record(
    db: &Db,
    record_id: &str,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, String, CircuitInput)>, ApiError> {
    let row = sqlx::query(
        r#"SELECT created_at, last_modified, status, input_json FROM records WHERE id = ?"#,
    )
    .bind(record_id)
    .fetch_optional(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    let Some(row) = row else { return Ok(None); };

    let created_at: String = row.get(0);
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|_| ApiError::Internal)?
        .with_timezone(&Utc);

    let last_modified: String = row.get(1);
    let last_modified = DateTime::parse_from_rfc3339(&last_modified)
        .map_err(|_| ApiError::Internal)?
        .with_timezone(&Utc);

    let status: String = row.get(2);

    let input_json: String = row.get(3);
    let input: CircuitInput = serde_json::from_str(&input_json).map_err(|_| ApiError::Internal)?;

    Ok(Some((created_at, last_modified, status, input)))
}

pub async fn insert_proof(
    db: &Db,
    record_id: &str,
    proof: &Value,
    public_signals: &Value,
) -> Result<(), ApiError> {
    let created_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT OR REPLACE INTO proofs (record_id, created_at, proof_json, public_signals_json)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(record_id)
    .bind(created_at)
    .bind(proof.to_string())
    .bind(public_signals.to_string())
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn get_proof(db: &Db, record_id: &str) -> Result<Option<(Value, Value)>, ApiError> {
    let row = sqlx::query(r#"SELECT proof_json, public_signals_json FROM proofs WHERE record_id = ?"#)
        .bind(record_id)
        .fetch_optional(db)
        .await
        .map_err(|_| ApiError::Internal)?;

    let Some(row) = row else { return Ok(None); };

    let proof_json: String = row.get(0);
    let public_json: String = row.get(1);

    let proof: Value = serde_json::from_str(&proof_json).map_err(|_| ApiError::Internal)?;
    let public_signals: Value = serde_json::from_str(&public_json).map_err(|_| ApiError::Internal)?;

    Ok(Some((proof, public_signals)))
}

pub async fn append_access(
    db: &Db,
    record_id: &str,
    doctor_id: Option<i64>,
    action: &str,
    result: Option<bool>,
) -> Result<(), ApiError> {
    let at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO access_log (record_id, at, doctor_id, action, result)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(record_id)
    .bind(at)
    .bind(doctor_id)
    .bind(action)
    .bind(result.map(|r| if r { 1i64 } else { 0i64 }))
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

/// In-memory store for tests. A single connection, so every query sees the
/// same database.
#[cfg(test)]
pub(crate) async fn connect_in_memory() -> Db {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&db).await.expect("schema");
    db
}
