use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zk_prover::codes::{department_code, doctor_code, severity_code};
use zk_prover::types::CircuitInput;

/// Record lifecycle. A record starts `pending`, moves to `proof_requested`
/// when an update kicks off the external prover, and to `proof_generated`
/// once the proof and public signals are archived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    ProofRequested,
    ProofGenerated,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::ProofRequested => "proof_requested",
            RecordStatus::ProofGenerated => "proof_generated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RecordStatus::Pending),
            "proof_requested" => Some(RecordStatus::ProofRequested),
            "proof_generated" => Some(RecordStatus::ProofGenerated),
            _ => None,
        }
    }
}

/// Record ids are opaque 32-hex strings, also used as directory names.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ids come back from clients as path segments; anything that is not plain
/// alphanumeric is rejected before it gets near a path join.
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Calendar (UTC) year for an admission timestamp in unix seconds.
pub fn admission_year(ts: i64) -> Option<u64> {
    if ts <= 0 {
        return None;
    }
    Utc.timestamp_opt(ts, 0).single().map(|dt| dt.year() as u64)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBasicInfoRequest {
    pub patient_age: u64,

    /// Department name, e.g. "CARDIOLOGY". Case-insensitive.
    pub department: String,

    /// Admission time, unix seconds.
    pub admission_date: i64,
}

impl SubmitBasicInfoRequest {
    /// Validate and convert into the initial circuit-input document.
    pub fn to_circuit_input(&self) -> Result<CircuitInput, String> {
        if self.patient_age > 120 {
            return Err("patientAge out of range".to_string());
        }

        let department_id = department_code(&self.department)
            .ok_or_else(|| format!("unknown department: {}", self.department))?;

        let year = admission_year(self.admission_date)
            .ok_or_else(|| "admissionDate out of range".to_string())?;

        Ok(CircuitInput::initial(
            self.patient_age,
            department_id,
            self.admission_date as u64,
            year,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBasicInfoResponse {
    pub message: String,
    pub record_id: String,
    pub update_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    /// Severity name, e.g. "MODERATE". Case-insensitive.
    pub severity: String,

    /// Discharge time, unix seconds.
    pub discharge_date: i64,

    /// Doctor identifier; the numeric part is what reaches the circuit.
    pub doctor_id: String,

    pub treatment_code: u64,
}

impl UpdateRecordRequest {
    /// Validate and merge the clinical fields into an existing input document.
    pub fn apply(&self, input: &mut CircuitInput) -> Result<(), String> {
        let severity = severity_code(&self.severity)
            .ok_or_else(|| format!("unknown severity: {}", self.severity))?;

        if self.discharge_date < 0 {
            return Err("dischargeDate out of range".to_string());
        }

        input.condition_severity = severity;
        input.discharge_date = self.discharge_date as u64;
        input.doctor_id = doctor_code(&self.doctor_id);
        input.treatment_code = self.treatment_code;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordResponse {
    pub message: String,
    pub verify_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
    pub record_id: String,

    /// None when the record was recovered from the on-disk fallback and the
    /// store has no row for it.
    pub status: Option<RecordStatus>,

    pub data: CircuitInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub record_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRecordResponse {
    pub public_info: PublicInfo,
}

/// The subset of a record every proof reveals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicInfo {
    pub department: u64,
    pub admission_year: u64,
    pub last_modified: DateTime<Utc>,
}
