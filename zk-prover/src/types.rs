//! The circuit-input document shared between the HTTP layer and the witness
//! generator.

use serde::{Deserialize, Serialize};

/// Full input assignment for the medical-records circuit.
///
/// IMPORTANT: The JSON field names MUST match the circuit's signal names;
/// the witness generator resolves inputs by name. All values are numeric
/// (timestamps are unix seconds, categorical fields are codes from
/// [`crate::codes`], 0 means "not yet provided").
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInput {
    pub patient_age: u64,
    pub department_id: u64,
    pub condition_severity: u64,
    pub admission_date: u64,
    pub discharge_date: u64,
    pub doctor_id: u64,
    pub treatment_code: u64,

    /// Public signals, revealed by every proof.
    pub public_department_id: u64,
    pub public_admission_year: u64,
}

impl CircuitInput {
    /// Initial assignment right after submit: only the basic info is known,
    /// every clinical field is still 0.
    pub fn initial(patient_age: u64, department_id: u64, admission_date: u64, admission_year: u64) -> Self {
        Self {
            patient_age,
            department_id,
            condition_severity: 0,
            admission_date,
            discharge_date: 0,
            doctor_id: 0,
            treatment_code: 0,
            public_department_id: department_id,
            public_admission_year: admission_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_circuit_signal_names() {
        let input = CircuitInput::initial(47, 1, 1_700_000_000, 2023);
        let json = serde_json::to_value(&input).unwrap();

        // The witness generator matches these names against the circuit.
        assert_eq!(json["patientAge"], 47);
        assert_eq!(json["departmentId"], 1);
        assert_eq!(json["conditionSeverity"], 0);
        assert_eq!(json["admissionDate"], 1_700_000_000u64);
        assert_eq!(json["publicDepartmentId"], 1);
        assert_eq!(json["publicAdmissionYear"], 2023);
    }

    #[test]
    fn roundtrips_through_json() {
        let input = CircuitInput::initial(80, 3, 1_600_000_000, 2020);
        let text = serde_json::to_string_pretty(&input).unwrap();
        let back: CircuitInput = serde_json::from_str(&text).unwrap();
        assert_eq!(back.patient_age, 80);
        assert_eq!(back.public_admission_year, 2020);
    }
}
