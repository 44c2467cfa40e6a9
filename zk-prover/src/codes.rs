//! Crate-wide code tables shared between the circuit and the HTTP layer.
//!
//! The circuit only ever sees field elements, so every categorical value in a
//! record is mapped to a small positive integer before it reaches the witness
//! generator. Code 0 is reserved for "not yet provided".

/// Department names and their circuit codes.
pub const DEPARTMENTS: [(&str, u64); 5] = [
    ("CARDIOLOGY", 1),
    ("NEUROLOGY", 2),
    ("ONCOLOGY", 3),
    ("PEDIATRICS", 4),
    ("GENERAL", 5),
];

/// Condition severity names and their circuit codes.
pub const SEVERITIES: [(&str, u64); 5] = [
    ("HEALTHY", 1),
    ("MILD", 2),
    ("MODERATE", 3),
    ("SEVERE", 4),
    ("CRITICAL", 5),
];

/// Map a department name to its circuit code. Case-insensitive.
pub fn department_code(name: &str) -> Option<u64> {
    let name = name.trim().to_ascii_uppercase();
    DEPARTMENTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Map a severity name to its circuit code. Case-insensitive.
pub fn severity_code(name: &str) -> Option<u64> {
    let name = name.trim().to_ascii_uppercase();
    SEVERITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Extract the numeric part of a doctor identifier ("DR-1042" -> 1042).
///
/// Identifiers without any digits map to 0, matching the circuit's
/// "not provided" convention. Only the first 18 digits are kept so the
/// result always fits in a u64.
pub fn doctor_code(id: &str) -> u64 {
    let digits: String = id.chars().filter(char::is_ascii_digit).take(18).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_lookup_is_case_insensitive() {
        assert_eq!(department_code("cardiology"), Some(1));
        assert_eq!(department_code("  Pediatrics "), Some(4));
        assert_eq!(department_code("GENERAL"), Some(5));
    }

    #[test]
    fn unknown_names_map_to_none() {
        assert_eq!(department_code("RADIOLOGY"), None);
        assert_eq!(severity_code(""), None);
    }

    #[test]
    fn severity_lookup() {
        assert_eq!(severity_code("critical"), Some(5));
        assert_eq!(severity_code("HEALTHY"), Some(1));
    }

    #[test]
    fn doctor_code_strips_non_digits() {
        assert_eq!(doctor_code("DR-1042"), 1042);
        assert_eq!(doctor_code("dr.7"), 7);
        assert_eq!(doctor_code("HOUSE"), 0);
        // Overlong ids are truncated rather than rejected.
        assert_eq!(doctor_code("9999999999999999999999"), 999999999999999999);
    }
}
