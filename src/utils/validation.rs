use uuid::Uuid;

use crate::utils::errors::AppError;

/// Canonical 8-4-4-4-12 UUID check with the version nibble constrained to
/// 1-5 and the variant nibble to [89ab]. Stricter than `Uuid::parse_str`,
/// which also accepts unhyphenated and braced forms.
pub fn is_valid_uuid(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 36 {
        return false;
    }

    for (i, &b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if b != b'-' {
                    return false;
                }
            }
            14 => {
                if !(b'1'..=b'5').contains(&b) {
                    return false;
                }
            }
            19 => {
                if !matches!(b, b'8' | b'9' | b'a' | b'b' | b'A' | b'B') {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }

    true
}

/// Parse an id path parameter, rejecting anything that is not a canonical
/// UUID with 400 before it reaches a query.
pub fn parse_uuid_param(value: &str, name: &str) -> Result<Uuid, AppError> {
    if !is_valid_uuid(value) {
        return Err(AppError::bad_request(format!("Invalid {} format", name)));
    }

    Uuid::parse_str(value).map_err(|_| AppError::bad_request(format!("Invalid {} format", name)))
}
