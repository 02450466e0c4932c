use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Case-insensitive substring match against "binary"/"blob": the only signal
/// the schema endpoint gives for values that arrive base64-encoded.
#[must_use]
pub fn is_blob_type(column_type: &str) -> bool {
    let lowered = column_type.to_ascii_lowercase();
    lowered.contains("binary") || lowered.contains("blob")
}

/// Decodes a base64 blob value for display. Invalid base64 or non-UTF-8
/// payloads fall back to the raw value unchanged, so the fallback is
/// idempotent.
#[must_use]
pub fn decode_blob_value(value: &str) -> String {
    let Ok(bytes) = STANDARD.decode(value) else {
        return value.to_string();
    };
    String::from_utf8(bytes).unwrap_or_else(|_| value.to_string())
}

/// Applies the blob heuristic to one cell.
#[must_use]
pub fn display_value(column_type: &str, value: &str) -> String {
    if is_blob_type(column_type) {
        decode_blob_value(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_blob_value, display_value, is_blob_type};

    #[test]
    fn matches_binary_and_blob_types_case_insensitively() {
        assert!(is_blob_type("BLOB"));
        assert!(is_blob_type("longblob"));
        assert!(is_blob_type("VARBINARY(16)"));
        assert!(!is_blob_type("varchar(255)"));
        assert!(!is_blob_type("int"));
    }

    #[test]
    fn valid_base64_decodes_to_text() {
        assert_eq!(decode_blob_value("aGVsbG8="), "hello");
        assert_eq!(display_value("BLOB", "aGVsbG8="), "hello");
    }

    #[test]
    fn invalid_base64_falls_back_to_the_raw_value() {
        assert_eq!(decode_blob_value("not base64!"), "not base64!");
        assert_eq!(display_value("BLOB", "not base64!"), "not base64!");
    }

    #[test]
    fn non_utf8_payloads_fall_back_to_the_raw_value() {
        // 0xFF 0xFE is valid base64 content but not valid UTF-8.
        assert_eq!(decode_blob_value("//4="), "//4=");
    }

    #[test]
    fn non_blob_columns_pass_through_unchanged() {
        assert_eq!(display_value("varchar(255)", "aGVsbG8="), "aGVsbG8=");
    }
}
