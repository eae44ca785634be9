//! Belgian structured creditor references ("gestructureerde mededeling").
//!
//! Raw form is 11 or 12 digits. Canonical form groups them as
//! `DD/DDDD/DDDDD` or `DDD/DDDD/DDDDD`; the `+++` markers are only added by
//! the payload encoder.

pub const MARKER: &str = "+++";

fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_structured_reference(input: &str) -> Result<(), String> {
    if input.contains('+') {
        return Err("The '+' are added automatically later.".to_string());
    }

    let count = digits_only(input).len();
    if count != 11 && count != 12 {
        return Err(format!("Must be 11 or 12 numbers (now: {count})."));
    }

    // Whitespace is tolerated, it disappears on format.
    let allowed = |c: char| c.is_ascii_digit() || c == '/' || c.is_whitespace();
    if !input.chars().all(allowed) {
        return Err("Only numbers or / are allowed".to_string());
    }

    Ok(())
}

/// Groups raw digit input into its canonical form.
///
/// Anything that does not end up as exactly 11 or 12 digits is returned as
/// the bare digit string so the user can keep typing.
pub fn format_structured_reference(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(12).collect();
    match digits.len() {
        11 => format!("{}/{}/{}", &digits[..2], &digits[2..6], &digits[6..]),
        12 => format!("{}/{}/{}", &digits[..3], &digits[3..7], &digits[7..]),
        _ => digits,
    }
}

pub fn wrap_structured_reference(raw: &str) -> String {
    format!("{MARKER}{}{MARKER}", format_structured_reference(raw))
}

/// Drops surrounding `+` markers from a stored reference such as
/// `+++001/2025/00001+++`.
pub fn strip_structured_reference_markers(input: &str) -> String {
    input.trim().trim_matches('+').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_eleven_and_twelve_digits() {
        assert!(validate_structured_reference("12345678901").is_ok());
        assert!(validate_structured_reference("123456789012").is_ok());
        assert!(validate_structured_reference("123/4567/89012").is_ok());
        assert!(validate_structured_reference("12 3456 78901").is_ok());
    }

    #[test]
    fn rejects_plus_signs_first() {
        let err = validate_structured_reference("+++123456789012+++").unwrap_err();
        assert!(err.contains('+'));

        // '+' wins even when the digit count is also wrong.
        let err = validate_structured_reference("+1").unwrap_err();
        assert_eq!(err, "The '+' are added automatically later.");
    }

    #[test]
    fn reports_current_digit_count() {
        let err = validate_structured_reference("1234567890").unwrap_err();
        assert_eq!(err, "Must be 11 or 12 numbers (now: 10).");

        let err = validate_structured_reference("1234567890123").unwrap_err();
        assert_eq!(err, "Must be 11 or 12 numbers (now: 13).");
    }

    #[test]
    fn rejects_other_characters() {
        let err = validate_structured_reference("123-4567-89012").unwrap_err();
        assert_eq!(err, "Only numbers or / are allowed");
    }

    #[test]
    fn formats_by_digit_count() {
        assert_eq!(format_structured_reference("123456789012"), "123/4567/89012");
        assert_eq!(format_structured_reference("12345678901"), "12/3456/78901");
        assert_eq!(format_structured_reference("123"), "123");
        assert_eq!(format_structured_reference(""), "");
    }

    #[test]
    fn format_strips_and_truncates() {
        assert_eq!(format_structured_reference("+++001/2025/00001+++"), "001/2025/00001");
        assert_eq!(format_structured_reference("1234567890123456"), "123/4567/89012");
        assert_eq!(format_structured_reference("12a34"), "1234");
    }

    #[test]
    fn formatted_reference_stays_valid() {
        for d in ["00000000000", "99999999999", "000000000000", "120250000123"] {
            let formatted = format_structured_reference(d);
            assert!(validate_structured_reference(&formatted).is_ok(), "{formatted}");
            assert_eq!(format_structured_reference(&formatted), formatted);
        }
    }

    #[test]
    fn wraps_with_markers() {
        assert_eq!(wrap_structured_reference("123456789012"), "+++123/4567/89012+++");
    }

    #[test]
    fn strips_markers() {
        assert_eq!(strip_structured_reference_markers("+++002/2025/00002+++"), "002/2025/00002");
        assert_eq!(strip_structured_reference_markers(" 001/2025/00001 "), "001/2025/00001");
    }
}
