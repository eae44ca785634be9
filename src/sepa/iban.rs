//! IBAN display helpers. No checksum validation happens here.

pub fn electronic_format_iban(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Electronic form split into blocks of four, e.g. `BE68 5390 0070 3456`.
pub fn print_format_iban(input: &str) -> String {
    let electronic: Vec<char> = electronic_format_iban(input).chars().collect();
    electronic
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn looks_like_iban(input: &str) -> bool {
    let iban = electronic_format_iban(input);
    let bytes = iban.as_bytes();
    if bytes.len() < 15 || bytes.len() > 34 {
        return false;
    }
    bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        && bytes[2..4].iter().all(|b| b.is_ascii_digit())
        && bytes[4..].iter().all(|b| b.is_ascii_alphanumeric())
}
