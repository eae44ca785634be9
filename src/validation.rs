//! Per-field validation and on-blur formatting for profile, contact and
//! bill forms.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sepa::iban::{looks_like_iban, print_format_iban};
use crate::sepa::structured_reference::{format_structured_reference, validate_structured_reference};

pub trait FieldValidator {
    fn validate(&self, input: &str) -> Result<(), String>;
    fn format(&self, input: &str) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRule {
    StructuredReference,
    Email,
    Iban,
    VatNumber,
}

static EMAIL_RE: OnceLock<Result<Regex, String>> = OnceLock::new();

fn email_regex() -> Result<&'static Regex, String> {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| format!("email pattern unavailable: {e}"))
}

fn normalize_vat_number(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl FieldRule {
    /// Maps a form field name onto its rule.
    pub fn for_field(field: &str) -> Option<FieldRule> {
        match field.trim() {
            "structuredMessage" | "structured_message" => Some(FieldRule::StructuredReference),
            "email" => Some(FieldRule::Email),
            "iban" => Some(FieldRule::Iban),
            "btw" | "btwNumber" | "vat" => Some(FieldRule::VatNumber),
            _ => None,
        }
    }
}

impl FieldValidator for FieldRule {
    fn validate(&self, input: &str) -> Result<(), String> {
        match self {
            FieldRule::StructuredReference => validate_structured_reference(input),
            FieldRule::Email => {
                if email_regex()?.is_match(input.trim()) {
                    Ok(())
                } else {
                    Err("invalid email".to_string())
                }
            }
            FieldRule::Iban => {
                if looks_like_iban(input) {
                    Ok(())
                } else {
                    Err("invalid IBAN".to_string())
                }
            }
            // VAT numbers are free-form for now.
            FieldRule::VatNumber => Ok(()),
        }
    }

    fn format(&self, input: &str) -> String {
        match self {
            FieldRule::StructuredReference => format_structured_reference(input),
            FieldRule::Email => input.trim().to_string(),
            FieldRule::Iban => print_format_iban(input),
            FieldRule::VatNumber => normalize_vat_number(input),
        }
    }
}
