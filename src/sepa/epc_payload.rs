use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::structured_reference::{
    strip_structured_reference_markers, validate_structured_reference, wrap_structured_reference,
};

// EPC069-12 "SCT" QR payload, version 002.
pub const SERVICE_TAG: &str = "BCD";
pub const VERSION: &str = "002";
pub const CHARACTER_SET_UTF8: &str = "1";
pub const IDENTIFICATION: &str = "SCT";
pub const CURRENCY: &str = "EUR";

pub const FIELD_COUNT: usize = 11;
pub const MAX_NAME_CHARS: usize = 70;
pub const MAX_REMITTANCE_CHARS: usize = 140;
pub const MAX_AMOUNT: f64 = 999_999_999.99;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("Recipient name is required")]
    EmptyName,
    #[error("Recipient name is too long ({0} characters, max 70)")]
    NameTooLong(usize),
    #[error("Amount is not a number: {0:?}")]
    InvalidAmount(String),
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(f64),
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("Amount exceeds the SEPA maximum of 999999999.99 (got {0})")]
    AmountTooLarge(f64),
    #[error("Remittance information is too long ({0} characters, max 140)")]
    RemittanceTooLong(usize),
    #[error("Invalid structured reference: {0}")]
    InvalidStructuredReference(String),
}

/// Whether a zero-euro payload may be produced.
///
/// `AllowZero` gives "informational" codes where the payer fills in the
/// amount; `StrictlyPositive` is for codes that must be payable as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountPolicy {
    #[default]
    AllowZero,
    StrictlyPositive,
}

impl AmountPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountPolicy::AllowZero => "allow-zero",
            AmountPolicy::StrictlyPositive => "strictly-positive",
        }
    }

    pub fn parse(v: &str) -> Option<Self> {
        match v.trim().to_ascii_lowercase().as_str() {
            "allow-zero" | "allow_zero" | "zero" | "non-negative" => Some(AmountPolicy::AllowZero),
            "strictly-positive" | "strictly_positive" | "positive" | "payable" => {
                Some(AmountPolicy::StrictlyPositive)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn to_f64(&self) -> Result<f64, PayloadError> {
        let value = match self {
            Amount::Number(v) => *v,
            Amount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PayloadError::InvalidAmount(s.clone()))?,
        };
        if !value.is_finite() {
            return Err(PayloadError::InvalidAmount(value.to_string()));
        }
        Ok(value)
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Number(v)
    }
}

impl From<&str> for Amount {
    fn from(v: &str) -> Self {
        Amount::Text(v.to_string())
    }
}

impl From<String> for Amount {
    fn from(v: String) -> Self {
        Amount::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remittance {
    Unstructured(String),
    /// Grouped and wrapped in `+++` when embedded.
    Structured(String),
}

impl Remittance {
    /// Field text as embedded in the payload.
    ///
    /// A structured reference must hold 11 or 12 digits; stored `+++`
    /// markers are accepted and re-applied.
    pub fn render(&self) -> Result<String, PayloadError> {
        match self {
            Remittance::Unstructured(text) => Ok(single_line(text)),
            Remittance::Structured(reference) => {
                let bare = strip_structured_reference_markers(reference);
                if bare.is_empty() {
                    return Ok(String::new());
                }
                validate_structured_reference(&bare)
                    .map_err(PayloadError::InvalidStructuredReference)?;
                Ok(wrap_structured_reference(&bare))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayloadInput {
    pub iban: String,
    pub name: String,
    pub amount: Amount,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub structured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
}

impl PaymentPayloadInput {
    pub fn new(
        iban: impl Into<String>,
        name: impl Into<String>,
        amount: impl Into<Amount>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            iban: iban.into(),
            name: name.into(),
            amount: amount.into(),
            message: message.into(),
            structured: false,
            bic: None,
        }
    }

    pub fn with_bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = Some(bic.into());
        self
    }

    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    pub fn remittance(&self) -> Remittance {
        if self.structured {
            Remittance::Structured(self.message.clone())
        } else {
            Remittance::Unstructured(self.message.clone())
        }
    }
}

// A stray line break would shift every following field.
fn single_line(input: &str) -> String {
    input
        .trim()
        .split(|c: char| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the amount field, e.g. `EUR10.00`.
///
/// Both bounds apply to the amount as printed, after rounding to cents.
pub fn format_amount_field(
    amount: &Amount,
    policy: AmountPolicy,
) -> Result<String, PayloadError> {
    let value = amount.to_f64()?;
    if value < 0.0 {
        return Err(PayloadError::NegativeAmount(value));
    }

    // -0.0 would otherwise print as "-0.00".
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{:.2}", value);
    let rounded: f64 = formatted
        .parse()
        .map_err(|_| PayloadError::InvalidAmount(formatted.clone()))?;
    if rounded > MAX_AMOUNT {
        return Err(PayloadError::AmountTooLarge(value));
    }
    if policy == AmountPolicy::StrictlyPositive && rounded == 0.0 {
        return Err(PayloadError::ZeroAmount);
    }

    Ok(format!("{CURRENCY}{formatted}"))
}

pub fn encode_payment_payload(
    input: &PaymentPayloadInput,
    policy: AmountPolicy,
) -> Result<String, PayloadError> {
    let name = single_line(&input.name);
    if name.is_empty() {
        return Err(PayloadError::EmptyName);
    }
    let name_len = name.chars().count();
    if name_len > MAX_NAME_CHARS {
        return Err(PayloadError::NameTooLong(name_len));
    }

    let amount = format_amount_field(&input.amount, policy)?;

    let remittance = input.remittance().render()?;
    let remittance_len = remittance.chars().count();
    if remittance_len > MAX_REMITTANCE_CHARS {
        return Err(PayloadError::RemittanceTooLong(remittance_len));
    }

    let bic = single_line(input.bic.as_deref().unwrap_or(""));
    let iban: String = input.iban.chars().filter(|c| !c.is_whitespace()).collect();

    let fields: [&str; FIELD_COUNT] = [
        SERVICE_TAG,
        VERSION,
        CHARACTER_SET_UTF8,
        IDENTIFICATION,
        &bic,
        &name,
        &iban,
        &amount,
        "", // purpose
        &remittance,
        "", // beneficiary to originator information
    ];

    Ok(fields.join("\n"))
}

/// Returns an empty string when the payload cannot be built.
///
/// Callers must treat `""` as "no QR code yet". New code should prefer
/// [`encode_payment_payload`].
pub fn generate_qr_code_data(input: &PaymentPayloadInput, policy: AmountPolicy) -> String {
    match encode_payment_payload(input, policy) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                error = %e,
                policy = policy.as_str(),
                "payment payload not generated"
            );
            String::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub service_tag: String,
    pub version: String,
    pub character_set: String,
    pub identification: String,
    pub bic: String,
    pub name: String,
    pub iban: String,
    pub amount: String,
    pub purpose: String,
    pub remittance: String,
    pub information: String,
}

impl PaymentPayload {
    pub fn parse(payload: &str) -> Result<Self, String> {
        let fields: Vec<&str> = payload.split('\n').collect();
        if fields.len() != FIELD_COUNT {
            return Err(format!("expected {FIELD_COUNT} fields, got {}", fields.len()));
        }
        if fields[0] != SERVICE_TAG {
            return Err(format!("unexpected service tag {:?}", fields[0]));
        }
        if fields[3] != IDENTIFICATION {
            return Err(format!("unexpected identification code {:?}", fields[3]));
        }

        Ok(Self {
            service_tag: fields[0].to_string(),
            version: fields[1].to_string(),
            character_set: fields[2].to_string(),
            identification: fields[3].to_string(),
            bic: fields[4].to_string(),
            name: fields[5].to_string(),
            iban: fields[6].to_string(),
            amount: fields[7].to_string(),
            purpose: fields[8].to_string(),
            remittance: fields[9].to_string(),
            information: fields[10].to_string(),
        })
    }

    /// Amount without the currency prefix.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.strip_prefix(CURRENCY)?.parse().ok()
    }

    pub fn has_structured_reference(&self) -> bool {
        self.remittance.len() > 6
            && self.remittance.starts_with("+++")
            && self.remittance.ends_with("+++")
    }
}

impl fmt::Display for PaymentPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            &self.service_tag,
            &self.version,
            &self.character_set,
            &self.identification,
            &self.bic,
            &self.name,
            &self.iban,
            &self.amount,
            &self.purpose,
            &self.remittance,
            &self.information,
        ];
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}
