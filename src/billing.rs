//! Invoice values: profile, contacts, line items and bill totals.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::sepa::epc_payload::PaymentPayloadInput;
use crate::sepa::iban::electronic_format_iban;
use crate::sepa::structured_reference::{
    strip_structured_reference_markers, validate_structured_reference,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl Address {
    /// Address block as printed under a party name on the invoice.
    pub fn lines(&self) -> Vec<String> {
        let street = format!("{} {}", self.street.trim(), self.house_number.trim());
        let city = format!("{} {}", self.postal_code.trim(), self.city.trim());
        [street, city, self.country.trim().to_string()]
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub btw: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default, alias = "btwNumber")]
    pub btw: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iban: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub structured_message: Option<String>,
}

impl UserProfile {
    /// Profile used before the user has filled in anything.
    pub fn empty() -> Self {
        Self {
            id: "".to_string(),
            name: "".to_string(),
            address: Address::default(),
            btw: "".to_string(),
            email: "".to_string(),
            iban: "".to_string(),
            logo: None,
            structured_message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Draft,
    Pending,
    Payed,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Draft => "DRAFT",
            BillStatus::Pending => "PENDING",
            BillStatus::Payed => "PAYED",
        }
    }
}

fn default_bill_status() -> BillStatus {
    BillStatus::Draft
}

/// Belgian VAT (BTW) rates in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VatRate {
    Reduced6,
    Reduced12,
    Standard21,
}

impl VatRate {
    pub fn percent(&self) -> u8 {
        match self {
            VatRate::Reduced6 => 6,
            VatRate::Reduced12 => 12,
            VatRate::Standard21 => 21,
        }
    }
}

impl TryFrom<u8> for VatRate {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            6 => Ok(VatRate::Reduced6),
            12 => Ok(VatRate::Reduced12),
            21 => Ok(VatRate::Standard21),
            other => Err(format!("unsupported VAT rate {other}%, expected 6, 12 or 21")),
        }
    }
}

impl From<VatRate> for u8 {
    fn from(v: VatRate) -> Self {
        v.percent()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub btw: VatRate,
}

impl Assignment {
    pub fn empty(date: &str) -> Self {
        Self {
            description: "".to_string(),
            start_date: date.to_string(),
            end_date: date.to_string(),
            quantity: 1.0,
            unit_price: 0.0,
            btw: VatRate::Standard21,
        }
    }

    pub fn empty_today() -> Self {
        Self::empty(&today_ymd())
    }

    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn vat_amount(&self) -> f64 {
        self.subtotal() * (f64::from(self.btw.percent()) / 100.0)
    }

    pub fn total(&self) -> f64 {
        self.subtotal() + self.vat_amount()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    pub excl_vat: f64,
    pub vat: f64,
    pub incl_vat: f64,
}

impl BillTotals {
    pub fn from_assignments(assignments: &[Assignment]) -> Self {
        let excl_vat: f64 = assignments.iter().map(Assignment::subtotal).sum();
        let vat: f64 = assignments.iter().map(Assignment::vat_amount).sum();
        Self {
            excl_vat,
            vat,
            incl_vat: excl_vat + vat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub user: UserProfile,
    pub contact: Contact,
    #[serde(default = "default_bill_status")]
    pub status: BillStatus,
    #[serde(default)]
    pub expiration_date: String,
    pub billing_number: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub structured_message: Option<String>,
}

impl Bill {
    pub fn totals(&self) -> BillTotals {
        BillTotals::from_assignments(&self.assignments)
    }

    /// The bill's own reference, or the profile default.
    pub fn effective_structured_message(&self) -> Option<&str> {
        self.structured_message
            .as_deref()
            .or(self.user.structured_message.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Encoder input for the bill's payment QR code.
    ///
    /// A message that is a valid structured reference (with or without stored
    /// `+++` markers) is flagged as structured; anything else goes out as
    /// free text.
    pub fn payment_input(&self) -> PaymentPayloadInput {
        let mut input = PaymentPayloadInput::new(
            electronic_format_iban(&self.user.iban),
            self.user.name.clone(),
            self.totals().incl_vat,
            "",
        );

        if let Some(message) = self.effective_structured_message() {
            let bare = strip_structured_reference_markers(message);
            if validate_structured_reference(&bare).is_ok() {
                input.message = bare;
                input.structured = true;
            } else {
                input.message = message.to_string();
            }
        }

        input
    }

    pub fn pdf_file_name(&self) -> String {
        format!("factuur-{}.pdf", sanitize_filename(&self.billing_number))
    }

    pub fn is_overdue(&self, today: Date) -> Result<bool, String> {
        if self.status == BillStatus::Payed {
            return Ok(false);
        }
        let expiration = parse_ymd(&self.expiration_date)?;
        Ok(today > expiration)
    }
}

fn sanitize_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }
    let trimmed = out.trim_matches('_').to_string();
    if trimmed.is_empty() { "factuur".to_string() } else { trimmed }
}

fn today_ymd() -> String {
    let d = OffsetDateTime::now_utc().date();
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

pub fn parse_ymd(input: &str) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(input.trim(), &format).map_err(|e| format!("invalid date {input:?}: {e}"))
}

/// Belgian display style: thousands '.', decimals ',' (e.g. `€ 1.234,50`).
pub fn format_money(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut out = String::new();
    let chars: Vec<char> = int_part.chars().collect();
    let mut cnt = 0;
    for i in (0..chars.len()).rev() {
        if cnt == 3 {
            out.push('.');
            cnt = 0;
        }
        out.push(chars[i]);
        cnt += 1;
    }
    let int_with_sep: String = out.chars().rev().collect();
    let sign = if v < 0.0 && s != "0.00" { "-" } else { "" };
    format!("€ {}{},{}", sign, int_with_sep, dec_part)
}
