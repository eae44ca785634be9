//! Invoice helpers for Belgian freelancers: SEPA payment QR payloads
//! (EPC069-12 "SCT"), structured creditor references, and bill totals.

pub mod billing;
pub mod sepa;
pub mod settings;
pub mod validation;

pub use billing::{
    format_money, Address, Assignment, Bill, BillStatus, BillTotals, Contact, UserProfile, VatRate,
};
pub use sepa::epc_payload::{
    encode_payment_payload, generate_qr_code_data, Amount, AmountPolicy, PaymentPayload,
    PaymentPayloadInput, PayloadError, Remittance,
};
pub use sepa::iban::{electronic_format_iban, print_format_iban};
pub use sepa::structured_reference::{
    format_structured_reference, strip_structured_reference_markers, validate_structured_reference,
    wrap_structured_reference,
};
pub use settings::QrSettings;
pub use validation::{FieldRule, FieldValidator};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
