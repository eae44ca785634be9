pub mod epc_payload;
pub mod iban;
pub mod structured_reference;
