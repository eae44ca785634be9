use factuur_app_lib::{
    encode_payment_payload, format_structured_reference, generate_qr_code_data,
    validate_structured_reference, AmountPolicy, Bill, FieldRule, FieldValidator, PaymentPayload,
    PaymentPayloadInput, QrSettings,
};

fn amount_field_ok(field: &str) -> bool {
    let Some(rest) = field.strip_prefix("EUR") else {
        return false;
    };
    let Some((int_part, dec_part)) = rest.split_once('.') else {
        return false;
    };
    !int_part.is_empty()
        && int_part.chars().all(|c| c.is_ascii_digit())
        && dec_part.len() == 2
        && dec_part.chars().all(|c| c.is_ascii_digit())
}

#[test]
fn valid_inputs_always_produce_eleven_fields() {
    let amounts = [0.0, 0.01, 1.0, 10.0, 99.995, 1234.5, 999_999_999.99];
    let messages = ["", "Factuur 12", "  spaced  "];
    for amount in amounts {
        for message in messages {
            let input =
                PaymentPayloadInput::new("BE68 5390 0070 3456", "FreelancePro", amount, message);
            let payload = encode_payment_payload(&input, AmountPolicy::AllowZero).unwrap();
            let fields: Vec<&str> = payload.split('\n').collect();
            assert_eq!(fields.len(), 11);
            assert_eq!(&fields[..4], &["BCD", "002", "1", "SCT"]);
            assert!(amount_field_ok(fields[7]), "{}", fields[7]);
            assert_eq!(fields[8], "");
            assert_eq!(fields[10], "");
        }
    }
}

#[test]
fn legacy_contract_returns_empty_string_on_failure() {
    let bad_name = PaymentPayloadInput::new("BE1234", "", 5.0, "");
    let bad_amount = PaymentPayloadInput::new("BE1234", "Acme", -1.0, "");
    assert_eq!(generate_qr_code_data(&bad_name, AmountPolicy::AllowZero), "");
    assert_eq!(generate_qr_code_data(&bad_amount, AmountPolicy::AllowZero), "");

    let ok = PaymentPayloadInput::new("BE1234", "Acme", 10.0, "");
    assert_eq!(
        generate_qr_code_data(&ok, AmountPolicy::AllowZero),
        encode_payment_payload(&ok, AmountPolicy::AllowZero).unwrap()
    );
}

#[test]
fn reference_round_trip_through_encoder() {
    for digits in ["12345678901", "123456789012"] {
        let formatted = format_structured_reference(digits);
        assert!(validate_structured_reference(&formatted).is_ok());
        assert!(FieldRule::StructuredReference.validate(&formatted).is_ok());

        let input = PaymentPayloadInput::new("BE68539000703456", "Acme", 1.0, formatted.clone())
            .structured();
        let encoded = encode_payment_payload(&input, AmountPolicy::AllowZero).unwrap();
        let payload = PaymentPayload::parse(&encoded).unwrap();
        assert_eq!(payload.remittance, format!("+++{formatted}+++"));
    }
}

#[test]
fn structured_flag_never_mangles_free_text() {
    let input: PaymentPayloadInput = serde_json::from_value(serde_json::json!({
        "iban": "BE68539000703456",
        "name": "Acme",
        "amount": 5,
        "message": "INV 2025",
        "structured": true
    }))
    .unwrap();
    assert!(encode_payment_payload(&input, AmountPolicy::AllowZero).is_err());
    assert_eq!(generate_qr_code_data(&input, AmountPolicy::AllowZero), "");
}

#[test]
fn bill_json_to_payload() {
    let bill: Bill = serde_json::from_str(
        r#"{
            "id": "bill_002",
            "user": { "name": "FreelancePro", "iban": "BE68539000703456" },
            "contact": { "id": "contact_002", "name": "GreenEnergy Co", "btw": "BE0987654321" },
            "status": "PENDING",
            "expirationDate": "2025-06-01",
            "billingNumber": "INV-2025-002",
            "assignments": [
                {
                    "description": "Energy Audit Consulting",
                    "quantity": 10,
                    "unitPrice": 120,
                    "btw": 12
                }
            ],
            "structuredMessage": "002202500002"
        }"#,
    )
    .unwrap();

    let settings = QrSettings {
        default_bic: Some("GEBABEBB".to_string()),
        ..QrSettings::default()
    };
    let input = settings.apply_defaults(bill.payment_input());
    let encoded = encode_payment_payload(&input, settings.amount_policy).unwrap();
    let payload = PaymentPayload::parse(&encoded).unwrap();

    assert_eq!(payload.bic, "GEBABEBB");
    assert_eq!(payload.name, "FreelancePro");
    assert_eq!(payload.iban, "BE68539000703456");
    assert_eq!(payload.amount, "EUR1344.00");
    assert_eq!(payload.remittance, "+++002/2025/00002+++");
}
