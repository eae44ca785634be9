use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sepa::epc_payload::{AmountPolicy, PaymentPayloadInput};

pub const AMOUNT_POLICY_ENV: &str = "FACTUUR_AMOUNT_POLICY";
pub const DEFAULT_BIC_ENV: &str = "FACTUUR_DEFAULT_BIC";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrSettings {
    #[serde(default)]
    pub amount_policy: AmountPolicy,
    #[serde(default)]
    pub default_bic: Option<String>,
}

impl QrSettings {
    /// Reads `path` (if any) and then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut settings = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .map_err(|e| format!("failed to read settings {}: {e}", p.display()))?;
                serde_json::from_str::<QrSettings>(&raw)
                    .map_err(|e| format!("invalid settings json {}: {e}", p.display()))?
            }
            None => QrSettings::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(AMOUNT_POLICY_ENV) {
            let policy = AmountPolicy::parse(&raw)
                .ok_or_else(|| format!("{AMOUNT_POLICY_ENV}: unknown amount policy {raw:?}"))?;
            tracing::debug!(policy = policy.as_str(), "amount policy overridden from environment");
            self.amount_policy = policy;
        }

        if let Some(raw) = lookup(DEFAULT_BIC_ENV) {
            let bic = raw.trim().to_ascii_uppercase();
            tracing::debug!(bic = %bic, "default BIC overridden from environment");
            self.default_bic = if bic.is_empty() { None } else { Some(bic) };
        }

        Ok(())
    }

    /// Fills in the configured BIC when the input carries none.
    pub fn apply_defaults(&self, mut input: PaymentPayloadInput) -> PaymentPayloadInput {
        let has_bic = input.bic.as_deref().is_some_and(|b| !b.trim().is_empty());
        if !has_bic {
            input.bic = self.default_bic.clone();
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn defaults_when_fields_are_missing() {
        let s: QrSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, QrSettings::default());
        assert_eq!(s.amount_policy, AmountPolicy::AllowZero);
        assert_eq!(s.default_bic, None);
    }

    #[test]
    fn reads_camel_case_json() {
        let s: QrSettings = serde_json::from_str(
            r#"{"amountPolicy":"strictly-positive","defaultBic":"GEBABEBB"}"#,
        )
        .unwrap();
        assert_eq!(s.amount_policy, AmountPolicy::StrictlyPositive);
        assert_eq!(s.default_bic.as_deref(), Some("GEBABEBB"));
    }

    #[test]
    fn env_overrides_win() {
        let mut s = QrSettings::default();
        s.apply_env_overrides(env(&[
            (AMOUNT_POLICY_ENV, "payable"),
            (DEFAULT_BIC_ENV, " kredbebb "),
        ]))
        .unwrap();
        assert_eq!(s.amount_policy, AmountPolicy::StrictlyPositive);
        assert_eq!(s.default_bic.as_deref(), Some("KREDBEBB"));

        s.apply_env_overrides(env(&[(DEFAULT_BIC_ENV, "")])).unwrap();
        assert_eq!(s.default_bic, None);
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let mut s = QrSettings::default();
        let err = s.apply_env_overrides(env(&[(AMOUNT_POLICY_ENV, "sometimes")])).unwrap_err();
        assert!(err.contains(AMOUNT_POLICY_ENV));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = QrSettings::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.starts_with("failed to read settings"));
    }

    #[test]
    fn default_bic_only_fills_gaps() {
        let s = QrSettings {
            default_bic: Some("GEBABEBB".to_string()),
            ..QrSettings::default()
        };
        let input = PaymentPayloadInput::new("BE68539000703456", "Acme", 1.0, "");
        assert_eq!(s.apply_defaults(input.clone()).bic.as_deref(), Some("GEBABEBB"));
        assert_eq!(
            s.apply_defaults(input.with_bic("KREDBEBB")).bic.as_deref(),
            Some("KREDBEBB")
        );
    }
}
