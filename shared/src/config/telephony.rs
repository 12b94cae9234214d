//! Telephony configuration for challenge delivery

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ConfigResult};
use crate::utils::phone::is_valid_international_phone;

/// Default number of digits in a spoken challenge code
pub const DEFAULT_CODE_DIGITS: usize = 6;

/// Longest challenge code a caller can reasonably key in
pub const MAX_CODE_DIGITS: usize = 12;

/// Voice delivery configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelephonyConfig {
    /// Voice provider ("mock" is the only built-in gateway)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Caller id used for outbound challenge calls
    #[serde(default)]
    pub from_number: Option<String>,

    /// Number that receives the challenge call
    #[serde(default)]
    pub to_number: Option<String>,

    /// Number of digits in each generated code, [`DEFAULT_CODE_DIGITS`] when unset
    #[serde(default)]
    pub code_digits: Option<usize>,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            from_number: None,
            to_number: None,
            code_digits: None,
        }
    }
}

impl TelephonyConfig {
    /// Effective code length
    pub fn code_digits(&self) -> usize {
        self.code_digits.unwrap_or(DEFAULT_CODE_DIGITS)
    }

    /// Validate numbers and code length
    pub fn validate(&self) -> ConfigResult<()> {
        let digits = self.code_digits();
        if digits == 0 || digits > MAX_CODE_DIGITS {
            return Err(ConfigError::invalid(
                "telephony.code_digits",
                format!("must be between 1 and {}", MAX_CODE_DIGITS),
            ));
        }

        match &self.to_number {
            None => return Err(ConfigError::missing("telephony.to_number")),
            Some(number) if !is_valid_international_phone(number) => {
                return Err(ConfigError::invalid(
                    "telephony.to_number",
                    "must be in E.164 format (e.g. +14155552671)",
                ));
            }
            Some(_) => {}
        }

        if let Some(number) = &self.from_number {
            if !is_valid_international_phone(number) {
                return Err(ConfigError::invalid(
                    "telephony.from_number",
                    "must be in E.164 format (e.g. +14155552671)",
                ));
            }
        }

        Ok(())
    }
}

fn default_provider() -> String {
    String::from("mock")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TelephonyConfig {
        TelephonyConfig {
            to_number: Some("+819012345678".to_string()),
            ..TelephonyConfig::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_callee_is_required() {
        let err = TelephonyConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("telephony.to_number"));
    }

    #[test]
    fn test_rejects_non_e164_numbers() {
        let mut config = valid();
        config.from_number = Some("0312345678".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_code_digit_bounds() {
        let mut config = valid();
        config.code_digits = Some(0);
        assert!(config.validate().is_err());
        config.code_digits = Some(13);
        assert!(config.validate().is_err());
        config.code_digits = Some(4);
        assert!(config.validate().is_ok());
    }
}
