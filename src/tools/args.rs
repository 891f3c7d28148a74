//! Argument extraction helpers shared by the tool handlers.

use crate::solana::is_valid_address;
use crate::tools::ToolError;
use serde_json::Value;

/// Required, non-blank string.
pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    opt_str(args, key).ok_or_else(|| ToolError::validation(format!("missing '{}' argument", key)))
}

/// Optional string; blank counts as absent.
pub(crate) fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub(crate) fn f64_arg(args: &Value, key: &str) -> Result<f64, ToolError> {
    opt_f64(args, key).ok_or_else(|| ToolError::validation(format!("missing '{}' argument", key)))
}

pub(crate) fn opt_f64(args: &Value, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64)
}

pub(crate) fn u64_arg(args: &Value, key: &str) -> Result<u64, ToolError> {
    opt_u64(args, key).ok_or_else(|| {
        ToolError::validation(format!("missing or negative '{}' argument", key))
    })
}

pub(crate) fn opt_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

/// Required amount strictly greater than zero.
pub(crate) fn positive_arg(args: &Value, key: &str) -> Result<f64, ToolError> {
    let value = f64_arg(args, key)?;
    positive(key, value)
}

pub(crate) fn positive(key: &str, value: f64) -> Result<f64, ToolError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ToolError::validation(format!(
            "'{}' must be greater than zero, got {}",
            key, value
        )))
    }
}

/// Required Solana address.
pub(crate) fn address_arg(args: &Value, key: &str) -> Result<String, ToolError> {
    let value = str_arg(args, key)?;
    check_address(key, value)
}

/// Optional Solana address; present but malformed is an error.
pub(crate) fn opt_address(args: &Value, key: &str) -> Result<Option<String>, ToolError> {
    opt_str(args, key).map(|v| check_address(key, v)).transpose()
}

fn check_address(key: &str, value: &str) -> Result<String, ToolError> {
    if is_valid_address(value) {
        Ok(value.to_string())
    } else {
        Err(ToolError::validation(format!(
            "'{}' is not a valid Solana address: {}",
            key, value
        )))
    }
}

/// Basis points, 0..=10000.
pub(crate) fn bps(key: &str, value: u64) -> Result<u16, ToolError> {
    if value <= 10_000 {
        Ok(value as u16)
    } else {
        Err(ToolError::validation(format!(
            "'{}' must be at most 10000 basis points, got {}",
            key, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDR: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn blank_strings_are_missing() {
        let args = json!({"name": "   "});
        assert!(str_arg(&args, "name").is_err());
        assert_eq!(opt_str(&args, "name"), None);
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(positive_arg(&json!({"amount": 0}), "amount").is_err());
        assert!(positive_arg(&json!({"amount": -1.0}), "amount").is_err());
        assert_eq!(positive_arg(&json!({"amount": 2}), "amount").unwrap(), 2.0);
    }

    #[test]
    fn addresses_are_checked() {
        assert_eq!(address_arg(&json!({"to": ADDR}), "to").unwrap(), ADDR);
        assert!(address_arg(&json!({"to": "bob"}), "to").is_err());
        assert_eq!(opt_address(&json!({}), "mint").unwrap(), None);
        assert!(opt_address(&json!({"mint": "xyz"}), "mint").is_err());
    }

    #[test]
    fn bps_capped_at_ten_thousand() {
        assert_eq!(bps("slippage_bps", 300).unwrap(), 300);
        assert!(bps("slippage_bps", 10_001).is_err());
    }
}
