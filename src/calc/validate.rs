//! Form validation.
//!
//! Field values are parsed leniently: surrounding whitespace is ignored and the
//! longest numeric prefix is used, so "12abc" reads as 12 and "12.7" read as
//! an integer is 12. A field without a numeric prefix fails its rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::FormInputs;

/// Field values exactly as entered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInputs {
    #[serde(default)]
    pub initial_balance: String,
    #[serde(default)]
    pub deposit: String,
    #[serde(default)]
    pub interest_rate: String,    // Annual percentage
    #[serde(default)]
    pub capitalization: String,   // Periods per year
    #[serde(default)]
    pub duration: String,         // Years
}

/// First failing rule, in checking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Initial balance must be a positive number.")]
    InitialBalance,
    #[error("Deposit must be a positive number.")]
    Deposit,
    #[error("Interest rate must be a positive number.")]
    InterestRate,
    #[error("Capitalization frequency must be a positive number.")]
    Capitalization,
    #[error("Duration must be a positive number greater than 0.")]
    Duration,
}

/// Validate raw field values. The first failing rule wins.
pub fn validate(raw: &RawInputs) -> Result<FormInputs, ValidationError> {
    let initial_balance = parse_decimal(&raw.initial_balance)
        .filter(|v| *v > 0.0)
        .ok_or(ValidationError::InitialBalance)?;

    let deposit = parse_decimal(&raw.deposit)
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::Deposit)?;

    let rate = parse_decimal(&raw.interest_rate)
        .map(|percent| percent / 100.0)
        .filter(|v| *v >= 0.0)
        .ok_or(ValidationError::InterestRate)?;

    let periods_per_year = parse_positive_integer(&raw.capitalization)
        .ok_or(ValidationError::Capitalization)?;

    let years = parse_positive_integer(&raw.duration)
        .ok_or(ValidationError::Duration)?;

    Ok(FormInputs {
        initial_balance,
        deposit,
        rate,
        periods_per_year,
        years,
    })
}

/// Parse the longest decimal prefix of `s` (sign, digits, fraction, exponent)
pub fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        let infinite = if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(infinite);
    }

    let int_start = end;
    end = skip_digits(bytes, end);
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = skip_digits(bytes, end + 1);
        mantissa_digits += frac_end - (end + 1);
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(bytes, exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Parse the longest integer prefix of `s`. A `0x` prefix after the sign
/// reads hex digits instead.
pub fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    if matches!(bytes.get(sign..sign + 2), Some([b'0', b'x' | b'X'])) {
        let start = sign + 2;
        let end = start + bytes[start..].iter().take_while(|b| b.is_ascii_hexdigit()).count();
        if end == start {
            return None;
        }
        let value = i64::from_str_radix(&s[start..end], 16).ok()?;
        return Some(if bytes[0] == b'-' { -value } else { value });
    }

    let end = skip_digits(bytes, sign);

    if end == sign {
        return None;
    }
    s[..end].parse().ok()
}

// Integers that do not fit a u32 count as unparseable
fn parse_positive_integer(s: &str) -> Option<u32> {
    parse_integer(s)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    i
}
