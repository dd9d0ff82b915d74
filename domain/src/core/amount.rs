//! Token amounts and block numbers.
//!
//! Every vote tally, supply figure, quorum and block height is an [`Amount`]:
//! a 256-bit unsigned integer. Governance tokens use 18 decimals, so a raw
//! supply multiplied by the percentage scale needs far more than 64 bits.
//!
//! Raw inputs arrive as JSON integers, decimal strings or `0x` hex strings
//! ([`NumericInput`] / [`parse_amount`]).

use super::error::{AmountError, ArithmeticError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 256-bit unsigned integer used for all vote arithmetic.
pub type Amount = primitive_types::U256;

/// A numeric field as it appears in an inbound payload.
///
/// ```
/// use proposal_domain::core::amount::{Amount, NumericInput};
///
/// let from_int: NumericInput = serde_json::from_str("42").unwrap();
/// let from_text: NumericInput = serde_json::from_str("\"0x2a\"").unwrap();
/// assert_eq!(from_int.to_amount("n").unwrap(), Amount::from(42u64));
/// assert_eq!(from_text.to_amount("n").unwrap(), Amount::from(42u64));
/// ```
///
/// JSON integers wider than `u64` keep their exact digits as `Text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NumericInput {
    Integer(u64),
    Text(String),
}

// Read through `Value`: numbers are buffered as exact text, which an
// untagged derive cannot match against `u64`.
impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(match n.as_u64() {
                Some(u) => NumericInput::Integer(u),
                None => NumericInput::Text(n.to_string()),
            }),
            Value::String(s) => Ok(NumericInput::Text(s)),
            other => Err(D::Error::custom(format!(
                "expected an integer or numeric string, got {other}"
            ))),
        }
    }
}

impl NumericInput {
    /// Coerce to an [`Amount`], naming `field` in any error.
    pub fn to_amount(&self, field: &str) -> Result<Amount, AmountError> {
        match self {
            NumericInput::Integer(n) => Ok(Amount::from(*n)),
            NumericInput::Text(s) => parse_amount_str(s, field),
        }
    }
}

impl From<u64> for NumericInput {
    fn from(n: u64) -> Self {
        NumericInput::Integer(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        NumericInput::Text(s.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(s: String) -> Self {
        NumericInput::Text(s)
    }
}

impl From<Amount> for NumericInput {
    fn from(a: Amount) -> Self {
        NumericInput::Text(a.to_string())
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal string.
pub fn parse_amount_str(raw: &str, field: &str) -> Result<Amount, AmountError> {
    let s = raw.trim();
    let malformed = || AmountError::Malformed {
        field: field.to_string(),
        value: raw.to_string(),
    };
    let too_large = || AmountError::TooLarge {
        field: field.to_string(),
    };

    if let Some(rest) = s.strip_prefix('-') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Negative {
                field: field.to_string(),
                value: raw.to_string(),
            });
        }
        return Err(malformed());
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        return Amount::from_str_radix(hex, 16).map_err(|_| too_large());
    }

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    Amount::from_dec_str(s).map_err(|_| too_large())
}

/// Parse a JSON value into an [`Amount`].
pub fn parse_amount(value: &Value, field: &str) -> Result<Amount, AmountError> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => Ok(Amount::from(u)),
            // exact digits, including integers wider than u64
            None => parse_amount_str(&n.to_string(), field),
        },
        Value::String(s) => parse_amount_str(s, field),
        other => Err(AmountError::Malformed {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Parse an optional field where absent, `null`, `false`, `0` and `""` all
/// mean zero.
pub fn amount_or_zero(value: Option<&Value>, field: &str) -> Result<Amount, AmountError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(Amount::zero()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Amount::zero()),
        Some(v) => parse_amount(v, field),
    }
}

/// Look up the first present key among `keys` and parse it, defaulting to zero.
pub fn first_amount(object: &Value, keys: &[&str]) -> Result<Amount, AmountError> {
    for key in keys {
        match object.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.trim().is_empty() => continue,
            Some(Value::Number(n)) if n.as_u64() == Some(0) => continue,
            Some(v) => return parse_amount(v, key),
        }
    }
    Ok(Amount::zero())
}

/// Checked sum of amounts.
pub fn checked_sum<I>(amounts: I, what: &'static str) -> Result<Amount, ArithmeticError>
where
    I: IntoIterator<Item = Amount>,
{
    amounts.into_iter().try_fold(Amount::zero(), |acc, a| {
        acc.checked_add(a).ok_or(ArithmeticError::Overflow(what))
    })
}

/// Checked product of two amounts.
pub fn checked_mul(a: Amount, b: Amount, what: &'static str) -> Result<Amount, ArithmeticError> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow(what))
}

/// Serialize amounts as decimal strings.
pub mod serde_decimal {
    use super::Amount;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub mod option {
        use super::Amount;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<Amount>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.collect_str(v),
                None => serializer.serialize_none(),
            }
        }
    }
}
