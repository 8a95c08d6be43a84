use crate::{AbxError, FormatOptions, Result};
use crate::{TYPE_BOOLEAN_FALSE, TYPE_BOOLEAN_TRUE, TYPE_NULL};
use crate::{TYPE_BYTES_BASE64, TYPE_BYTES_HEX, TYPE_STRING, TYPE_STRING_INTERNED};
use crate::{TYPE_DOUBLE, TYPE_FLOAT, TYPE_INT, TYPE_INT_HEX, TYPE_LONG, TYPE_LONG_HEX};
use base64::Engine;
use std::borrow::Cow;

/// Wire representation selected by the high nibble of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    String,
    StringInterned,
    BytesHex,
    BytesBase64,
    Int,
    IntHex,
    Long,
    LongHex,
    Float,
    Double,
    BooleanTrue,
    BooleanFalse,
}

impl ValueType {
    /// Split the type out of a token byte
    pub fn from_token(token: u8) -> Result<Self> {
        let value_type = match token & 0xF0 {
            TYPE_NULL => ValueType::Null,
            TYPE_STRING => ValueType::String,
            TYPE_STRING_INTERNED => ValueType::StringInterned,
            TYPE_BYTES_HEX => ValueType::BytesHex,
            TYPE_BYTES_BASE64 => ValueType::BytesBase64,
            TYPE_INT => ValueType::Int,
            TYPE_INT_HEX => ValueType::IntHex,
            TYPE_LONG => ValueType::Long,
            TYPE_LONG_HEX => ValueType::LongHex,
            TYPE_FLOAT => ValueType::Float,
            TYPE_DOUBLE => ValueType::Double,
            TYPE_BOOLEAN_TRUE => ValueType::BooleanTrue,
            TYPE_BOOLEAN_FALSE => ValueType::BooleanFalse,
            other => return Err(AbxError::UnknownType(other >> 4)),
        };
        Ok(value_type)
    }
}

/// A decoded value
///
/// Values keep their wire type so the renderer can decide on quoting, numeric
/// base and boolean spelling. Byte payloads stay raw until rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Interned(String),
    BytesHex(Vec<u8>),
    BytesBase64(Vec<u8>),
    Int(i32),
    IntHex(u32),
    Long(i64),
    LongHex(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl Value {
    /// Numbers and booleans, which may be left unquoted in attributes
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_)
                | Value::IntHex(_)
                | Value::Long(_)
                | Value::LongHex(_)
                | Value::Float(_)
                | Value::Double(_)
                | Value::Bool(_)
        )
    }

    /// Textual form of the value under the given options
    pub fn render(&self, options: &FormatOptions) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::String(s) | Value::Interned(s) => Cow::Borrowed(s),
            Value::BytesHex(bytes) => Cow::Owned(hex::encode(bytes)),
            Value::BytesBase64(bytes) => {
                Cow::Owned(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Value::Int(v) => Cow::Owned(v.to_string()),
            Value::IntHex(v) => Cow::Owned(format_hex(&v.to_be_bytes(), options.trim_hex)),
            Value::Long(v) => Cow::Owned(v.to_string()),
            Value::LongHex(v) => Cow::Owned(format_hex(&v.to_be_bytes(), options.trim_hex)),
            Value::Float(v) => Cow::Owned(format_double(f64::from(*v))),
            Value::Double(v) => Cow::Owned(format_double(*v)),
            Value::Bool(v) => Cow::Borrowed(options.bool_style.spell(*v)),
        }
    }
}

/// Shortest round-trip form of a double, with `nan`, `inf` and a signed,
/// two-digit exponent (`1e-05`, `1.5e+16`)
///
/// FLOAT values are widened before formatting, so `0.1f32` comes out as
/// `0.10000000149011612`.
fn format_double(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let repr = format!("{v:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// `0x` followed by the big-endian hex digits, optionally without leading zeros
fn format_hex(bytes: &[u8], trim: bool) -> String {
    let digits = hex::encode(bytes);
    if !trim {
        return format!("0x{digits}");
    }
    match digits.trim_start_matches('0') {
        "" => "0x0".to_string(),
        trimmed => format!("0x{trimmed}"),
    }
}
