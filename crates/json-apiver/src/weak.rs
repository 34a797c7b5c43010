//! Weak scalars: numbers and booleans that also accept a string form.
//!
//! Loosely-typed producers send `"42"` where `42` is meant, and `"0"` or `""`
//! where `false` is meant. Fields flagged as string-coercible decode through
//! these converters instead of the strict scalar path.

use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WeakScalarError {
    #[error("not an integer")]
    NotAnInteger,
    #[error("not a number")]
    NotANumber,
}

/// Weak scalar family a coercible field is staged through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeakKind {
    Int,
    Uint,
    Float,
    Bool,
}

impl WeakKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "weak int",
            Self::Uint => "weak uint",
            Self::Float => "weak float",
            Self::Bool => "weak bool",
        }
    }
}

/// Decoded weak scalar, always at full width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeakScalar {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

impl WeakScalar {
    pub fn decode(kind: WeakKind, raw: &Json) -> Result<Self, WeakScalarError> {
        Ok(match kind {
            WeakKind::Int => Self::Int(decode_int(raw)?),
            WeakKind::Uint => Self::Uint(decode_uint(raw)?),
            WeakKind::Float => Self::Float(decode_float(raw)?),
            WeakKind::Bool => Self::Bool(decode_bool(raw)),
        })
    }

    /// Native JSON form. Weak scalars are always written unquoted.
    pub fn encode(self) -> Json {
        match self {
            Self::Int(i) => Json::from(i),
            Self::Uint(u) => Json::from(u),
            Self::Float(f) => serde_json::Number::from_f64(f).map_or(Json::Null, Json::Number),
            Self::Bool(b) => Json::Bool(b),
        }
    }
}

pub fn decode_int(raw: &Json) -> Result<i64, WeakScalarError> {
    match raw {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or(WeakScalarError::NotAnInteger)
}

pub fn decode_uint(raw: &Json) -> Result<u64, WeakScalarError> {
    match raw {
        Json::Number(n) => n.as_u64(),
        Json::String(s) if !s.starts_with('+') => s.parse().ok(),
        _ => None,
    }
    .ok_or(WeakScalarError::NotAnInteger)
}

pub fn decode_float(raw: &Json) -> Result<f64, WeakScalarError> {
    match raw {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or(WeakScalarError::NotANumber)
}

/// Perl-style truthiness.
///
/// `""` and `"0"` are false, as is any value whose JSON text is a number equal
/// to zero. Every other value is true, including `"0.0"`, `"false"`, `[]`,
/// `{}` and the native `false`.
pub fn decode_bool(raw: &Json) -> bool {
    match raw {
        Json::String(s) => !(s.is_empty() || s == "0"),
        Json::Number(n) => !matches!(n.as_f64(), Some(f) if f == 0.0),
        Json::Null | Json::Bool(_) | Json::Array(_) | Json::Object(_) => true,
    }
}
