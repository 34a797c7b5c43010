//! Dynamic value tree shared by target and shadow values.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Reason};
use crate::schema::{ScalarKind, TypeDesc};
use crate::weak::WeakKind;

/// Record contents keyed by logical field name.
pub type Record = IndexMap<String, Value>;

/// A value shaped by a [`TypeDesc`].
///
/// `Null` means "absent". For lists and maps it is the nil collection, which
/// stays distinct from an empty one. Only an optional position is expected to
/// hold a nil collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Opaque(serde_json::Value),
    List(Vec<Value>),
    Map(IndexMap<MapKey, Value>),
    Record(Record),
}

impl Value {
    /// Zero value of a type: scalars are `0`, `false` or `""`; lists and maps
    /// are empty; records hold every field at its zero; optionals and opaque
    /// leaves are `Null`.
    pub fn zero(ty: &TypeDesc) -> Self {
        match ty {
            TypeDesc::Scalar(k) => zero_scalar(*k),
            TypeDesc::Weak(WeakKind::Int) => Self::Int(0),
            TypeDesc::Weak(WeakKind::Uint) => Self::Uint(0),
            TypeDesc::Weak(WeakKind::Float) => Self::Float(0.0),
            TypeDesc::Weak(WeakKind::Bool) => Self::Bool(false),
            TypeDesc::Record(schema) => Self::Record(
                schema
                    .fields()
                    .map(|f| (f.name.clone(), Self::zero(&f.ty)))
                    .collect(),
            ),
            TypeDesc::List(_) => Self::List(Vec::new()),
            TypeDesc::Map { .. } => Self::Map(IndexMap::new()),
            TypeDesc::Opaque | TypeDesc::Optional(_) => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Opaque(_) => "opaque",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Field of a record value by logical name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_record()?.get(field)
    }
}

fn zero_scalar(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Bool => Value::Bool(false),
        ScalarKind::Str => Value::Str(String::new()),
        k if k.is_signed() => Value::Int(0),
        k if k.is_unsigned() => Value::Uint(0),
        _ => Value::Float(0.0),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

/// Map key. Document keys are always strings; integer keys are parsed from
/// and printed back to their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Str(String),
    Int(i64),
    Uint(u64),
}

impl MapKey {
    /// Parse a document key against the key type.
    pub fn parse(raw: &str, ty: &TypeDesc) -> Result<Self, Error> {
        let TypeDesc::Scalar(kind) = ty else {
            return Err(Reason::InvalidMapKeyType(ty.kind()).into());
        };
        let invalid = || Error::new(Reason::InvalidKey(kind.as_str()));
        let key = match kind {
            ScalarKind::Str => Self::Str(raw.to_owned()),
            k if k.is_signed() => Self::Int(raw.parse().map_err(|_| invalid())?),
            k if k.is_unsigned() => Self::Uint(raw.parse().map_err(|_| invalid())?),
            _ => return Err(Reason::InvalidMapKeyType(kind.as_str()).into()),
        };
        let value = coerce_scalar(Value::from(key), *kind).map_err(|_| invalid())?;
        Self::try_from(value)
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
        }
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Str(s) => Self::Str(s),
            MapKey::Int(i) => Self::Int(i),
            MapKey::Uint(u) => Self::Uint(u),
        }
    }
}

impl TryFrom<Value> for MapKey {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(s) => Ok(Self::Str(s)),
            Value::Int(i) => Ok(Self::Int(i)),
            Value::Uint(u) => Ok(Self::Uint(u)),
            other => Err(Error::shape(other.kind(), "map key")),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

/// Round an `f64` to the nearest `f32` and widen it back through its shortest
/// decimal form, so `42.8f32` becomes exactly `42.8` instead of
/// `42.79999923706055`.
pub fn narrow_f32(f: f64) -> f64 {
    let narrow = f as f32;
    if !narrow.is_finite() {
        return f64::from(narrow);
    }
    narrow.to_string().parse().unwrap_or(f64::from(narrow))
}

/// Convert a scalar value into the representation of `kind`.
///
/// Integer widths are range checked, and `f32` values are narrowed with
/// [`narrow_f32`]. Crossing families (string to number, float to integer) is a
/// shape mismatch.
pub fn coerce_scalar(value: Value, kind: ScalarKind) -> Result<Value, Error> {
    let out_of_range = || Error::new(Reason::OutOfRange(kind.as_str()));
    match (value, kind) {
        (Value::Bool(b), ScalarKind::Bool) => Ok(Value::Bool(b)),
        (Value::Str(s), ScalarKind::Str) => Ok(Value::Str(s)),
        (Value::Int(i), k) if k.is_signed() => {
            let (lo, hi) = k.signed_range();
            if (lo..=hi).contains(&i) {
                Ok(Value::Int(i))
            } else {
                Err(out_of_range())
            }
        }
        (Value::Uint(u), k) if k.is_signed() => {
            let (_, hi) = k.signed_range();
            match i64::try_from(u) {
                Ok(i) if i <= hi => Ok(Value::Int(i)),
                _ => Err(out_of_range()),
            }
        }
        (Value::Uint(u), k) if k.is_unsigned() => {
            if u <= k.unsigned_max() {
                Ok(Value::Uint(u))
            } else {
                Err(out_of_range())
            }
        }
        (Value::Int(i), k) if k.is_unsigned() => match u64::try_from(i) {
            Ok(u) if u <= k.unsigned_max() => Ok(Value::Uint(u)),
            _ => Err(out_of_range()),
        },
        (Value::Float(f), ScalarKind::F64) => Ok(Value::Float(f)),
        (Value::Float(f), ScalarKind::F32) => {
            if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                return Err(out_of_range());
            }
            Ok(Value::Float(narrow_f32(f)))
        }
        (Value::Int(i), k) if k.is_float() => coerce_scalar(Value::Float(i as f64), k),
        (Value::Uint(u), k) if k.is_float() => coerce_scalar(Value::Float(u as f64), k),
        (other, k) => Err(Error::shape(other.kind(), k.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, RecordSchema};

    #[test]
    fn zero_values() {
        let schema = RecordSchema::new(
            "Obj",
            [
                FieldSpec::new("n", TypeDesc::i64()),
                FieldSpec::new("s", TypeDesc::str()),
                FieldSpec::new("l", TypeDesc::list(TypeDesc::i64())),
                FieldSpec::new("m", TypeDesc::map(TypeDesc::str(), TypeDesc::i64())),
                FieldSpec::new("o", TypeDesc::optional(TypeDesc::bool())),
                FieldSpec::new("ol", TypeDesc::optional(TypeDesc::list(TypeDesc::i64()))),
            ],
        )
        .unwrap();
        let zero = Value::zero(&TypeDesc::record(schema));
        assert_eq!(zero.get("n"), Some(&Value::Int(0)));
        assert_eq!(zero.get("s"), Some(&Value::Str(String::new())));
        assert_eq!(zero.get("l"), Some(&Value::List(vec![])));
        assert_eq!(zero.get("m"), Some(&Value::Map(IndexMap::new())));
        assert_eq!(zero.get("o"), Some(&Value::Null));
        assert_eq!(zero.get("ol"), Some(&Value::Null));
        assert_eq!(Value::zero(&TypeDesc::u64()), Value::Uint(0));
    }

    #[test]
    fn narrow_f32_keeps_shortest_decimal() {
        assert_eq!(narrow_f32(42.8), 42.8);
        assert_eq!(narrow_f32(f64::from(42.8f32)), 42.8);
        assert_eq!(narrow_f32(0.1), 0.1);
        assert!(narrow_f32(f64::NAN).is_nan());
    }

    #[test]
    fn coerce_integer_widths() {
        assert_eq!(coerce_scalar(Value::Int(127), ScalarKind::I8), Ok(Value::Int(127)));
        assert!(coerce_scalar(Value::Int(128), ScalarKind::I8).unwrap_err().is_user());
        assert_eq!(coerce_scalar(Value::Uint(5), ScalarKind::I32), Ok(Value::Int(5)));
        assert_eq!(coerce_scalar(Value::Int(5), ScalarKind::U8), Ok(Value::Uint(5)));
        assert!(coerce_scalar(Value::Int(-1), ScalarKind::U64).is_err());
        assert!(coerce_scalar(Value::Uint(u64::MAX), ScalarKind::I64).is_err());
    }

    #[test]
    fn coerce_floats() {
        assert_eq!(coerce_scalar(Value::Float(1.5), ScalarKind::F64), Ok(Value::Float(1.5)));
        assert_eq!(coerce_scalar(Value::Float(42.8), ScalarKind::F32), Ok(Value::Float(42.8)));
        assert_eq!(coerce_scalar(Value::Int(3), ScalarKind::F64), Ok(Value::Float(3.0)));
        assert!(coerce_scalar(Value::Float(1e300), ScalarKind::F32).is_err());
    }

    #[test]
    fn coerce_across_families_is_internal() {
        let err = coerce_scalar(Value::Str("1".into()), ScalarKind::I64).unwrap_err();
        assert!(err.is_internal());
        let err = coerce_scalar(Value::Float(1.0), ScalarKind::I64).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn map_key_parse() {
        assert_eq!(MapKey::parse("x", &TypeDesc::str()), Ok(MapKey::Str("x".into())));
        assert_eq!(MapKey::parse("-4", &TypeDesc::i64()), Ok(MapKey::Int(-4)));
        assert_eq!(MapKey::parse("4", &TypeDesc::u64()), Ok(MapKey::Uint(4)));
        assert!(MapKey::parse("-4", &TypeDesc::u64()).unwrap_err().is_user());
        assert!(MapKey::parse("300", &TypeDesc::Scalar(ScalarKind::U8)).is_err());
        assert_eq!(MapKey::Int(-4).to_string(), "-4");
    }
}
