use std::sync::Arc;

use super::record::RecordSchema;
use crate::weak::WeakKind;

/// Scalar leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// The weak scalar a string-coercible field of this kind decodes through.
    pub fn weak_kind(self) -> Option<WeakKind> {
        match self {
            Self::Bool => Some(WeakKind::Bool),
            k if k.is_signed() => Some(WeakKind::Int),
            k if k.is_unsigned() => Some(WeakKind::Uint),
            k if k.is_float() => Some(WeakKind::Float),
            _ => None,
        }
    }

    /// Inclusive bounds of a signed kind.
    pub(crate) fn signed_range(self) -> (i64, i64) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            _ => (i64::MIN, i64::MAX),
        }
    }

    /// Upper bound of an unsigned kind.
    pub(crate) fn unsigned_max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX.into(),
            _ => u64::MAX,
        }
    }
}

/// Description of a target or shadow type.
///
/// Target schemas use every variant except [`TypeDesc::Weak`], which only
/// appears in shadows derived for decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Scalar(ScalarKind),
    /// Leaf carried verbatim, with its own JSON representation.
    Opaque,
    Weak(WeakKind),
    Optional(Box<TypeDesc>),
    List(Box<TypeDesc>),
    Map {
        key: Box<TypeDesc>,
        value: Box<TypeDesc>,
    },
    Record(Arc<RecordSchema>),
}

impl TypeDesc {
    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    pub fn i32() -> Self {
        Self::Scalar(ScalarKind::I32)
    }

    pub fn i64() -> Self {
        Self::Scalar(ScalarKind::I64)
    }

    pub fn u64() -> Self {
        Self::Scalar(ScalarKind::U64)
    }

    pub fn f32() -> Self {
        Self::Scalar(ScalarKind::F32)
    }

    pub fn f64() -> Self {
        Self::Scalar(ScalarKind::F64)
    }

    pub fn str() -> Self {
        Self::Scalar(ScalarKind::Str)
    }

    pub fn optional(inner: TypeDesc) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(item: TypeDesc) -> Self {
        Self::List(Box::new(item))
    }

    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn record(schema: Arc<RecordSchema>) -> Self {
        Self::Record(schema)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(k) => k.as_str(),
            Self::Opaque => "opaque",
            Self::Weak(k) => k.as_str(),
            Self::Optional(_) => "optional",
            Self::List(_) => "list",
            Self::Map { .. } => "map",
            Self::Record(_) => "record",
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Peels every optional layer.
    pub fn strip_optional(&self) -> &TypeDesc {
        let mut ty = self;
        while let Self::Optional(inner) = ty {
            ty = inner;
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kind_classification() {
        assert!(ScalarKind::I8.is_integer());
        assert!(ScalarKind::U64.is_unsigned());
        assert!(!ScalarKind::U64.is_signed());
        assert!(ScalarKind::F32.is_float());
        assert!(!ScalarKind::Str.is_integer());
        assert_eq!(ScalarKind::I16.as_str(), "i16");
    }

    #[test]
    fn weak_kind_mapping() {
        assert_eq!(ScalarKind::I8.weak_kind(), Some(WeakKind::Int));
        assert_eq!(ScalarKind::U32.weak_kind(), Some(WeakKind::Uint));
        assert_eq!(ScalarKind::F32.weak_kind(), Some(WeakKind::Float));
        assert_eq!(ScalarKind::Bool.weak_kind(), Some(WeakKind::Bool));
        assert_eq!(ScalarKind::Str.weak_kind(), None);
    }

    #[test]
    fn ranges() {
        assert_eq!(ScalarKind::I8.signed_range(), (-128, 127));
        assert_eq!(ScalarKind::U16.unsigned_max(), 65_535);
        assert_eq!(ScalarKind::U64.unsigned_max(), u64::MAX);
    }

    #[test]
    fn strip_optional_peels_all_layers() {
        let ty = TypeDesc::optional(TypeDesc::optional(TypeDesc::i64()));
        assert_eq!(ty.strip_optional(), &TypeDesc::i64());
        assert!(ty.is_optional());
        assert_eq!(ty.kind(), "optional");
    }
}
