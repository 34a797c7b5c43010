//! Version-gated JSON codec.
//!
//! Every record field carries a minimum API version. When a document is
//! decoded or encoded for a requested version, fields newer than that version
//! are neither read nor written. Fields can also be marked string-coercible so
//! that `"42"` decodes into an integer slot and `"0"` into `false`.
//!
//! The codec works on a *shadow* of the target schema: a copy in which gated
//! fields are dropped and every remaining field is optional, so a missing
//! field can be told apart from one present with a zero value. Documents are
//! parsed into the shadow and then reconciled into the target, and the reverse
//! for encoding.
//!
//! ```
//! use json_apiver::{ApiVersion, Codec, FieldSpec, RecordSchema, TypeDesc, Value};
//!
//! let schema = RecordSchema::new(
//!     "Obj",
//!     [
//!         FieldSpec::tagged("foo", TypeDesc::i64(), "str").unwrap(),
//!         FieldSpec::tagged("a", TypeDesc::optional(TypeDesc::i64()), "1.4").unwrap(),
//!     ],
//! )
//! .unwrap();
//! let codec = Codec::new(TypeDesc::record(schema)).unwrap();
//!
//! let mut target = Value::zero(codec.schema());
//! codec
//!     .decode(br#"{"foo": "42", "a": 7}"#, &mut target, ApiVersion::new(1, 3))
//!     .unwrap();
//! assert_eq!(target.get("foo"), Some(&Value::Int(42)));
//! assert_eq!(target.get("a"), Some(&Value::Null));
//! ```

pub mod codec;
pub mod error;
pub mod format;
pub mod options;
pub mod reconcile;
pub mod schema;
pub mod shadow;
pub mod tag;
pub mod typed;
pub mod value;
pub mod version;
pub mod weak;

pub use codec::Codec;
pub use error::{Error, ErrorKind, PathSegment, Reason};
pub use format::{DocumentFormat, JsonFormat};
pub use options::CodecOptions;
pub use reconcile::{reconcile_decode, reconcile_encode};
pub use schema::{validate_schema, FieldSpec, RecordSchema, ScalarKind, TypeDesc};
pub use shadow::{derive_shadow, Purpose};
pub use tag::FieldTag;
pub use typed::{decode, encode, ApiType, TypedCodec};
pub use value::{MapKey, Record, Value};
pub use version::ApiVersion;
pub use weak::{WeakKind, WeakScalar, WeakScalarError};
