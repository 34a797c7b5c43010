//! Schema descriptions: scalar kinds, composite types, and record fields.

pub mod record;
pub mod types;
pub mod validate;

pub use record::{FieldSpec, RecordSchema};
pub use types::{ScalarKind, TypeDesc};
pub use validate::validate_schema;
