//! Document formats: turn bytes into shadow values and back.
//!
//! The codec never touches document text itself. A format parses bytes into a
//! [`Value`] typed against the shadow shape, and emits a staged shadow value
//! as bytes.

pub mod json;

use crate::error::Error;
use crate::options::CodecOptions;
use crate::schema::TypeDesc;
use crate::value::Value;

pub use json::JsonFormat;

/// A wire format for shadow values.
pub trait DocumentFormat {
    fn id(&self) -> &'static str;

    /// Parse `bytes` into a value shaped by `shape`. Absent fields are `Null`.
    fn parse(&self, bytes: &[u8], shape: &TypeDesc, options: &CodecOptions)
        -> Result<Value, Error>;

    /// Serialize a staged shadow value. `Null` record fields are omitted.
    fn emit(&self, shadow: &Value, shape: &TypeDesc, options: &CodecOptions)
        -> Result<Vec<u8>, Error>;
}
