//! Typed layer: decode into and encode from plain Rust structs.
//!
//! A type opts in by describing its schema with [`ApiType`]. Its `serde`
//! representation must key fields by their logical names; wire names, version
//! gates and coercion live in the schema, not in `serde` attributes. Nil
//! collections are written as `Option<Vec<_>>` / `Option<HashMap<_, _>>` with
//! an optional schema type.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::{Error, Reason};
use crate::format::json::{from_json, to_json, Naming};
use crate::options::CodecOptions;
use crate::schema::TypeDesc;
use crate::value::Value;
use crate::version::ApiVersion;

/// A Rust type with a version-aware schema.
pub trait ApiType: Serialize + DeserializeOwned {
    fn api_schema() -> TypeDesc;
}

/// Codec bound to one [`ApiType`]. Hold one per type to reuse its shadow cache.
pub struct TypedCodec<T> {
    codec: Codec,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ApiType> TypedCodec<T> {
    pub fn new() -> Result<Self, Error> {
        Self::with_options(CodecOptions::default())
    }

    pub fn with_options(options: CodecOptions) -> Result<Self, Error> {
        Ok(Self {
            codec: Codec::with_options(T::api_schema(), options)?,
            _marker: PhantomData,
        })
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Decode the document of `version` into `target`. Fields the document
    /// does not carry keep their current values.
    pub fn decode(&self, bytes: &[u8], target: &mut T, version: ApiVersion) -> Result<(), Error> {
        let mut value = self.lift(target)?;
        self.codec.decode(bytes, &mut value, version)?;
        *target = self.lower(&value)?;
        Ok(())
    }

    pub fn encode(&self, source: &T, version: ApiVersion) -> Result<Vec<u8>, Error> {
        self.codec.encode(&self.lift(source)?, version)
    }

    pub fn encode_pretty(
        &self,
        source: &T,
        version: ApiVersion,
        indent: &str,
    ) -> Result<Vec<u8>, Error> {
        self.codec.encode_pretty(&self.lift(source)?, version, indent)
    }

    /// Typed value → dynamic value.
    pub fn lift(&self, source: &T) -> Result<Value, Error> {
        let json = serde_json::to_value(source).map_err(bridge)?;
        from_json(&json, self.codec.schema(), Naming::Logical, &CodecOptions::default())
            .map_err(bridge)
    }

    /// Dynamic value → typed value.
    pub fn lower(&self, value: &Value) -> Result<T, Error> {
        let json = to_json(value, self.codec.schema(), Naming::Logical).map_err(bridge)?;
        serde_json::from_value(json).map_err(bridge)
    }
}

fn bridge(err: impl std::fmt::Display) -> Error {
    Error::new(Reason::Bridge(err.to_string()))
}

/// Decode `bytes` as the document of `version` into `target`.
///
/// Builds a fresh [`TypedCodec`]; keep one around when decoding repeatedly.
pub fn decode<T: ApiType>(bytes: &[u8], target: &mut T, version: ApiVersion) -> Result<(), Error> {
    TypedCodec::<T>::new()?.decode(bytes, target, version)
}

/// Encode `source` as the document of `version`.
pub fn encode<T: ApiType>(source: &T, version: ApiVersion) -> Result<Vec<u8>, Error> {
    TypedCodec::<T>::new()?.encode(source, version)
}
