//! Version-aware codec over a target schema.
//!
//! A [`Codec`] owns a validated target schema and caches one shadow per
//! `(version, purpose)` pair. Decoding parses a document against the decode
//! shadow and reconciles it into a target value; encoding stages a target value
//! into the encode shadow and emits it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::Error;
use crate::format::{DocumentFormat, JsonFormat};
use crate::options::CodecOptions;
use crate::reconcile::{reconcile_decode, reconcile_encode};
use crate::schema::{validate_schema, TypeDesc};
use crate::shadow::{derive_shadow, Purpose};
use crate::value::Value;
use crate::version::ApiVersion;

type ShadowCache = HashMap<(ApiVersion, Purpose), Arc<TypeDesc>>;

pub struct Codec<F = JsonFormat> {
    schema: TypeDesc,
    options: CodecOptions,
    format: F,
    shadows: RwLock<ShadowCache>,
}

impl Codec<JsonFormat> {
    /// JSON codec with default options.
    pub fn new(schema: TypeDesc) -> Result<Self, Error> {
        Self::with_options(schema, CodecOptions::default())
    }

    pub fn with_options(schema: TypeDesc, options: CodecOptions) -> Result<Self, Error> {
        Self::with_format(schema, options, JsonFormat)
    }
}

impl<F: DocumentFormat> Codec<F> {
    /// Validate `schema` and build a codec over `format`.
    pub fn with_format(schema: TypeDesc, options: CodecOptions, format: F) -> Result<Self, Error> {
        validate_schema(&schema, options.strict_versioned_fields)?;
        Ok(Self {
            schema,
            options,
            format,
            shadows: RwLock::new(HashMap::new()),
        })
    }

    pub fn schema(&self) -> &TypeDesc {
        &self.schema
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    /// Shadow of the target schema for `version`, derived on first use.
    pub fn shadow(&self, version: ApiVersion, purpose: Purpose) -> Result<Arc<TypeDesc>, Error> {
        let key = (version, purpose);
        if let Some(shadow) = self.shadows.read().get(&key) {
            debug!(%version, purpose = purpose.as_str(), "shadow cache hit");
            return Ok(Arc::clone(shadow));
        }

        let derived = Arc::new(derive_shadow(&self.schema, version, purpose)?);
        debug!(%version, purpose = purpose.as_str(), "derived shadow");
        let mut shadows = self.shadows.write();
        Ok(Arc::clone(shadows.entry(key).or_insert(derived)))
    }

    /// Decode `bytes` as the document of `version` into `target`.
    ///
    /// Fields absent from the document keep their current value in `target`.
    /// On error `target` is left as it was.
    pub fn decode(
        &self,
        bytes: &[u8],
        target: &mut Value,
        version: ApiVersion,
    ) -> Result<(), Error> {
        let result = self.decode_inner(bytes, target, version);
        self.observe("decode", version, result)
    }

    fn decode_inner(
        &self,
        bytes: &[u8],
        target: &mut Value,
        version: ApiVersion,
    ) -> Result<(), Error> {
        let shadow_ty = self.shadow(version, Purpose::Decode)?;
        let shadow = self.format.parse(bytes, &shadow_ty, &self.options)?;
        self.reconcile_into(&shadow_ty, shadow, target)
    }

    /// Reconcile a shadow value that was already parsed against
    /// [`Codec::shadow`] for `version`.
    pub fn decode_shadow(
        &self,
        shadow: Value,
        target: &mut Value,
        version: ApiVersion,
    ) -> Result<(), Error> {
        let result = self
            .shadow(version, Purpose::Decode)
            .and_then(|shadow_ty| self.reconcile_into(&shadow_ty, shadow, target));
        self.observe("decode", version, result)
    }

    fn reconcile_into(
        &self,
        shadow_ty: &TypeDesc,
        shadow: Value,
        target: &mut Value,
    ) -> Result<(), Error> {
        let mut staged = target.clone();
        reconcile_decode(shadow_ty, shadow, &self.schema, &mut staged)?;
        *target = staged;
        Ok(())
    }

    /// Encode `target` as the document of `version`.
    pub fn encode(&self, target: &Value, version: ApiVersion) -> Result<Vec<u8>, Error> {
        let result = self.encode_with(target, version, &self.options);
        self.observe("encode", version, result)
    }

    /// Like [`Codec::encode`], pretty-printed with `indent`.
    pub fn encode_pretty(
        &self,
        target: &Value,
        version: ApiVersion,
        indent: &str,
    ) -> Result<Vec<u8>, Error> {
        let options = self.options.clone().indent(indent);
        let result = self.encode_with(target, version, &options);
        self.observe("encode", version, result)
    }

    fn encode_with(
        &self,
        target: &Value,
        version: ApiVersion,
        options: &CodecOptions,
    ) -> Result<Vec<u8>, Error> {
        let shadow_ty = self.shadow(version, Purpose::Encode)?;
        let shadow = reconcile_encode(&self.schema, target, &shadow_ty)?;
        self.format.emit(&shadow, &shadow_ty, options)
    }

    fn observe<T>(
        &self,
        op: &'static str,
        version: ApiVersion,
        result: Result<T, Error>,
    ) -> Result<T, Error> {
        if let Err(err) = &result {
            if err.is_internal() {
                let format = self.format.id();
                warn!(op, %version, format, error = %err, "codec internal error");
            }
        }
        result
    }
}

impl<F> std::fmt::Debug for Codec<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .field("cached_shadows", &self.shadows.read().len())
            .finish()
    }
}
