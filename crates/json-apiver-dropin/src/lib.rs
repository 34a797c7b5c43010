//! Marshal/unmarshal surface over `json-apiver`, pinned to one API version.
//!
//! Code written against a plain JSON marshaller can switch to version-aware
//! encoding by swapping the marshaller for a [`JsonDropIn`]:
//!
//! ```ignore
//! let json = JsonDropIn::new("1.4".parse()?);
//! json.unmarshal(bytes, &mut obj)?;
//! ```

use std::io::{self, Read, Write};

use json_apiver::{ApiType, ApiVersion, CodecOptions, TypedCodec};
use serde_json::de::{IoRead, StreamDeserializer};
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum DropInError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] json_apiver::Error),
    #[error("malformed document stream: {0}")]
    Syntax(serde_json::Error),
}

impl From<serde_json::Error> for DropInError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Syntax(err)
        }
    }
}

impl DropInError {
    /// Message safe to hand to an external caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Codec(err) => err.public_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonDropIn {
    version: ApiVersion,
    options: CodecOptions,
}

impl JsonDropIn {
    pub fn new(version: ApiVersion) -> Self {
        Self::with_options(version, CodecOptions::default())
    }

    pub fn with_options(version: ApiVersion, options: CodecOptions) -> Self {
        Self { version, options }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    fn codec<T: ApiType>(&self) -> Result<TypedCodec<T>, DropInError> {
        Ok(TypedCodec::with_options(self.options.clone())?)
    }

    pub fn marshal<T: ApiType>(&self, value: &T) -> Result<Vec<u8>, DropInError> {
        Ok(self.codec::<T>()?.encode(value, self.version)?)
    }

    /// Pretty-printed [`marshal`](Self::marshal). Every line after the first
    /// starts with `prefix`, followed by one `indent` per nesting level.
    pub fn marshal_indent<T: ApiType>(
        &self,
        value: &T,
        prefix: &str,
        indent: &str,
    ) -> Result<Vec<u8>, DropInError> {
        let out = self.codec::<T>()?.encode_pretty(value, self.version, indent)?;
        Ok(apply_prefix(out, prefix))
    }

    pub fn unmarshal<T: ApiType>(&self, bytes: &[u8], target: &mut T) -> Result<(), DropInError> {
        Ok(self.codec::<T>()?.decode(bytes, target, self.version)?)
    }

    pub fn new_decoder<R: Read>(&self, reader: R) -> Decoder<R> {
        Decoder {
            version: self.version,
            options: self.options.clone(),
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
        }
    }

    pub fn new_encoder<W: Write>(&self, writer: W) -> Encoder<W> {
        Encoder {
            version: self.version,
            options: self.options.clone(),
            writer,
        }
    }
}

fn apply_prefix(out: Vec<u8>, prefix: &str) -> Vec<u8> {
    if prefix.is_empty() {
        return out;
    }
    let mut prefixed = Vec::with_capacity(out.len() + prefix.len() * 8);
    for &b in &out {
        prefixed.push(b);
        if b == b'\n' {
            prefixed.extend_from_slice(prefix.as_bytes());
        }
    }
    prefixed
}

/// Reads a stream of whitespace-separated JSON documents.
pub struct Decoder<R: Read> {
    version: ApiVersion,
    options: CodecOptions,
    stream: StreamDeserializer<'static, IoRead<R>, Box<RawValue>>,
}

impl<R: Read> Decoder<R> {
    /// Fail on document keys the version does not know about.
    pub fn disallow_unknown_fields(&mut self) {
        self.options.reject_unknown_fields = true;
    }

    /// Bytes consumed so far.
    pub fn byte_offset(&self) -> usize {
        self.stream.byte_offset()
    }

    /// Decode the next document into `target`. Returns `false` once the
    /// stream is exhausted.
    pub fn decode<T: ApiType>(&mut self, target: &mut T) -> Result<bool, DropInError> {
        let Some(raw) = self.stream.next() else {
            return Ok(false);
        };
        let raw = raw?;
        trace!(offset = self.stream.byte_offset(), "decoding stream document");
        let codec = TypedCodec::<T>::with_options(self.options.clone())?;
        codec.decode(raw.get().as_bytes(), target, self.version)?;
        Ok(true)
    }
}

/// Writes one JSON document per [`encode`](Self::encode) call, each followed
/// by a newline.
pub struct Encoder<W: Write> {
    version: ApiVersion,
    options: CodecOptions,
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.options.indent = Some(indent.into());
    }

    pub fn encode<T: ApiType>(&mut self, value: &T) -> Result<(), DropInError> {
        let codec = TypedCodec::<T>::with_options(self.options.clone())?;
        let bytes = codec.encode(value, self.version)?;
        self.writer.write_all(&bytes)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
