use serde::{Deserialize, Serialize};

/// Codec configuration. Every field has a default, so partial TOML or JSON
/// config files deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Fail on document keys the requested version does not know about.
    pub reject_unknown_fields: bool,
    /// Reject schemas with a versioned field whose type is not optional.
    pub strict_versioned_fields: bool,
    /// Pretty-print emitted documents with this indent.
    pub indent: Option<String>,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            reject_unknown_fields: false,
            strict_versioned_fields: true,
            indent: None,
        }
    }
}

impl CodecOptions {
    pub fn reject_unknown_fields(mut self, reject: bool) -> Self {
        self.reject_unknown_fields = reject;
        self
    }

    pub fn strict_versioned_fields(mut self, strict: bool) -> Self {
        self.strict_versioned_fields = strict;
        self
    }

    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }
}
