//! Codec error type.
//!
//! Every failure carries a [`Reason`] and the path from the document root to
//! the offending value. Reasons split into two kinds: internal errors come from
//! how a schema was declared and should be logged as server faults, while user
//! errors describe bad input and are safe to return to the caller verbatim.

use std::fmt;

use thiserror::Error;

use crate::weak::WeakScalarError;

/// Who is at fault for an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Schema declaration or programming error.
    Internal,
    /// Invalid input document.
    User,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Reason {
    // -- internal ---------------------------------------------------------
    #[error("shape mismatch: shadow is {shadow}, target is {target}")]
    ShapeMismatch {
        shadow: &'static str,
        target: &'static str,
    },
    #[error("record `{record}` has no field `{field}`")]
    UnknownTargetField { record: String, field: String },
    #[error("malformed api tag `{0}`")]
    MalformedTag(String),
    #[error("field `{record}.{field}` is versioned and must be optional")]
    RequiredVersionedField { record: String, field: String },
    #[error("duplicate field `{field}` in record `{record}`")]
    DuplicateField { record: String, field: String },
    #[error("map keys must be strings or integers, found {0}")]
    InvalidMapKeyType(&'static str),
    #[error("value cannot be represented in a document: {0}")]
    Unrepresentable(String),
    #[error("typed value does not match its schema: {0}")]
    Bridge(String),

    // -- user -------------------------------------------------------------
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error(transparent)]
    WeakScalar(#[from] WeakScalarError),
    #[error("expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value out of range for {0}")]
    OutOfRange(&'static str),
    #[error("invalid map key for {0}")]
    InvalidKey(&'static str),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("malformed document: {0}")]
    Syntax(String),
}

impl Reason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. }
            | Self::UnknownTargetField { .. }
            | Self::MalformedTag(_)
            | Self::RequiredVersionedField { .. }
            | Self::DuplicateField { .. }
            | Self::InvalidMapKeyType(_)
            | Self::Unrepresentable(_)
            | Self::Bridge(_) => ErrorKind::Internal,
            Self::MissingField(_)
            | Self::WeakScalar(_)
            | Self::InvalidType { .. }
            | Self::OutOfRange(_)
            | Self::InvalidKey(_)
            | Self::UnknownField(_)
            | Self::Syntax(_) => ErrorKind::User,
        }
    }
}

/// One step of an error path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Record field, by wire name.
    Field(String),
    /// List element.
    Index(usize),
    /// Map entry.
    Key(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    reason: Reason,
    path: Vec<PathSegment>,
}

impl Error {
    pub fn new(reason: Reason) -> Self {
        Self {
            reason,
            path: Vec::new(),
        }
    }

    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Path segments from the root down to the failing value.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    pub fn kind(&self) -> ErrorKind {
        self.reason.kind()
    }

    pub fn is_user(&self) -> bool {
        self.kind() == ErrorKind::User
    }

    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Message safe to hand to an external caller.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::User => self.to_string(),
            ErrorKind::Internal => "internal error".to_owned(),
        }
    }

    pub fn at_field(self, name: impl Into<String>) -> Self {
        self.prepend(PathSegment::Field(name.into()))
    }

    pub fn at_index(self, index: usize) -> Self {
        self.prepend(PathSegment::Index(index))
    }

    pub fn at_key(self, key: impl fmt::Display) -> Self {
        self.prepend(PathSegment::Key(key.to_string()))
    }

    fn prepend(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    pub(crate) fn shape(shadow: &'static str, target: &'static str) -> Self {
        Self::new(Reason::ShapeMismatch { shadow, target })
    }
}

impl From<Reason> for Error {
    fn from(reason: Reason) -> Self {
        Self::new(reason)
    }
}

impl From<WeakScalarError> for Error {
    fn from(err: WeakScalarError) -> Self {
        Self::new(Reason::WeakScalar(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.reason);
        }
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        write!(f, ": {}", self.reason)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.reason {
            Reason::WeakScalar(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_path_segments() {
        let err = Error::new(Reason::WeakScalar(WeakScalarError::NotAnInteger))
            .at_field("c")
            .at_key("x")
            .at_field("bs");
        assert_eq!(err.to_string(), r#"bs["x"].c: not an integer"#);

        let err = Error::new(Reason::MissingField("a".into())).at_index(2);
        assert_eq!(err.to_string(), "[2]: missing required field: a");
    }

    #[test]
    fn kind_splits_user_and_internal() {
        let user = Error::new(Reason::MissingField("a".into()));
        assert!(user.is_user());
        assert_eq!(user.public_message(), "missing required field: a");

        let internal = Error::new(Reason::UnknownTargetField {
            record: "Obj".into(),
            field: "secret".into(),
        });
        assert!(internal.is_internal());
        assert_eq!(internal.public_message(), "internal error");
        assert!(internal.to_string().contains("secret"));
    }
}
