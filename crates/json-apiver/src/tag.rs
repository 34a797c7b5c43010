//! `api` annotation syntax.
//!
//! A tag is a comma-separated list of tokens: a version such as `1.4`, which
//! sets the minimum version, and the flag `str`, which makes a scalar field
//! accept its string form. `"1.4,str"` sets both. An empty tag means "always
//! visible, strictly typed".

use crate::error::{Error, Reason};
use crate::version::ApiVersion;

/// Tag property enabling string-or-native decoding.
pub const TAG_PROPERTY_STR: &str = "str";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldTag {
    pub since: ApiVersion,
    pub coercible: bool,
}

impl FieldTag {
    pub fn parse(tag: &str) -> Result<Self, Error> {
        let mut out = Self::default();
        for token in tag.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token == TAG_PROPERTY_STR {
                out.coercible = true;
                continue;
            }
            out.since = ApiVersion::parse(token)
                .ok_or_else(|| Error::new(Reason::MalformedTag(tag.to_owned())))?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matrix() {
        assert_eq!(FieldTag::parse("").unwrap(), FieldTag::default());
        assert_eq!(
            FieldTag::parse("1.4,str").unwrap(),
            FieldTag {
                since: ApiVersion::new(1, 4),
                coercible: true
            }
        );
        assert_eq!(
            FieldTag::parse("str").unwrap(),
            FieldTag {
                since: ApiVersion::ZERO,
                coercible: true
            }
        );
        assert_eq!(
            FieldTag::parse("2").unwrap().since,
            ApiVersion::new(2, 0)
        );
    }

    #[test]
    fn malformed_tag_is_internal() {
        let err = FieldTag::parse("1.4,strr").unwrap_err();
        assert!(err.is_internal());
        assert_eq!(err.reason(), &Reason::MalformedTag("1.4,strr".into()));
        assert!(FieldTag::parse("abc").is_err());
    }
}
