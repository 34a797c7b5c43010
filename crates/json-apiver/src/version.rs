//! API version numbers.
//!
//! Versions are `major.minor` pairs compared numerically, so `1.10` sorts
//! after `1.9`. The zero version marks fields that are visible at every
//! version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid version `{0}`")]
pub struct VersionParseError(pub String);

/// A requested or minimum API version.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Visible at every version.
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Parse `"1"`, `"1.4"` or `"v1.4"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        if s.is_empty() {
            return None;
        }
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        if !is_digits(major) || !is_digits(minor) {
            return None;
        }
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VersionParseError(s.to_owned()))
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = VersionParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(v: ApiVersion) -> Self {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matrix() {
        assert_eq!(ApiVersion::parse("1"), Some(ApiVersion::new(1, 0)));
        assert_eq!(ApiVersion::parse("1.4"), Some(ApiVersion::new(1, 4)));
        assert_eq!(ApiVersion::parse("v2.10"), Some(ApiVersion::new(2, 10)));
        assert_eq!(ApiVersion::parse(" 3.0 "), Some(ApiVersion::new(3, 0)));
        assert_eq!(ApiVersion::parse(""), None);
        assert_eq!(ApiVersion::parse("1."), None);
        assert_eq!(ApiVersion::parse("1.2.3"), None);
        assert_eq!(ApiVersion::parse("-1.2"), None);
        assert_eq!(ApiVersion::parse("str"), None);
    }

    #[test]
    fn ordering_is_numeric_per_component() {
        assert!(ApiVersion::new(1, 10) > ApiVersion::new(1, 9));
        assert!(ApiVersion::new(2, 0) > ApiVersion::new(1, 99));
        assert!(ApiVersion::ZERO < ApiVersion::new(0, 1));
    }

    #[test]
    fn display_and_from_str() {
        let v: ApiVersion = "1.4".parse().unwrap();
        assert_eq!(v.to_string(), "1.4");
        assert_eq!(
            "x".parse::<ApiVersion>().unwrap_err(),
            VersionParseError("x".into())
        );
    }
}
