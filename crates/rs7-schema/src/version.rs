//! HL7 v2 version identifiers

use std::fmt;
use std::str::FromStr;

/// A supported HL7 v2 version.
///
/// This is the version set the schema registry ships data for
/// (spec.md §4.B: `v ∈ {2.2, 2.3, 2.3.1, 2.4, 2.5, 2.5.1, 2.6}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    V2_2,
    V2_3,
    V2_3_1,
    V2_4,
    V2_5,
    V2_5_1,
    V2_6,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V2_2 => "2.2",
            Version::V2_3 => "2.3",
            Version::V2_3_1 => "2.3.1",
            Version::V2_4 => "2.4",
            Version::V2_5 => "2.5",
            Version::V2_5_1 => "2.5.1",
            Version::V2_6 => "2.6",
        }
    }

    pub fn all() -> &'static [Version] {
        &[
            Version::V2_2,
            Version::V2_3,
            Version::V2_3_1,
            Version::V2_4,
            Version::V2_5,
            Version::V2_5_1,
            Version::V2_6,
        ]
    }

    /// The version used when a process default is needed and nothing else
    /// is inferable (spec.md §6 "default: inferred from MSH or a process
    /// default").
    pub fn common() -> Version {
        Version::V2_5_1
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2.2" => Ok(Version::V2_2),
            "2.3" => Ok(Version::V2_3),
            "2.3.1" => Ok(Version::V2_3_1),
            "2.4" => Ok(Version::V2_4),
            "2.5" => Ok(Version::V2_5),
            "2.5.1" => Ok(Version::V2_5_1),
            "2.6" => Ok(Version::V2_6),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}

/// Raised when a version string does not name one of the versions this
/// registry ships data for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedVersion(pub String);

impl fmt::Display for UnsupportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported HL7 version: {}", self.0)
    }
}

impl std::error::Error for UnsupportedVersion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_version() {
        for v in Version::all() {
            assert_eq!(Version::from_str(v.as_str()).unwrap(), *v);
        }
    }

    #[test]
    fn rejects_unknown_version() {
        assert!(Version::from_str("9.9").is_err());
    }

    #[test]
    fn orders_by_release() {
        assert!(Version::V2_2 < Version::V2_6);
        assert!(Version::V2_5 < Version::V2_5_1);
    }
}
