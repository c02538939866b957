use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Platform identifier a build is produced for (e.g. `Android`, `iOS`).
///
/// Used verbatim as a directory component of the output layout, so it must be
/// non-empty and free of path separators.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildTarget(String);

impl BuildTarget {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(TypeError::InvalidTarget(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BuildTarget {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BuildTarget {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BuildTarget> for String {
    fn from(target: BuildTarget) -> Self {
        target.0
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_platform_names() {
        assert_eq!(BuildTarget::new("Android").unwrap().as_str(), "Android");
        assert_eq!(BuildTarget::new(" iOS ").unwrap().as_str(), "iOS");
    }

    #[test]
    fn rejects_path_like_names() {
        for bad in ["", "  ", ".", "..", "a/b", "a\\b"] {
            assert!(BuildTarget::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn serde_as_plain_string() {
        let target = BuildTarget::new("Win").unwrap();
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, "\"Win\"");
        let parsed: BuildTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, target);
        assert!(serde_json::from_str::<BuildTarget>("\"../x\"").is_err());
    }
}
