use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Largest value (exclusive) allowed for the major and minor components.
///
/// The release-line code reserves two decimal digits for each of them.
pub const COMPONENT_LIMIT: u16 = 100;

/// A three-part `major.minor.revision` release version.
///
/// `major` and `minor` identify a release line; `revision` is the dense patch
/// counter within that line, where revision 0 is the full base package.
///
/// Ordering: `major` → `minor` → `revision` (total order).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionIdentifier {
    major: u16,
    minor: u16,
    revision: u16,
}

impl VersionIdentifier {
    /// The sentinel version `0.0.0` used before any build exists.
    pub const INIT: Self = Self {
        major: 0,
        minor: 0,
        revision: 0,
    };

    /// Create a version, validating the two-digit constraint.
    pub fn new(major: u16, minor: u16, revision: u16) -> Result<Self, TypeError> {
        check_constraint(u32::from(major), u32::from(minor))?;
        Ok(Self {
            major,
            minor,
            revision,
        })
    }

    /// Parse a `"M.N.R"` string.
    ///
    /// Missing or non-numeric components default to 0. Fails when the major
    /// or minor component is 100 or larger, or when the revision does not fit
    /// in 16 bits.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let mut parts = s.trim().split('.');
        let major = parse_component(parts.next());
        let minor = parse_component(parts.next());
        let revision = parse_component(parts.next());
        check_constraint(major, minor)?;
        let revision =
            u16::try_from(revision).map_err(|_| TypeError::RevisionRange(s.trim().to_string()))?;
        Ok(Self {
            major: major as u16,
            minor: minor as u16,
            revision,
        })
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn revision(&self) -> u16 {
        self.revision
    }

    /// Returns `true` if this is the sentinel `0.0.0` version.
    pub fn is_init(&self) -> bool {
        *self == Self::INIT
    }

    /// Returns `true` if both versions belong to the same release line
    /// (same major and minor, revision ignored).
    pub fn same_release_line(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    /// The base package of this release line (`M.N.0`).
    pub fn base(&self) -> Self {
        Self {
            revision: 0,
            ..*self
        }
    }

    /// Release-line directory name, `"M.N"`.
    pub fn release_line(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// Numeric release-line code, `major * 100 + minor`.
    pub fn version_code(&self) -> u32 {
        u32::from(self.major) * u32::from(COMPONENT_LIMIT) + u32::from(self.minor)
    }

    /// The same release line with the revision incremented.
    pub fn next_revision(&self) -> Self {
        Self {
            revision: self.revision.saturating_add(1),
            ..*self
        }
    }

    /// The next minor version with the revision reset.
    pub fn next_minor(&self) -> Result<Self, TypeError> {
        Self::new(self.major, self.minor + 1, 0)
    }

    /// The next major version with minor and revision reset.
    pub fn next_major(&self) -> Result<Self, TypeError> {
        Self::new(self.major + 1, 0, 0)
    }

    /// The preceding revision in this release line, saturating at 0.
    pub fn previous_revision(&self) -> Self {
        Self {
            revision: self.revision.saturating_sub(1),
            ..*self
        }
    }

    /// Replace the revision component.
    pub fn with_revision(&self, revision: u16) -> Self {
        Self { revision, ..*self }
    }
}

/// Numeric value of one component. Values too large for `u32` saturate so
/// that range checks still reject them.
fn parse_component(part: Option<&str>) -> u32 {
    match part.map(|p| p.trim().parse::<u32>()) {
        Some(Ok(value)) => value,
        Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
        _ => 0,
    }
}

fn check_constraint(major: u32, minor: u32) -> Result<(), TypeError> {
    let limit = u32::from(COMPONENT_LIMIT);
    if major < limit && minor < limit {
        Ok(())
    } else {
        Err(TypeError::VersionConstraint { major, minor })
    }
}

impl FromStr for VersionIdentifier {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionIdentifier({self})")
    }
}

impl fmt::Display for VersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl Serialize for VersionIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(major: u16, minor: u16, revision: u16) -> VersionIdentifier {
        VersionIdentifier::new(major, minor, revision).unwrap()
    }

    #[test]
    fn parse_full() {
        assert_eq!(VersionIdentifier::parse("1.2.3").unwrap(), v(1, 2, 3));
    }

    #[test]
    fn parse_missing_components_default_to_zero() {
        assert_eq!(VersionIdentifier::parse("4").unwrap(), v(4, 0, 0));
        assert_eq!(VersionIdentifier::parse("4.7").unwrap(), v(4, 7, 0));
        assert_eq!(VersionIdentifier::parse("").unwrap(), VersionIdentifier::INIT);
    }

    #[test]
    fn parse_garbage_component_defaults_to_zero() {
        assert_eq!(VersionIdentifier::parse("1.x.5").unwrap(), v(1, 0, 5));
    }

    #[test]
    fn parse_rejects_major_over_99() {
        let err = VersionIdentifier::parse("100.0.0").unwrap_err();
        assert_eq!(err, TypeError::VersionConstraint { major: 100, minor: 0 });
    }

    #[test]
    fn parse_rejects_minor_over_99() {
        assert!(VersionIdentifier::parse("1.100.0").is_err());
    }

    #[test]
    fn revision_is_unbounded_by_constraint() {
        assert_eq!(VersionIdentifier::parse("1.0.500").unwrap().revision(), 500);
    }

    #[test]
    fn parse_rejects_revision_beyond_u16() {
        assert_eq!(
            VersionIdentifier::parse("1.0.70000").unwrap_err(),
            TypeError::RevisionRange("1.0.70000".to_string())
        );
        assert!(VersionIdentifier::parse("1.0.99999999999").is_err());
        assert_eq!(VersionIdentifier::parse("1.0.65535").unwrap().revision(), u16::MAX);
    }

    #[test]
    fn parse_overflowing_major_violates_constraint() {
        assert!(matches!(
            VersionIdentifier::parse("99999999999.0.0"),
            Err(TypeError::VersionConstraint { .. })
        ));
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert!(VersionIdentifier::new(99, 99, 0).is_ok());
        assert!(VersionIdentifier::new(99, 100, 0).is_err());
    }

    #[test]
    fn display_is_plain() {
        assert_eq!(v(1, 2, 3).to_string(), "1.2.3");
        assert_eq!(v(0, 0, 0).to_string(), "0.0.0");
    }

    #[test]
    fn ordering_major_first() {
        assert!(v(1, 9, 9) < v(2, 0, 0));
        assert!(v(1, 1, 9) < v(1, 2, 0));
        assert!(v(1, 1, 1) < v(1, 1, 2));
    }

    #[test]
    fn same_release_line_ignores_revision() {
        assert!(v(1, 2, 0).same_release_line(&v(1, 2, 7)));
        assert!(!v(1, 2, 0).same_release_line(&v(1, 3, 0)));
    }

    #[test]
    fn promotions_reset_lower_fields() {
        let base = v(3, 4, 5);
        assert_eq!(base.next_revision(), v(3, 4, 6));
        assert_eq!(base.next_minor().unwrap(), v(3, 5, 0));
        assert_eq!(base.next_major().unwrap(), v(4, 0, 0));
    }

    #[test]
    fn next_minor_respects_constraint() {
        assert!(v(1, 99, 0).next_minor().is_err());
        assert!(v(99, 0, 0).next_major().is_err());
    }

    #[test]
    fn version_code_and_release_line() {
        let version = v(2, 5, 1);
        assert_eq!(version.version_code(), 205);
        assert_eq!(version.release_line(), "2.5");
        assert_eq!(version.base(), v(2, 5, 0));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&v(1, 0, 2)).unwrap();
        assert_eq!(json, "\"1.0.2\"");
        let parsed: VersionIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, v(1, 0, 2));
    }

    #[test]
    fn serde_rejects_out_of_range() {
        let result: Result<VersionIdentifier, _> = serde_json::from_str("\"120.0.0\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(major in 0u16..100, minor in 0u16..100, revision: u16) {
            let version = v(major, minor, revision);
            prop_assert_eq!(VersionIdentifier::parse(&version.to_string()).unwrap(), version);
        }

        #[test]
        fn ordering_is_consistent_with_release_line(
            a in (0u16..100, 0u16..100, 0u16..50),
            b in (0u16..100, 0u16..100, 0u16..50),
        ) {
            let x = v(a.0, a.1, a.2);
            let y = v(b.0, b.1, b.2);
            if x.same_release_line(&y) {
                prop_assert_eq!(x.cmp(&y), x.revision().cmp(&y.revision()));
            }
            prop_assert_eq!(x == y, x.cmp(&y) == std::cmp::Ordering::Equal);
        }
    }
}
