use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::version::VersionIdentifier;

/// How the next build version is derived from the last one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionPromotion {
    /// Bump the revision (ship a patch on the current release line).
    Revision,
    /// Bump the minor version and reset the revision.
    Minor,
    /// Bump the major version and reset minor and revision.
    Major,
    /// Use an explicit version.
    Custom(VersionIdentifier),
}

impl VersionPromotion {
    /// Apply the promotion to the last built version.
    ///
    /// `is_first_build` must be `true` when no build directory exists yet for
    /// the `0.0.0` release: promoting the revision of the sentinel version
    /// then keeps `0.0.0`, so the very first build is a base package and not
    /// an orphan patch 1 with nothing to diff against.
    pub fn apply(
        &self,
        last: VersionIdentifier,
        is_first_build: bool,
    ) -> Result<VersionIdentifier, TypeError> {
        match self {
            Self::Revision if last.is_init() && is_first_build => Ok(last),
            Self::Revision => Ok(last.next_revision()),
            Self::Minor => last.next_minor(),
            Self::Major => last.next_major(),
            Self::Custom(version) => Ok(*version),
        }
    }
}

impl FromStr for VersionPromotion {
    type Err = TypeError;

    /// Accepts `revision`/`patch`, `minor`, `major`, or an explicit `M.N.R`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revision" | "patch" => Ok(Self::Revision),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            other if other.contains('.') => VersionIdentifier::parse(other).map(Self::Custom),
            other => Err(TypeError::UnknownPromotion(other.to_string())),
        }
    }
}

impl fmt::Display for VersionPromotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revision => f.write_str("revision"),
            Self::Minor => f.write_str("minor"),
            Self::Major => f.write_str("major"),
            Self::Custom(version) => write!(f, "{version}"),
        }
    }
}
