use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vpatch_types::BuildTarget;

use crate::error::{BuildError, BuildResult};

/// Default name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "vpatch.toml";

fn default_output_root() -> PathBuf {
    PathBuf::from("BuildTool/Output")
}

fn default_content_root() -> PathBuf {
    PathBuf::from("StreamingAssets")
}

/// Inputs and output location of a patch build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root of the versioned output tree; each target gets its own subtree.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Built content to snapshot and package.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    /// Raw asset records produced by the asset-tagging step, copied into
    /// each build's snapshot and checked for path conflicts.
    #[serde(default)]
    pub raw_records: Option<PathBuf>,
    /// Target used when none is given on the command line.
    #[serde(default)]
    pub target: Option<BuildTarget>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            content_root: default_content_root(),
            raw_records: None,
            target: None,
        }
    }
}

impl BuildConfig {
    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn parse(text: &str, source: &Path) -> BuildResult<Self> {
        toml::from_str(text).map_err(|e| BuildError::Config {
            path: source.to_path_buf(),
            source: e,
        })
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> BuildResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let config = Self::parse(&text, path)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> BuildResult<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = BuildConfig::parse("", Path::new("vpatch.toml")).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn full_file() {
        let text = r#"
output_root = "/srv/out"
content_root = "/srv/content"
raw_records = "/srv/rawFileRecords.txt"
target = "Android"
"#;
        let config = BuildConfig::parse(text, Path::new("vpatch.toml")).unwrap();
        assert_eq!(config.output_root, PathBuf::from("/srv/out"));
        assert_eq!(config.content_root, PathBuf::from("/srv/content"));
        assert_eq!(config.raw_records, Some(PathBuf::from("/srv/rawFileRecords.txt")));
        assert_eq!(config.target.unwrap().as_str(), "Android");
    }

    #[test]
    fn bad_target_is_config_error() {
        let err = BuildConfig::parse("target = \"a/b\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "output_root = \"out\"\n").unwrap();
        assert_eq!(BuildConfig::load(&path).unwrap().output_root, PathBuf::from("out"));
    }
}
