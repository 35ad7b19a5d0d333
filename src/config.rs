//! Archive packaging configuration
//!
//! Hosts embed [`ArchiveConfig`] in their own TOML documents or build it from
//! the environment. Every field has a default, so an empty table is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const ENV_COMPRESSION: &str = "CLUSTERKIT_ARCHIVE_COMPRESSION";
const ENV_COMPRESSION_LEVEL: &str = "CLUSTERKIT_ARCHIVE_COMPRESSION_LEVEL";
const ENV_INCLUDE_HIDDEN: &str = "CLUSTERKIT_ARCHIVE_INCLUDE_HIDDEN";

/// Compression levels accepted with [`ArchiveCompression::Deflated`]
pub const DEFLATE_LEVELS: RangeInclusive<i64> = 1..=9;

/// How entry bytes are stored in the archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    /// No compression
    Stored,
    /// DEFLATE compression (default)
    #[default]
    Deflated,
}

impl ArchiveCompression {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "stored" | "none" => Some(Self::Stored),
            "deflated" | "deflate" => Some(Self::Deflated),
            _ => None,
        }
    }

    fn method(self) -> CompressionMethod {
        match self {
            Self::Stored => CompressionMethod::Stored,
            Self::Deflated => CompressionMethod::Deflated,
        }
    }
}

/// Options for packing directories and streams into zip archives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Compression method for file entries
    #[serde(default)]
    pub compression: ArchiveCompression,

    /// Compression level; `None` uses the method's default. Only valid with
    /// `Deflated`, within [`DEFLATE_LEVELS`].
    #[serde(default)]
    pub compression_level: Option<i64>,

    /// Pack entries whose name starts with `.`
    #[serde(default)]
    pub include_hidden: bool,
}

impl ArchiveConfig {
    /// Parse a TOML table such as `compression = "stored"`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::invalid_argument(format!("invalid archive config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the compression level fits the compression method
    pub fn validate(&self) -> Result<()> {
        match (self.compression, self.compression_level) {
            (ArchiveCompression::Stored, Some(level)) => Err(Error::invalid_argument(format!(
                "compression_level {} requires deflated compression",
                level
            ))),
            (ArchiveCompression::Deflated, Some(level)) if !DEFLATE_LEVELS.contains(&level) => {
                Err(Error::invalid_argument(format!(
                    "compression_level {} is outside {}..={}",
                    level,
                    DEFLATE_LEVELS.start(),
                    DEFLATE_LEVELS.end()
                )))
            }
            _ => Ok(()),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; unparseable values are logged and ignored.
    /// A level that does not fit the compression method is ignored the same way.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_COMPRESSION) {
            match ArchiveCompression::parse(&value) {
                Some(compression) => config.compression = compression,
                None => warn!("Ignoring unknown {}: {}", ENV_COMPRESSION, value),
            }
        }

        if let Some(value) = lookup(ENV_COMPRESSION_LEVEL) {
            match value.trim().parse::<i64>() {
                Ok(level) => config.compression_level = Some(level),
                Err(e) => warn!("Ignoring invalid {}: {}", ENV_COMPRESSION_LEVEL, e),
            }
        }

        if let Some(value) = lookup(ENV_INCLUDE_HIDDEN) {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.include_hidden = true,
                "0" | "false" | "no" => config.include_hidden = false,
                other => warn!("Ignoring invalid {}: {}", ENV_INCLUDE_HIDDEN, other),
            }
        }

        if let Err(e) = config.validate() {
            warn!("Ignoring {}: {}", ENV_COMPRESSION_LEVEL, e);
            config.compression_level = None;
        }

        config
    }

    pub(crate) fn file_options(&self) -> SimpleFileOptions {
        // Stored entries reject any level
        let level = match self.compression {
            ArchiveCompression::Stored => None,
            ArchiveCompression::Deflated => self.compression_level,
        };
        SimpleFileOptions::default()
            .compression_method(self.compression.method())
            .compression_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::env;

    #[test]
    fn test_archive_config_default() {
        let config = ArchiveConfig::default();

        assert_eq!(config.compression, ArchiveCompression::Deflated);
        assert_eq!(config.compression_level, None);
        assert!(!config.include_hidden);
    }

    #[test]
    fn test_compression_serialization() {
        let json = serde_json::to_string(&ArchiveCompression::Stored).unwrap();
        assert_eq!(json, r#""stored""#);

        let parsed: ArchiveCompression = serde_json::from_str(r#""deflated""#).unwrap();
        assert_eq!(parsed, ArchiveCompression::Deflated);
    }

    #[test]
    fn test_from_toml_str() {
        let config = ArchiveConfig::from_toml_str(
            r#"
compression = "stored"
include_hidden = true
"#,
        )
        .unwrap();

        assert_eq!(config.compression, ArchiveCompression::Stored);
        assert!(config.include_hidden);
        assert_eq!(config.compression_level, None);

        let empty = ArchiveConfig::from_toml_str("").unwrap();
        assert_eq!(empty, ArchiveConfig::default());
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_compression() {
        let err = ArchiveConfig::from_toml_str(r#"compression = "brotli""#).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_toml_str_rejects_level_with_stored() {
        let err = ArchiveConfig::from_toml_str(
            r#"
compression = "stored"
compression_level = 6
"#,
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_toml_str_checks_deflate_level_range() {
        for level in [0, 10, -1] {
            let err = ArchiveConfig::from_toml_str(&format!("compression_level = {level}"))
                .unwrap_err();
            assert!(err.is_invalid_argument(), "level {level} was accepted");
        }

        for level in [1, 6, 9] {
            let config =
                ArchiveConfig::from_toml_str(&format!("compression_level = {level}")).unwrap();
            assert_eq!(config.compression_level, Some(level));
        }
    }

    #[test]
    fn test_from_lookup_ignores_level_that_does_not_fit() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_COMPRESSION, "stored"),
            (ENV_COMPRESSION_LEVEL, "6"),
        ]);
        let config = ArchiveConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.compression, ArchiveCompression::Stored);
        assert_eq!(config.compression_level, None);

        let vars: HashMap<&str, &str> = HashMap::from([(ENV_COMPRESSION_LEVEL, "42")]);
        let config = ArchiveConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.compression, ArchiveCompression::Deflated);
        assert_eq!(config.compression_level, None);
    }

    #[test]
    fn test_file_options_drop_level_for_stored() {
        let config = ArchiveConfig {
            compression: ArchiveCompression::Stored,
            compression_level: Some(6),
            ..ArchiveConfig::default()
        };
        assert!(config.validate().is_err());

        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("f", config.file_options()).unwrap();
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_COMPRESSION, "Stored"),
            (ENV_COMPRESSION_LEVEL, "not-a-number"),
            (ENV_INCLUDE_HIDDEN, "yes"),
        ]);
        let config = ArchiveConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.compression, ArchiveCompression::Stored);
        assert_eq!(config.compression_level, None);
        assert!(config.include_hidden);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(ENV_COMPRESSION, "deflate");
        env::set_var(ENV_COMPRESSION_LEVEL, "9");
        env::remove_var(ENV_INCLUDE_HIDDEN);

        let config = ArchiveConfig::from_env();

        assert_eq!(config.compression, ArchiveCompression::Deflated);
        assert_eq!(config.compression_level, Some(9));
        assert!(!config.include_hidden);

        env::remove_var(ENV_COMPRESSION);
        env::remove_var(ENV_COMPRESSION_LEVEL);
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        env::remove_var(ENV_COMPRESSION);
        env::remove_var(ENV_COMPRESSION_LEVEL);
        env::remove_var(ENV_INCLUDE_HIDDEN);

        assert_eq!(ArchiveConfig::from_env(), ArchiveConfig::default());
    }
}
