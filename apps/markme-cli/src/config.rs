//! Optional TOML configuration for the `mark` binary
//!
//! ```toml
//! default_color = "#ffff00"
//! output_suffix = "_marked"
//! optimize = true
//! opacity = 0.6
//! author = "reviewer"
//! ```

use anyhow::Context;
use markme_core::{normalize_hex, ApplyOptions, DEFAULT_HEX};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "MARKME_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color for terms without an explicit `-c`
    pub default_color: String,
    /// Appended to the input file stem when no `-o` is given
    pub output_suffix: String,
    pub optimize: bool,
    pub opacity: Option<f32>,
    pub author: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_HEX.to_string(),
            output_suffix: "_marked".to_string(),
            optimize: true,
            opacity: None,
            author: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.default_color = normalize_hex(&config.default_color);
        if let Some(opacity) = config.opacity {
            anyhow::ensure!(
                (0.0..=1.0).contains(&opacity),
                "opacity must be between 0 and 1, got {}",
                opacity
            );
        }
        Ok(config)
    }

    /// Resolve the config: explicit path, then `MARKME_CONFIG`, then defaults
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_from(explicit, std::env::var_os(CONFIG_ENV))
    }

    fn load_from(explicit: Option<&Path>, env: Option<OsString>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            optimize: self.optimize,
            opacity: self.opacity,
            author: self.author.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Config::from_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_str(
            r#"
            default_color = "00ff00"
            opacity = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.default_color, "#00ff00");
        assert_eq!(config.opacity, Some(0.5));
        assert_eq!(config.output_suffix, "_marked");
        assert!(config.optimize);
    }

    #[test]
    fn test_invalid_opacity() {
        assert!(Config::from_str("opacity = 2.0").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(Config::from_str("default_color = ").is_err());
    }

    #[test]
    fn test_load_order() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit.toml");
        let from_env = dir.path().join("env.toml");
        fs::write(&explicit, "output_suffix = \"_a\"").unwrap();
        fs::write(&from_env, "output_suffix = \"_b\"").unwrap();

        let config = Config::load_from(Some(&explicit), Some(from_env.clone().into())).unwrap();
        assert_eq!(config.output_suffix, "_a");

        let config = Config::load_from(None, Some(from_env.into())).unwrap();
        assert_eq!(config.output_suffix, "_b");

        let config = Config::load_from(None, Some(OsString::new())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = Config::load_from(Some(Path::new("/nonexistent/mark.toml")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_apply_options() {
        let config = Config {
            optimize: false,
            author: Some("me".into()),
            ..Config::default()
        };
        let options = config.apply_options();
        assert!(!options.optimize);
        assert_eq!(options.author.as_deref(), Some("me"));
    }
}
