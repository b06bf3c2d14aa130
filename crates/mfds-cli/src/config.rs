//! Run configuration: CLI flags over `MFDS_REGISTRY` over a TOML file over
//! built-in defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mfds_core::{DEFAULT_NAME_SEPARATOR, ReconcileOptions};
use mfds_normalization::Cleaner;
use serde::Deserialize;

/// Environment variable naming the registry CSV.
pub const REGISTRY_ENV_VAR: &str = "MFDS_REGISTRY";

/// Optional TOML configuration file.
///
/// ```toml
/// [registry]
/// path = "data/mfds.csv"
///
/// [cleaning]
/// artifact_tokens = ["P5V>>", ">>"]
///
/// [output]
/// name_separator = " / "
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub registry: RegistrySection,
    pub cleaning: CleaningSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleaningSection {
    /// Replaces the default artifact token list when set.
    pub artifact_tokens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub name_separator: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse config: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `path` when given, else the defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        let cleaner = match &self.cleaning.artifact_tokens {
            Some(tokens) => Cleaner::new(tokens),
            None => Cleaner::default(),
        };
        let separator = self
            .output
            .name_separator
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME_SEPARATOR.to_string());
        ReconcileOptions::new()
            .with_cleaner(cleaner)
            .with_name_separator(separator)
    }

    /// Registry path by precedence: flag, then environment, then file.
    pub fn registry_path(
        &self,
        flag: Option<&Path>,
        env_value: Option<OsString>,
    ) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| {
                env_value
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| self.registry.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let config = FileConfig::parse(
            r#"
            [registry]
            path = "mfds.csv"

            [cleaning]
            artifact_tokens = ["zz9>>"]

            [output]
            name_separator = " / "
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.path, Some(PathBuf::from("mfds.csv")));
        let options = config.reconcile_options();
        assert_eq!(options.cleaner.tokens(), &["ZZ9>>".to_string()]);
        assert_eq!(options.name_separator, " / ");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = FileConfig::parse("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.reconcile_options().name_separator, ", ");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[registry]\nfile = \"x.csv\"\n").is_err());
    }

    #[test]
    fn registry_path_precedence() {
        let config = FileConfig::parse("[registry]\npath = \"file.csv\"\n").unwrap();
        assert_eq!(
            config.registry_path(Some(Path::new("flag.csv")), Some("env.csv".into())),
            Some(PathBuf::from("flag.csv"))
        );
        assert_eq!(
            config.registry_path(None, Some("env.csv".into())),
            Some(PathBuf::from("env.csv"))
        );
        assert_eq!(
            config.registry_path(None, Some(OsString::new())),
            Some(PathBuf::from("file.csv"))
        );
        assert_eq!(FileConfig::default().registry_path(None, None), None);
    }
}
