//! `fusion.toml` handling.
use fusion_tracing::println_yellow_err;
use fusion_types::constants::{CONFIG_FILE_NAME, DEFAULT_FILE_EXTENSION};
use serde::{Deserialize, Serialize};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {err}", .path.display())]
    ReadConfig { path: PathBuf, err: io::Error },
    #[error("failed to deserialize config: {err}")]
    Deserialize { err: toml::de::Error },
    #[error("failed to find a `fusion.toml` in the directory or any of its parents")]
    NotFound,
}

/// A finalized build config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Suffix matched by glob includes that do not name one, e.g. `.fusion`.
    pub default_extension: String,
    /// Whether the top-level parse links prototypes into `__prototypeChain`s.
    pub build_hierarchy: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_extension: format!(".{DEFAULT_FILE_EXTENSION}"),
            build_hierarchy: true,
        }
    }
}

/// A direct mapping to an optional `fusion.toml`.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ConfigOptions {
    pub include: Option<IncludeOptions>,
    pub prototypes: Option<PrototypesOptions>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "snake_case")]
pub struct IncludeOptions {
    pub default_extension: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub struct PrototypesOptions {
    pub build_hierarchy: Option<bool>,
}

impl BuildConfig {
    pub fn from_opts(opts: ConfigOptions) -> Self {
        let default = Self::default();
        let default_extension = opts
            .include
            .and_then(|include| include.default_extension)
            .map(|ext| match ext.starts_with('.') {
                true => ext,
                false => format!(".{ext}"),
            })
            .unwrap_or(default.default_extension);
        let build_hierarchy = opts
            .prototypes
            .and_then(|prototypes| prototypes.build_hierarchy)
            .unwrap_or(default.build_hierarchy);
        Self {
            default_extension,
            build_hierarchy,
        }
    }

    /// Looks for a `fusion.toml` in `dir` or its parents and finalizes it.
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_opts = ConfigOptions::from_dir(dir)?;
        Ok(Self::from_opts(config_opts))
    }

    /// Like `from_dir`, but falls back to the defaults when there is no config file.
    pub fn from_dir_or_default(dir: &Path) -> Result<Self, ConfigError> {
        match Self::from_dir(dir) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}

impl ConfigOptions {
    /// Reads the given `fusion.toml`. Unknown keys are reported and skipped.
    pub fn from_file(config_path: PathBuf) -> Result<Self, ConfigError> {
        let config_str =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadConfig {
                path: config_path,
                err: e,
            })?;
        Self::from_toml_str(&config_str)
    }

    fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let toml_de = toml::de::Deserializer::new(config_str);
        serde_ignored::deserialize(toml_de, |field| {
            let warning = format!("  WARNING! found unusable configuration: {field}");
            println_yellow_err(&warning);
        })
        .map_err(|e| ConfigError::Deserialize { err: e })
    }

    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config_dir =
            find_parent_dir_with_file(dir, CONFIG_FILE_NAME).ok_or(ConfigError::NotFound)?;
        Self::from_file(config_dir.join(CONFIG_FILE_NAME))
    }
}

/// Walks up from `starter_path` until a directory containing `file_name` is found.
pub fn find_parent_dir_with_file<P: AsRef<Path>>(
    starter_path: P,
    file_name: &str,
) -> Option<PathBuf> {
    let mut path = std::fs::canonicalize(starter_path).ok()?;
    loop {
        path.push(file_name);
        if path.exists() {
            path.pop();
            return Some(path);
        }
        path.pop();
        if !path.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;

    #[test]
    fn defaults() {
        let config = BuildConfig::from_opts(ConfigOptions::default());
        assert_eq!(config.default_extension, ".fusion");
        assert!(config.build_hierarchy);
    }

    #[test]
    fn options_override_defaults() {
        let opts = ConfigOptions::from_toml_str(
            "[include]\ndefault_extension = \"ts2\"\n\n[prototypes]\nbuild_hierarchy = false\n",
        )
        .unwrap();
        let config = BuildConfig::from_opts(opts);
        assert_eq!(config.default_extension, ".ts2");
        assert!(!config.build_hierarchy);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let opts = ConfigOptions::from_toml_str("[include]\nfollow_symlinks = true\n").unwrap();
        assert_matches!(opts.include, Some(IncludeOptions { default_extension: None }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert_matches!(
            ConfigOptions::from_toml_str("[prototypes]\nbuild_hierarchy = \"yes\"\n"),
            Err(ConfigError::Deserialize { .. })
        );
    }

    #[test]
    fn found_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Resources/Private/Fusion");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[prototypes]\nbuild_hierarchy = false\n",
        )
        .unwrap();

        let config = BuildConfig::from_dir(&nested).unwrap();
        assert!(!config.build_hierarchy);
        assert_eq!(
            find_parent_dir_with_file(&nested, CONFIG_FILE_NAME),
            Some(fs::canonicalize(dir.path()).unwrap())
        );
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            BuildConfig::from_dir_or_default(dir.path()).unwrap(),
            BuildConfig::default()
        );
    }
}
