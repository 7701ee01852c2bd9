//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treenorm/treenorm.toml`
//! 3. Local config: an explicit file passed by the caller
//! 4. Environment variables: `TREENORM__*` prefix

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{FeatureProfile, FeatureTable};

/// Raw profile for intermediate parsing (flags are Option to detect "not specified").
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct RawProfile {
    pub complex: Option<bool>,
    pub array: Option<bool>,
}

impl RawProfile {
    /// Overlay onto `base`; a profile new to the table defaults to no native support.
    fn apply_to(&self, base: Option<FeatureProfile>) -> FeatureProfile {
        let base = base.unwrap_or(FeatureProfile::new(false, false));
        FeatureProfile {
            supports_complex: self.complex.unwrap_or(base.supports_complex),
            supports_array: self.array.unwrap_or(base.supports_array),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub profiles: BTreeMap<String, RawProfile>,
    pub extensions: BTreeMap<String, String>,
}

/// Unified configuration for treenorm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Feature profile per backend id
    pub profiles: BTreeMap<String, FeatureProfile>,
    /// File extension (no dot) to backend id
    pub extensions: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        let extensions = [
            ("h5", "hdf5"),
            ("hdf5", "hdf5"),
            ("hdf", "hdf5"),
            ("json", "json"),
            ("yaml", "yaml"),
            ("yml", "yaml"),
            ("pkl", "pickle"),
            ("pickle", "pickle"),
            ("ini", "ini"),
            ("mat", "mat"),
        ]
        .into_iter()
        .map(|(ext, id)| (ext.to_string(), id.to_string()))
        .collect();

        Self {
            profiles: FeatureTable::default().as_map().clone(),
            extensions,
        }
    }
}

/// Get the XDG config directory for treenorm.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treenorm").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treenorm.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// The profile table the pipeline dispatches on.
    pub fn feature_table(&self) -> FeatureTable {
        FeatureTable::new(self.profiles.clone())
    }

    /// Merge overlay config onto self (base), key by key.
    ///
    /// A profile entry may set a single flag; the other keeps its base value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut merged = self.clone();
        for (id, raw) in &overlay.profiles {
            let profile = raw.apply_to(self.profiles.get(id).copied());
            merged.profiles.insert(id.clone(), profile);
        }
        for (ext, id) in &overlay.extensions {
            merged
                .extensions
                .insert(ext.trim_start_matches('.').to_ascii_lowercase(), id.clone());
        }
        merged
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_path` - Optional config file layered above the global config
    pub fn load(local_path: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_path)
    }

    /// Load settings from explicit global and local files (either may be absent).
    pub fn load_from(
        global_path: Option<&Path>,
        local_path: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global) = global_path.filter(|p| p.exists()) {
            debug!("load: global config {}", global.display());
            current = current.merge_with(&load_raw_settings(global)?);
        }

        // an explicitly requested local file must exist
        if let Some(local) = local_path {
            debug!("load: local config {}", local.display());
            current = current.merge_with(&load_raw_settings(local)?);
        }

        current = Self::apply_env_overrides(current, Self::env_source())?;
        current.validate()?;
        Ok(current)
    }

    /// Apply TREENORM__* environment variables as explicit overrides.
    ///
    /// `TREENORM__PROFILES__JSON__COMPLEX=true` sets one flag of one profile,
    /// `TREENORM__EXTENSIONS__JSONL=json` maps an extension.
    /// A value that does not parse fails the whole load.
    fn apply_env_overrides(settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        let overlay = RawSettings {
            profiles: overlay_section(&config, "profiles")?,
            extensions: overlay_section(&config, "extensions")?,
        };
        Ok(settings.merge_with(&overlay))
    }

    fn env_source() -> Environment {
        Environment::with_prefix("TREENORM").separator("__")
    }

    /// Every extension must point at a backend with a profile.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        for (ext, id) in &self.extensions {
            if !self.profiles.contains_key(id) {
                return Err(ApplicationError::Config {
                    message: format!("extension '{ext}' maps to backend '{id}' without a feature profile"),
                });
            }
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treenorm configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treenorm/treenorm.toml
#   Local:  file passed to Settings::load
#   Env:    TREENORM__PROFILES__<ID>__COMPLEX=true, TREENORM__EXTENSIONS__<EXT>=<id>
#
# Profile flags not given keep their inherited value.

# Native capabilities per backend
# [profiles.hdf5]
# complex = false
# array = true

# [profiles.netcdf]
# complex = false
# array = true

# File extension to backend
# [extensions]
# nc = "netcdf"
"#
        .to_string()
    }
}

/// An absent section is empty; anything else that fails to deserialize is an error.
fn overlay_section<T: DeserializeOwned + Default>(
    config: &Config,
    key: &str,
) -> Result<T, ApplicationError> {
    match config.get(key) {
        Ok(section) => Ok(section),
        Err(ConfigError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_validating_then_ok() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn given_partial_profile_overlay_when_merging_then_other_flag_kept() {
        let overlay = RawSettings {
            profiles: BTreeMap::from([(
                "hdf5".to_string(),
                RawProfile {
                    complex: Some(true),
                    array: None,
                },
            )]),
            extensions: BTreeMap::new(),
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.profiles["hdf5"], FeatureProfile::new(true, true));
        assert_eq!(merged.profiles["json"], FeatureProfile::new(false, false));
    }

    #[test]
    fn given_new_profile_without_flags_when_merging_then_no_native_support() {
        let overlay = RawSettings {
            profiles: BTreeMap::from([("netcdf".to_string(), RawProfile::default())]),
            extensions: BTreeMap::from([(".NC".to_string(), "netcdf".to_string())]),
        };

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.profiles["netcdf"], FeatureProfile::new(false, false));
        assert_eq!(merged.extensions["nc"], "netcdf");
    }

    #[test]
    fn given_extension_without_profile_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.extensions.insert("csv".into(), "csv".into());
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_settings_when_serializing_then_template_shape() {
        let text = Settings::default().to_toml().unwrap();
        assert!(text.contains("[profiles.hdf5]"));
        assert!(text.contains("complex = false"));
        assert!(text.contains("[extensions]"));
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.profiles.is_empty());
    }

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::env_source().source(Some(source))
    }

    #[test]
    fn given_env_flag_when_applying_overrides_then_profile_updated() {
        let env = env_with(&[
            ("TREENORM__PROFILES__NEWFMT__ARRAY", "true"),
            ("TREENORM__EXTENSIONS__NF", "newfmt"),
        ]);

        let settings = Settings::apply_env_overrides(Settings::default(), env).unwrap();

        assert_eq!(settings.profiles["newfmt"], FeatureProfile::new(false, true));
        assert_eq!(settings.extensions["nf"], "newfmt");
    }

    #[test]
    fn given_unparseable_env_flag_when_applying_overrides_then_config_error() {
        let env = env_with(&[
            ("TREENORM__PROFILES__NEWFMT__ARRAY", "true"),
            ("TREENORM__PROFILES__JSON__COMPLEX", "maybe"),
        ]);

        let err = Settings::apply_env_overrides(Settings::default(), env).unwrap_err();

        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_no_env_vars_when_applying_overrides_then_unchanged() {
        let settings = Settings::apply_env_overrides(Settings::default(), env_with(&[])).unwrap();
        assert_eq!(settings.profiles, Settings::default().profiles);
        assert_eq!(settings.extensions, Settings::default().extensions);
    }
}
