//! Embedder configuration.
//!
//! Read once from the JSON file named by `VTK_EMBEDDER_CONFIG`; any missing
//! field keeps its default, and no file at all means all defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_LOG_FILTER};
use crate::toolkit::bridge_loader::{default_library_name, resolve_library_path};
use crate::toolkit::{InteractionStyle, SceneSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Directory holding the toolkit bridge; defaults to the executable's directory.
    pub toolkit_library_dir: Option<PathBuf>,
    /// Bridge file name; defaults to the platform name for `vtk_bridge`.
    pub toolkit_library_name: Option<String>,
    pub interaction_style: InteractionStyle,
    pub scene: SceneSpec,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            toolkit_library_dir: None,
            toolkit_library_name: None,
            interaction_style: InteractionStyle::default(),
            scene: SceneSpec::default(),
        }
    }
}

impl EmbedderConfig {
    /// Loads the file named by `VTK_EMBEDDER_CONFIG`, or defaults when unset.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse embedder config JSON")
    }

    /// Full path of the toolkit bridge library.
    pub fn toolkit_library_path(&self) -> Result<PathBuf> {
        let name = self
            .toolkit_library_name
            .clone()
            .unwrap_or_else(default_library_name);
        resolve_library_path(self.toolkit_library_dir.as_deref(), &name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        assert_eq!(EmbedderConfig::from_json("{}").unwrap(), EmbedderConfig::default());
    }

    #[test]
    fn overrides_apply() {
        let config = EmbedderConfig::from_json(
            r#"{
                "log_filter": "debug",
                "toolkit_library_dir": "/opt/vtk/lib",
                "toolkit_library_name": "libvtk_bridge_custom.so",
                "interaction_style": "JoystickCamera",
                "scene": { "renderer": { "reset_camera": false } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.interaction_style, InteractionStyle::JoystickCamera);
        assert!(!config.scene.renderer.reset_camera);
        assert!(config.scene.renderer.automatic_light_creation);
        assert_eq!(config.scene.actors.len(), 1);
        assert_eq!(
            config.toolkit_library_path().unwrap(),
            PathBuf::from("/opt/vtk/lib/libvtk_bridge_custom.so")
        );
    }

    #[test]
    fn bad_json_is_an_error() {
        let err = EmbedderConfig::from_json("{ not json").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse embedder config JSON"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = EmbedderConfig::from_file(Path::new("/nonexistent/embedder.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/embedder.json"));
    }
}
