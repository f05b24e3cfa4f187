use quill_render::PresentationResources;
use quill_storage::StorageKeys;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "quill.config.json";

/// Session configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Quiet period before the preview recompiles
    #[serde(default = "default_render_debounce_ms")]
    pub render_debounce_ms: u64,

    /// Quiet period before an edit is auto-saved
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// Record names used on the storage medium
    #[serde(default)]
    pub storage_keys: StorageKeys,

    /// What to open when no previous document can be restored
    #[serde(default)]
    pub startup: StartupPolicy,

    /// Stylesheets attached to every rendered preview
    #[serde(default)]
    pub resources: PresentationResources,
}

fn default_render_debounce_ms() -> u64 {
    450
}

fn default_autosave_debounce_ms() -> u64 {
    1000
}

/// Startup behavior when the last-open document cannot be restored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartupPolicy {
    /// Stay empty until the user opens or creates a document
    #[default]
    RestoreOrEmpty,

    /// Open the first document, creating one from a template if there are none
    RestoreOrCreate {
        name: String,
        #[serde(default)]
        folder: String,
        #[serde(default)]
        template: String,
    },
}

impl SessionConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            render_debounce_ms: default_render_debounce_ms(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
            storage_keys: StorageKeys::default(),
            startup: StartupPolicy::default(),
            resources: PresentationResources::default(),
        }
    }
}
