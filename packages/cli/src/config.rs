use docsync_editor::{IdentitySchema, Schema, StripAnnotations, SyncConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::rc::Rc;

pub const DEFAULT_CONFIG_NAME: &str = "docsync.config.json";

/// Docsync configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Preview limit and output defaults
    #[serde(flatten)]
    pub sync: SyncConfig,

    /// Where format/indentation preferences are persisted
    #[serde(default = "default_prefs_file")]
    pub prefs_file: String,

    /// Directory downloads are saved into
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Map keys with this prefix are UI-only and dropped on export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_prefix: Option<String>,
}

fn default_prefs_file() -> String {
    ".docsync/prefs.json".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn prefs_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.prefs_file)
    }

    pub fn out_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.out_dir)
    }

    /// Export/import schema for this project
    pub fn schema(&self) -> Rc<dyn Schema> {
        match &self.annotation_prefix {
            Some(prefix) => Rc::new(StripAnnotations::new(prefix.clone())),
            None => Rc::new(IdentitySchema),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            prefs_file: default_prefs_file(),
            out_dir: default_out_dir(),
            annotation_prefix: None,
        }
    }
}
