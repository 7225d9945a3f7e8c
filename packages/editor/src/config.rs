use docsync_codec::Indentation;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREVIEW_LIMIT: usize = 10_000;

/// Sync controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Preview length (in characters) at which output gets truncated
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Format used when no preference is stored
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Indentation used when no preference is stored
    #[serde(default)]
    pub default_indentation: Indentation,
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}

fn default_format() -> String {
    "json".to_string()
}

impl SyncConfig {
    /// Text appended to a truncated preview
    pub fn truncation_notice(&self) -> String {
        format!(
            "\n\nOutput is too large to display (+{} chars)\nExport to view complete output\n\n",
            self.preview_limit
        )
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            preview_limit: default_preview_limit(),
            default_format: default_format(),
            default_indentation: Indentation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "previewLimit": 500,
            "defaultFormat": "yaml",
            "defaultIndentation": "tabs"
        }"#;

        let config: SyncConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.preview_limit, 500);
        assert_eq!(config.default_format, "yaml");
        assert_eq!(config.default_indentation, Indentation::Tabs);
    }

    #[test]
    fn test_default_config() {
        let config: SyncConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.preview_limit, 10_000);
        assert_eq!(config.default_indentation, Indentation::TwoSpaces);
    }

    #[test]
    fn test_truncation_notice_mentions_limit() {
        let notice = SyncConfig::default().truncation_notice();
        assert_eq!(
            notice,
            "\n\nOutput is too large to display (+10000 chars)\nExport to view complete output\n\n"
        );
    }
}
