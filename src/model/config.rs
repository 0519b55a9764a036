use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default timestamp format: `YYYY-MM-DD HH:MM:SS`, 19 characters
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default separator between timestamp and content: three spaces
pub const DEFAULT_SEPARATOR: &str = "   ";

/// Default activation tag
pub const DEFAULT_TAG: &str = "stream";

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// How much of a committed line is locked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockScope {
    /// The whole committed line is read-only
    #[default]
    Line,
    /// Only the timestamp prefix is read-only
    Prefix,
}

/// Which separator-bearing lines count as committed entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recognition {
    /// Any line containing the separator
    #[default]
    Separator,
    /// Only lines whose text before the separator is a valid timestamp
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Tag that activates the stream on a note (leading `#` optional)
    #[serde(default = "default_tag")]
    pub tag: String,
    /// chrono format string; must render fixed-width
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub lock_scope: LockScope,
    #[serde(default)]
    pub recognition: Recognition,
}

impl Default for StreamSettings {
    fn default() -> Self {
        StreamSettings {
            tag: default_tag(),
            timestamp_format: default_timestamp_format(),
            separator: default_separator(),
            lock_scope: LockScope::default(),
            recognition: Recognition::default(),
        }
    }
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Color overrides keyed by theme slot (e.g. `timestamp = "#7D78BF"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Reload the document when it changes on disk
    #[serde(default = "default_true")]
    pub watch: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
            watch: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Override for the diagnostics log location
    #[serde(default)]
    pub path: Option<String>,
}
