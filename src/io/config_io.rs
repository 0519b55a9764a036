use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::StreamConfig;
use crate::ops::layout::StreamLayout;

/// Error type for config file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Keys accepted by `tstream config set`, besides `ui.colors.<slot>`
const SETTABLE_KEYS: &[&str] = &[
    "stream.tag",
    "stream.timestamp_format",
    "stream.separator",
    "stream.lock_scope",
    "stream.recognition",
    "ui.show_key_hints",
    "ui.watch",
    "diagnostics.path",
];

const BOOL_KEYS: &[&str] = &["ui.show_key_hints", "ui.watch"];

/// Config file path, respecting XDG_CONFIG_HOME
pub fn default_config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("thought-stream").join("config.toml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// `--config` if given, else the default location
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path)
}

/// Read the config, returning both the parsed config and the raw toml_edit
/// document for round-trip-safe editing. A missing file yields defaults.
pub fn read_config(path: &Path) -> Result<(StreamConfig, toml_edit::DocumentMut), ConfigError> {
    if !path.exists() {
        return Ok((StreamConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: StreamConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// The `[stream]` settings must form a usable layout.
fn validate_config(config: &StreamConfig) -> Result<(), ConfigError> {
    StreamLayout::from_settings(&config.stream).map_err(|e| ConfigError::InvalidValue {
        key: "stream".to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }
    fs::write(path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Set `section.key` (or `ui.colors.<slot>`) in the document.
///
/// The edited document is re-parsed as a whole, so a value that would make
/// the config unloadable is rejected and the document is left unchanged.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let path: Vec<&str> = key.split('.').collect();
    let is_color = path.len() == 3 && path[0] == "ui" && path[1] == "colors";
    if !is_color && !SETTABLE_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let item = if BOOL_KEYS.contains(&key) {
        let flag = value.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected true or false, got '{}'", value),
        })?;
        toml_edit::value(flag)
    } else {
        toml_edit::value(value)
    };

    let mut edited = doc.clone();
    let mut table = edited.as_table_mut();
    for section in &path[..path.len() - 1] {
        if !table.contains_key(section) {
            let mut new_table = toml_edit::Table::new();
            new_table.set_implicit(path.len() == 3 && *section == "ui");
            table.insert(section, toml_edit::Item::Table(new_table));
        }
        table = table[*section]
            .as_table_mut()
            .ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{}' is not a table", section),
            })?;
    }
    table[path[path.len() - 1]] = item;

    let config: StreamConfig =
        toml::from_str(&edited.to_string()).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.message().to_string(),
        })?;
    validate_config(&config).map_err(|e| match e {
        ConfigError::InvalidValue { message, .. } => ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        },
        other => other,
    })?;

    *doc = edited;
    Ok(())
}
