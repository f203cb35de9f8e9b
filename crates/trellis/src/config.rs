//! File-based framework configuration.
//!
//! ```toml
//! options = ["confirmations"]
//! sweep_interval_ms = 60000
//!
//! [messages]
//! no_permission = "You can't do that."
//! ```

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::message::MessageTable;
use crate::options::OptionSet;
use crate::options::Settings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FrameworkConfig {
	pub options: OptionSet,
	pub messages: MessageTable,
	/// How often hosts should purge dead cooldown/confirmation entries.
	/// `None` leaves expiry purely lazy.
	pub sweep_interval_ms: Option<u64>,
}

impl FrameworkConfig {
	pub fn settings(&self) -> Settings {
		Settings {
			options: self.options.clone(),
			messages: self.messages.clone(),
		}
	}
}

/// Load a [`FrameworkConfig`] from a TOML, JSON or YAML file, picked by
/// extension.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<FrameworkConfig, ConfigError> {
	let path_ref = path.as_ref();
	let content = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
		path: path_ref.display().to_string(),
		source,
	})?;

	let extension = path_ref
		.extension()
		.and_then(|ext| ext.to_str())
		.ok_or(ConfigError::NoExtension)?;

	match extension.to_lowercase().as_str() {
		"toml" => Ok(toml::from_str(&content)?),
		"json" => Ok(serde_json::from_str(&content)?),
		"yaml" | "yml" => Ok(serde_yaml::from_str(&content)?),
		_ => Err(ConfigError::UnsupportedFormat(extension.to_string())),
	}
}
