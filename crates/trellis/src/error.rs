//! Error types for registration, parameter binding and dispatch.

use thiserror::Error;

/// Error type returned by application handlers.
///
/// Anything that converts into a boxed error can be propagated with `?`,
/// including [`FrameworkError::CooldownActive`] raised by
/// [`crate::CommandArguments::check_cooldown`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by application handlers.
pub type HandlerResult<T = ()> = Result<T, HandlerError>;

/// Configuration errors raised by the framework.
///
/// These point at a programming mistake in the application (a missing
/// provider, a duplicate key, a parameter that can never be bound) and are
/// never swallowed by the dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameworkError {
	#[error("parameter provider for '{key}' is already registered")]
	DuplicateProvider { key: String },

	#[error(
		"no parameter provider found for key '{key}' in handler '{handler}' (requested type: {type_name}); did you forget to register it?"
	)]
	MissingKeyedProvider {
		key: String,
		handler: String,
		type_name: String,
	},

	#[error(
		"no parameter provider found for type '{type_name}' in handler '{handler}'; register one with add_type_provider"
	)]
	MissingTypeProvider { type_name: String, handler: String },

	#[error(
		"required parameter '{key}' (type: {type_name}) in handler '{handler}' resolved to no value; mark it optional or give it a default"
	)]
	MissingValue {
		key: String,
		type_name: String,
		handler: String,
	},

	#[error("provider '{key}' produced a value that is not a {expected} in handler '{handler}'")]
	ProviderTypeMismatch {
		key: String,
		expected: String,
		handler: String,
	},

	#[error("type '{type_name}' does not support default values (it is not parsable from text)")]
	DefaultUnsupported { type_name: String },

	#[error("default value '{value}' is not a valid {type_name}: {reason}")]
	InvalidDefault {
		value: String,
		type_name: String,
		reason: String,
	},

	#[error("the custom cooldown checker option must be enabled to call check_cooldown")]
	CustomCooldownCheckerDisabled,

	/// Sentinel raised by a cooperative cooldown check. The dispatcher
	/// swallows it silently.
	#[error("command is on cooldown")]
	CooldownActive,

	/// A handler or completer panicked; the panic was caught at dispatch.
	#[error("handler panicked: {0}")]
	HandlerPanicked(String),
}

impl FrameworkError {
	/// Whether `err`, or any error in its source chain, is the cooldown
	/// sentinel.
	pub fn is_cooldown_sentinel(err: &(dyn std::error::Error + 'static)) -> bool {
		let mut current = Some(err);
		while let Some(e) = current {
			if matches!(
				e.downcast_ref::<FrameworkError>(),
				Some(FrameworkError::CooldownActive)
			) {
				return true;
			}
			current = e.source();
		}
		false
	}
}

/// Error reported by a host platform that refused a label operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("host platform rejected label '{label}': {reason}")]
pub struct HostError {
	pub label: String,
	pub reason: String,
}

impl HostError {
	pub fn new(label: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			reason: reason.into(),
		}
	}
}

/// Configuration file loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("Failed to read configuration file '{path}': {source}")]
	Io {
		source: std::io::Error,
		path: String,
	},

	#[error("Failed to parse TOML configuration: {0}")]
	TomlParse(#[from] toml::de::Error),

	#[error("Failed to parse JSON configuration: {0}")]
	JsonParse(#[from] serde_json::Error),

	#[error("Failed to parse YAML configuration: {0}")]
	YamlParse(#[from] serde_yaml::Error),

	#[error("Unsupported configuration format: {0}")]
	UnsupportedFormat(String),

	#[error("Configuration file has no extension")]
	NoExtension,
}
