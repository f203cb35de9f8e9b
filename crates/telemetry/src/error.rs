use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
	#[error("invalid log level '{0}'; expected one of trace, debug, info, warn, error")]
	InvalidLogLevel(String),

	#[error("logger is not initialized")]
	NotInitialized,

	#[error("failed to install the global subscriber: {0}")]
	InitFailed(String),

	#[error("failed to reload the log filter: {0}")]
	ReloadFailed(String),
}
