use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

use crate::TelemetryError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Local wall-clock time with millisecond precision.
struct LocalMillis;

impl FormatTime for LocalMillis {
	fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
		write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
	}
}

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Lower-cased `level` if it is one of the five standard levels.
pub fn normalize_level(level: &str) -> Result<String, TelemetryError> {
	let lower = level.to_lowercase();
	if LEVELS.contains(&lower.as_str()) {
		Ok(lower)
	} else {
		Err(TelemetryError::InvalidLogLevel(level.to_string()))
	}
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, wins over `level`. Records emitted through the
/// `log` facade are captured as well. Calling this again after a successful
/// initialization does nothing.
///
/// ```no_run
/// telemetry::init("info")?;
/// tracing::info!("console ready");
/// # Ok::<(), telemetry::TelemetryError>(())
/// ```
pub fn init(level: &str) -> Result<(), TelemetryError> {
	if FILTER.get().is_some() {
		return Ok(());
	}
	let level = normalize_level(level)?;
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
	let (filter_layer, handle) = reload::Layer::new(filter);

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(
			fmt::layer()
				.with_timer(LocalMillis)
				.with_target(true)
				.with_thread_names(true),
		)
		.try_init()
		.map_err(|e| TelemetryError::InitFailed(e.to_string()))?;

	let _ = FILTER.set(handle);
	Ok(())
}

/// Swap the active filter for `level`.
pub fn reload_log_level(level: &str) -> Result<(), TelemetryError> {
	let level = normalize_level(level)?;
	let handle = FILTER.get().ok_or(TelemetryError::NotInitialized)?;
	handle
		.reload(EnvFilter::new(&level))
		.map_err(|e| TelemetryError::ReloadFailed(e.to_string()))?;
	tracing::debug!("log level set to {}", level);
	Ok(())
}
