use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Millisecond time source used by the self-expiring stores.
pub trait Clock: Send + Sync {
	/// Milliseconds since the Unix epoch.
	fn now_millis(&self) -> u64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		chrono::Utc::now().timestamp_millis().max(0) as u64
	}
}

/// A clock that only moves when told to.
///
/// Useful for hosts with their own tick source and for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicU64,
}

impl ManualClock {
	pub fn new(start_millis: u64) -> Self {
		Self {
			now: AtomicU64::new(start_millis),
		}
	}

	pub fn advance(&self, by: Duration) {
		self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
	}

	pub fn set(&self, millis: u64) {
		self.now.store(millis, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> u64 {
		self.now.load(Ordering::SeqCst)
	}
}
