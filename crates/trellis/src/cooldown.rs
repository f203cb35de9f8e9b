use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::expiring::SelfExpiringMap;
use crate::host::Actor;
use crate::host::ActorKind;
use crate::meta::CooldownSpec;

/// (actor id, command path)
type CooldownKey = (String, String);

/// Per-actor, per-command cooldown windows.
pub struct CooldownManager {
	windows: SelfExpiringMap<CooldownKey, ()>,
}

impl Default for CooldownManager {
	fn default() -> Self {
		Self::new()
	}
}

impl CooldownManager {
	pub fn new() -> Self {
		Self {
			windows: SelfExpiringMap::new(),
		}
	}

	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self {
			windows: SelfExpiringMap::with_clock(clock),
		}
	}

	/// Whether `sender` is still cooling down on `path`.
	///
	/// When no live window exists a fresh one is opened in the same atomic
	/// step, so two concurrent invocations cannot both pass.
	pub fn has_cooldown(&self, sender: &dyn Actor, path: &str, spec: &CooldownSpec) -> bool {
		if spec.duration.is_zero() {
			return false;
		}
		if sender.kind() == ActorKind::Console && !spec.override_console {
			return false;
		}
		if !spec.bypass_permission.is_empty() && sender.has_permission(&spec.bypass_permission) {
			return false;
		}

		let key = (sender.id().to_string(), path.to_string());
		self.windows
			.insert_if_vacant(key, (), spec.duration)
			.is_some()
	}

	/// Time left on the window of `actor_id` for `path`.
	pub fn remaining(&self, actor_id: &str, path: &str) -> Option<Duration> {
		self.windows
			.remaining(&(actor_id.to_string(), path.to_string()))
	}

	/// Close the window early.
	pub fn clear(&self, actor_id: &str, path: &str) {
		self.windows
			.remove(&(actor_id.to_string(), path.to_string()));
	}

	pub fn purge_expired(&self) -> usize {
		self.windows.purge_expired()
	}
}
