use std::sync::Arc;

use crate::clock::Clock;
use crate::expiring::SelfExpiringMap;
use crate::host::Actor;
use crate::host::ActorKind;
use crate::meta::ConfirmationSpec;

/// Pending two-step confirmations, one per actor.
pub struct ConfirmationManager {
	pending: SelfExpiringMap<String, String>,
}

impl Default for ConfirmationManager {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfirmationManager {
	pub fn new() -> Self {
		Self {
			pending: SelfExpiringMap::new(),
		}
	}

	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self {
			pending: SelfExpiringMap::with_clock(clock),
		}
	}

	/// Whether `sender` must confirm before `path` runs.
	///
	/// The first call opens a pending confirmation, sends the prompt and
	/// returns `true`. A second call for the same path inside the window
	/// consumes the pending entry and returns `false`. A call for a different
	/// path replaces the pending entry and prompts again.
	pub fn requires_confirmation(
		&self,
		sender: &dyn Actor,
		path: &str,
		spec: &ConfirmationSpec,
	) -> bool {
		if spec.expire_after.is_zero() {
			return false;
		}
		if sender.kind() == ActorKind::Console && !spec.override_console {
			return false;
		}
		if !spec.bypass_permission.is_empty() && sender.has_permission(&spec.bypass_permission) {
			return false;
		}

		let confirmed = self
			.pending
			.take_or_insert(
				sender.id().to_string(),
				path.to_string(),
				spec.expire_after,
				|pending| pending == path,
			)
			.is_some();

		if !confirmed {
			sender.send_message(&spec.message);
		}
		!confirmed
	}

	/// The path `actor_id` is currently asked to confirm.
	pub fn pending(&self, actor_id: &str) -> Option<String> {
		self.pending.get(&actor_id.to_string())
	}

	pub fn cancel(&self, actor_id: &str) -> Option<String> {
		self.pending.remove(&actor_id.to_string())
	}

	pub fn purge_expired(&self) -> usize {
		self.pending.purge_expired()
	}
}
