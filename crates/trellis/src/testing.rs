use std::collections::HashSet;
use std::sync::Mutex;

use crate::host::Actor;
use crate::host::ActorKind;

/// Actor that records every message it receives.
#[derive(Debug)]
pub(crate) struct RecordingActor {
	id: String,
	kind: ActorKind,
	operator: bool,
	permissions: HashSet<String>,
	inbox: Mutex<Vec<String>>,
}

impl RecordingActor {
	pub(crate) fn interactive(id: &str) -> Self {
		Self {
			id: id.to_string(),
			kind: ActorKind::Interactive,
			operator: false,
			permissions: HashSet::new(),
			inbox: Mutex::new(Vec::new()),
		}
	}

	pub(crate) fn console() -> Self {
		Self {
			kind: ActorKind::Console,
			operator: true,
			..Self::interactive("CONSOLE")
		}
	}

	pub(crate) fn with_permission(mut self, permission: &str) -> Self {
		self.permissions.insert(permission.to_string());
		self
	}

	pub(crate) fn messages(&self) -> Vec<String> {
		self.inbox.lock().unwrap().clone()
	}
}

impl Actor for RecordingActor {
	fn id(&self) -> &str {
		&self.id
	}

	fn has_permission(&self, permission: &str) -> bool {
		self.operator || self.permissions.contains(permission)
	}

	fn is_operator(&self) -> bool {
		self.operator
	}

	fn kind(&self) -> ActorKind {
		self.kind
	}

	fn send_message(&self, message: &str) {
		self.inbox.lock().unwrap().push(message.to_string());
	}
}
