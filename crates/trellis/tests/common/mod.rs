#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use trellis::Actor;
use trellis::ActorKind;
use trellis::HostError;
use trellis::HostPlatform;
use trellis::LabelRegistration;

pub struct TestActor {
	id: String,
	kind: ActorKind,
	operator: bool,
	permissions: HashSet<String>,
	inbox: Mutex<Vec<String>>,
}

impl TestActor {
	pub fn player(id: &str) -> Arc<Self> {
		Arc::new(Self::build(id, ActorKind::Interactive, false, &[]))
	}

	pub fn player_with(id: &str, permissions: &[&str]) -> Arc<Self> {
		Arc::new(Self::build(id, ActorKind::Interactive, false, permissions))
	}

	pub fn operator(id: &str) -> Arc<Self> {
		Arc::new(Self::build(id, ActorKind::Interactive, true, &[]))
	}

	pub fn console() -> Arc<Self> {
		Arc::new(Self::build("CONSOLE", ActorKind::Console, true, &[]))
	}

	fn build(id: &str, kind: ActorKind, operator: bool, permissions: &[&str]) -> Self {
		Self {
			id: id.to_string(),
			kind,
			operator,
			permissions: permissions.iter().map(|p| p.to_string()).collect(),
			inbox: Mutex::new(Vec::new()),
		}
	}

	pub fn messages(&self) -> Vec<String> {
		self.inbox.lock().unwrap().clone()
	}

	pub fn last_message(&self) -> Option<String> {
		self.inbox.lock().unwrap().last().cloned()
	}
}

impl Actor for TestActor {
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

/// Host that remembers which labels it holds.
#[derive(Default)]
pub struct RecordingHost {
	labels: Mutex<Vec<LabelRegistration>>,
	refused: HashSet<String>,
}

impl RecordingHost {
	pub fn refusing(labels: &[&str]) -> Self {
		Self {
			refused: labels.iter().map(|l| l.to_string()).collect(),
			..Self::default()
		}
	}

	pub fn labels(&self) -> Vec<String> {
		let mut labels: Vec<String> = self
			.labels
			.lock()
			.unwrap()
			.iter()
			.map(|r| r.label.clone())
			.collect();
		labels.sort();
		labels
	}

	pub fn registration(&self, label: &str) -> Option<LabelRegistration> {
		self.labels
			.lock()
			.unwrap()
			.iter()
			.find(|r| r.label == label)
			.cloned()
	}
}

impl HostPlatform for RecordingHost {
	fn register_label(&self, registration: &LabelRegistration) -> Result<String, HostError> {
		if self.refused.contains(&registration.label) {
			return Err(HostError::new(registration.label.clone(), "label is taken"));
		}
		self.labels.lock().unwrap().push(registration.clone());
		Ok(registration.label.clone())
	}

	fn unregister_label(&self, label: &str) -> Result<(), HostError> {
		self.labels.lock().unwrap().retain(|r| r.label != label);
		Ok(())
	}
}

pub fn tokens(line: &str) -> Vec<String> {
	line.split_whitespace().map(str::to_string).collect()
}
