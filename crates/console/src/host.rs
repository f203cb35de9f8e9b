use std::collections::HashSet;
use std::sync::Mutex;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::debug;
use trellis::Actor;
use trellis::ActorKind;
use trellis::HostError;
use trellis::HostPlatform;
use trellis::LabelRegistration;

/// Label table of the console.
#[derive(Default)]
pub struct ConsoleHost {
	labels: DashMap<String, LabelRegistration>,
}

impl ConsoleHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registered labels in sorted order.
	pub fn labels(&self) -> Vec<LabelRegistration> {
		let mut labels: Vec<LabelRegistration> =
			self.labels.iter().map(|entry| entry.value().clone()).collect();
		labels.sort_by(|a, b| a.label.cmp(&b.label));
		labels
	}

	pub fn is_registered(&self, label: &str) -> bool {
		self.labels.contains_key(&label.to_lowercase())
	}
}

impl HostPlatform for ConsoleHost {
	fn register_label(&self, registration: &LabelRegistration) -> Result<String, HostError> {
		let label = &registration.label;
		if label.is_empty() || label.starts_with(':') || label.contains(char::is_whitespace) {
			return Err(HostError::new(label.clone(), "not a valid console label"));
		}
		if let Entry::Vacant(slot) = self.labels.entry(label.clone()) {
			slot.insert(registration.clone());
			return Ok(label.clone());
		}

		let Some(prefix) = &registration.fallback_prefix else {
			return Err(HostError::new(label.clone(), "label already registered"));
		};
		let namespaced = format!("{prefix}:{label}");
		match self.labels.entry(namespaced.clone()) {
			Entry::Vacant(slot) => {
				debug!("Label '{}' taken, registering as '{}'", label, namespaced);
				slot.insert(registration.clone());
				Ok(namespaced)
			}
			Entry::Occupied(_) => Err(HostError::new(namespaced, "label already registered")),
		}
	}

	fn unregister_label(&self, label: &str) -> Result<(), HostError> {
		self.labels
			.remove(label)
			.map(|_| ())
			.ok_or_else(|| HostError::new(label, "label is not registered"))
	}
}

/// The person (or script) typing into the console.
pub struct ConsoleActor {
	id: String,
	kind: ActorKind,
	operator: bool,
	permissions: HashSet<String>,
	echo: bool,
	transcript: Mutex<Vec<String>>,
}

impl ConsoleActor {
	pub fn new(id: impl Into<String>, kind: ActorKind, operator: bool, permissions: HashSet<String>) -> Self {
		Self {
			id: id.into(),
			kind,
			operator,
			permissions,
			echo: true,
			transcript: Mutex::new(Vec::new()),
		}
	}

	/// Keep messages in the transcript only.
	pub fn quiet(mut self) -> Self {
		self.echo = false;
		self
	}

	pub fn transcript(&self) -> Vec<String> {
		self.transcript
			.lock()
			.map(|t| t.clone())
			.unwrap_or_default()
	}
}

impl Actor for ConsoleActor {
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
		if self.echo {
			println!("{message}");
		}
		if let Ok(mut transcript) = self.transcript.lock() {
			transcript.push(message.to_string());
		}
	}
}
