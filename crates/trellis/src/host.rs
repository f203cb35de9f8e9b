//! Collaborators supplied by the host application: who is speaking, where
//! labels get registered, and where deferred work runs.

use std::fmt;
use std::sync::Arc;

use crate::error::HostError;
use crate::meta::CommandMeta;

/// Coarse classification of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
	/// A user typing into a client.
	Interactive,
	/// The server console or another non-interactive source.
	Console,
}

/// Whoever issued an invocation.
pub trait Actor: Send + Sync {
	/// Stable identity used to key cooldowns and confirmations.
	fn id(&self) -> &str;

	fn has_permission(&self, permission: &str) -> bool;

	fn is_operator(&self) -> bool;

	fn kind(&self) -> ActorKind;

	fn send_message(&self, message: &str);
}

impl fmt::Debug for dyn Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Actor")
			.field("id", &self.id())
			.field("kind", &self.kind())
			.finish()
	}
}

/// What the host needs to expose a root label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistration {
	pub label: String,
	pub description: String,
	pub usage: String,
	pub permission: Option<String>,
	pub fallback_prefix: Option<String>,
}

impl LabelRegistration {
	pub(crate) fn from_meta(label: &str, meta: &CommandMeta) -> Self {
		let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
		Self {
			label: label.to_string(),
			description: meta.description.clone(),
			usage: meta.usage.clone(),
			permission: non_empty(&meta.permission),
			fallback_prefix: non_empty(&meta.fallback_prefix),
		}
	}
}

/// The host's command table.
pub trait HostPlatform: Send + Sync {
	/// Expose a root label. Returns the name actually bound, which differs
	/// from `registration.label` when the host fell back to a namespaced
	/// name.
	fn register_label(&self, registration: &LabelRegistration) -> Result<String, HostError>;

	/// Release a name previously returned by `register_label`.
	fn unregister_label(&self, label: &str) -> Result<(), HostError>;
}

/// A host that accepts every label and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

impl HostPlatform for DetachedHost {
	fn register_label(&self, registration: &LabelRegistration) -> Result<String, HostError> {
		Ok(registration.label.clone())
	}

	fn unregister_label(&self, _label: &str) -> Result<(), HostError> {
		Ok(())
	}
}

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Fire-and-forget execution of asynchronous handlers.
pub trait Scheduler: Send + Sync {
	fn submit(&self, task: Task);
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
	fn submit(&self, task: Task) {
		task();
	}
}

/// Runs tasks on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
	handle: tokio::runtime::Handle,
}

impl TokioScheduler {
	pub fn new(handle: tokio::runtime::Handle) -> Self {
		Self { handle }
	}

	/// Scheduler bound to the runtime the caller is running on.
	///
	/// Returns `None` outside of a tokio runtime.
	pub fn current() -> Option<Self> {
		tokio::runtime::Handle::try_current().ok().map(Self::new)
	}
}

impl Scheduler for TokioScheduler {
	fn submit(&self, task: Task) {
		// Handlers are plain blocking closures.
		drop(self.handle.spawn_blocking(task));
	}
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
	fn submit(&self, task: Task) {
		(**self).submit(task)
	}
}
