//! The two command tries plus flat views over what they hold.

use std::any::Any;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use log::error;
use log::warn;

use crate::declare::CommandBinding;
use crate::declare::CompleterBinding;
use crate::host::HostPlatform;
use crate::host::LabelRegistration;
use crate::matcher::CommandMatcher;
use crate::meta::CommandMeta;
use crate::meta::CompleterMeta;
use crate::meta::root_of;
use crate::trie::CommandNode;
use crate::trie::CommandTree;

type Owner = Arc<dyn Any + Send + Sync>;

/// What a command path resolves to.
#[derive(Clone)]
pub struct RegisteredMember {
	meta: Arc<CommandMeta>,
	owner: Option<Owner>,
	binding: Option<Arc<CommandBinding>>,
}

impl RegisteredMember {
	pub(crate) fn bound(meta: Arc<CommandMeta>, binding: Arc<CommandBinding>, owner: Owner) -> Self {
		Self {
			meta,
			owner: Some(owner),
			binding: Some(binding),
		}
	}

	pub(crate) fn placeholder(meta: Arc<CommandMeta>) -> Self {
		Self {
			meta,
			owner: None,
			binding: None,
		}
	}

	pub fn meta(&self) -> &Arc<CommandMeta> {
		&self.meta
	}

	pub fn binding(&self) -> Option<&Arc<CommandBinding>> {
		self.binding.as_ref()
	}

	/// The instance whose handler this is.
	pub fn owner(&self) -> Option<&Owner> {
		self.owner.as_ref()
	}

	/// A synthesized parent with no handler behind it.
	pub fn is_placeholder(&self) -> bool {
		self.binding.is_none()
	}
}

impl fmt::Debug for RegisteredMember {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisteredMember")
			.field("name", &self.meta.name)
			.field("placeholder", &self.is_placeholder())
			.finish()
	}
}

/// What a completion path resolves to.
#[derive(Clone)]
pub struct RegisteredCompleter {
	meta: Arc<CompleterMeta>,
	owner: Owner,
	binding: Arc<CompleterBinding>,
}

impl RegisteredCompleter {
	pub fn meta(&self) -> &Arc<CompleterMeta> {
		&self.meta
	}

	pub fn binding(&self) -> &Arc<CompleterBinding> {
		&self.binding
	}

	pub fn owner(&self) -> &Owner {
		&self.owner
	}
}

impl fmt::Debug for RegisteredCompleter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisteredCompleter")
			.field("name", &self.meta.name)
			.finish()
	}
}

/// A label the host accepted, under the name it chose.
#[derive(Debug, Clone)]
struct HeldLabel {
	bound: String,
	registration: LabelRegistration,
}

/// Command and completer tries.
///
/// Mutation takes `&mut self`, so every registration happens before any
/// lookup that observes it.
#[derive(Default)]
pub struct CommandRegistry {
	commands: CommandTree<RegisteredMember>,
	completers: CommandTree<RegisteredCompleter>,
	top_level: Vec<Arc<CommandMeta>>,
	sub_level: Vec<Arc<CommandMeta>>,
	/// Root label to what the host bound for it.
	host_labels: HashMap<String, HeldLabel>,
}

impl CommandRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind `binding` at the path in `meta` and at every alias of it.
	pub fn register_command(&mut self, meta: CommandMeta, binding: CommandBinding, owner: Owner) {
		let binding = Arc::new(binding);
		let aliases: Vec<CommandMeta> = meta.aliases.iter().map(|a| meta.alias_of(a)).collect();

		for meta in std::iter::once(meta).chain(aliases) {
			let meta = Arc::new(meta);
			debug!("Registering command '{}'", meta.name);
			self.insert_command(RegisteredMember::bound(
				meta,
				binding.clone(),
				owner.clone(),
			));
		}
	}

	/// Bind a completion handler at the path in `meta` and its aliases.
	pub fn register_completer(
		&mut self,
		meta: CompleterMeta,
		binding: CompleterBinding,
		owner: Owner,
	) {
		let binding = Arc::new(binding);
		let aliases: Vec<CompleterMeta> = meta.aliases.iter().map(|a| meta.alias_of(a)).collect();

		for meta in std::iter::once(meta).chain(aliases) {
			debug!("Registering completer '{}'", meta.name);
			let name = meta.name.clone();
			self.completers.insert(
				&name,
				RegisteredCompleter {
					meta: Arc::new(meta),
					owner: owner.clone(),
					binding: binding.clone(),
				},
			);
		}
	}

	fn insert_command(&mut self, member: RegisteredMember) {
		let meta = member.meta.clone();
		let level = if meta.depth() == 1 {
			&mut self.top_level
		} else {
			&mut self.sub_level
		};
		upsert(level, meta.clone());
		if self.commands.insert(&meta.name, member).is_some() {
			debug!("Command '{}' replaced an earlier registration", meta.name);
		}
	}

	/// Make every node with children invocable and expose every root label
	/// to `host`.
	///
	/// Nodes with children but no handler get a placeholder member. Host
	/// refusals are logged and do not stop the remaining labels. Returns the
	/// number of labels newly accepted by the host.
	pub fn verify_hierarchy(&mut self, host: &dyn HostPlatform) -> usize {
		let mut top = Vec::new();
		let mut sub = Vec::new();

		for (label, root) in self.commands.roots_mut() {
			if root.is_synthetic_parent() {
				let meta = Arc::new(CommandMeta::placeholder(label));
				root.set_member(RegisteredMember::placeholder(meta.clone()));
				top.push(meta);
			}
			synthesize_children(root, label, &mut sub);
		}

		for meta in top {
			debug!("Synthesized placeholder for root '{}'", meta.name);
			upsert(&mut self.top_level, meta);
		}
		for meta in sub {
			debug!("Synthesized placeholder for '{}'", meta.name);
			upsert(&mut self.sub_level, meta);
		}

		let mut accepted = 0;
		let labels: BTreeSet<String> = self.commands.root_labels().into_iter().collect();
		for label in labels {
			let Some(member) = self.commands.root(&label).and_then(CommandNode::member) else {
				continue;
			};
			let registration = LabelRegistration::from_meta(&label, &member.meta);
			match self.host_labels.get(&label) {
				Some(held) if held.registration == registration => continue,
				Some(held) => {
					debug!("Metadata behind label '{}' changed, registering it again", label);
					if let Err(e) = host.unregister_label(&held.bound) {
						error!("Failed to release command label '{}': {}", held.bound, e);
						continue;
					}
					self.host_labels.remove(&label);
				}
				None => {}
			}
			match host.register_label(&registration) {
				Ok(bound) => {
					if bound != label {
						debug!("Host bound label '{}' as '{}'", label, bound);
					}
					self.host_labels
						.insert(label, HeldLabel { bound, registration });
					accepted += 1;
				}
				Err(e) => error!("Failed to register command label '{}': {}", label, e),
			}
		}
		accepted
	}

	/// Drop everything under `root` and release the label from `host`.
	///
	/// Returns `false` when nothing was registered under `root`.
	pub fn unregister(&mut self, root: &str, host: &dyn HostPlatform) -> bool {
		let label = root.to_lowercase();
		let had_commands = self.commands.remove_root(&label).is_some();
		let had_completers = self.completers.remove_root(&label).is_some();
		if !had_commands && !had_completers {
			warn!("Cannot unregister '{}': no such command", root);
			return false;
		}

		let under_root = |meta: &Arc<CommandMeta>| root_of(&meta.name).to_lowercase() == label;
		self.top_level.retain(|meta| !under_root(meta));
		self.sub_level.retain(|meta| !under_root(meta));

		if let Some(held) = self.host_labels.remove(&label) {
			if let Err(e) = host.unregister_label(&held.bound) {
				error!("Failed to release command label '{}': {}", held.bound, e);
			}
		}
		debug!("Unregistered '{}'", label);
		true
	}

	/// Unregister every root. Returns how many were removed.
	pub fn unregister_all(&mut self, host: &dyn HostPlatform) -> usize {
		let mut labels: BTreeSet<String> = self.commands.root_labels().into_iter().collect();
		labels.extend(self.completers.root_labels());
		labels
			.into_iter()
			.filter(|label| self.unregister(label, host))
			.count()
	}

	pub fn matcher(&self) -> CommandMatcher<'_> {
		CommandMatcher::new(&self.commands, &self.completers)
	}

	pub fn contains_root(&self, label: &str) -> bool {
		self.commands.contains_root(label)
	}

	/// Top-level commands, placeholders included.
	pub fn commands(&self) -> &[Arc<CommandMeta>] {
		&self.top_level
	}

	pub fn sub_commands(&self) -> &[Arc<CommandMeta>] {
		&self.sub_level
	}

	pub fn all_commands(&self) -> Vec<Arc<CommandMeta>> {
		self.top_level
			.iter()
			.chain(&self.sub_level)
			.cloned()
			.collect()
	}
}

fn synthesize_children(
	node: &mut CommandNode<RegisteredMember>,
	path: &str,
	out: &mut Vec<Arc<CommandMeta>>,
) {
	for (segment, child) in node.children_mut() {
		let child_path = format!("{path}.{segment}");
		if child.is_synthetic_parent() {
			let meta = Arc::new(CommandMeta::placeholder(child_path.clone()));
			child.set_member(RegisteredMember::placeholder(meta.clone()));
			out.push(meta);
		}
		synthesize_children(child, &child_path, out);
	}
}

fn upsert(list: &mut Vec<Arc<CommandMeta>>, meta: Arc<CommandMeta>) {
	match list.iter_mut().find(|m| m.name == meta.name) {
		Some(slot) => *slot = meta,
		None => list.push(meta),
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use super::*;
	use crate::declare::CommandSet;
	use crate::declare::Declarations;
	use crate::error::HostError;

	struct Noop;

	impl CommandSet for Noop {
		fn declare(_d: &mut Declarations<Self>) {}
	}

	fn binding() -> CommandBinding {
		let mut decls = Declarations::new(Arc::new(Noop));
		decls
			.command(CommandMeta::new("x"))
			.handler(|_, _, _| Ok(()));
		decls.commands.remove(0).binding
	}

	fn owner() -> Owner {
		Arc::new(Noop)
	}

	#[derive(Default)]
	struct Host {
		registered: Mutex<Vec<String>>,
		released: Mutex<Vec<String>>,
		refuse: Option<String>,
	}

	impl HostPlatform for Host {
		fn register_label(&self, registration: &LabelRegistration) -> Result<String, HostError> {
			if self.refuse.as_deref() == Some(registration.label.as_str()) {
				return Err(HostError::new(&registration.label, "taken"));
			}
			let bound = match &registration.fallback_prefix {
				Some(prefix) => format!("{prefix}:{}", registration.label),
				None => registration.label.clone(),
			};
			self.registered.lock().unwrap().push(bound.clone());
			Ok(bound)
		}

		fn unregister_label(&self, label: &str) -> Result<(), HostError> {
			self.released.lock().unwrap().push(label.to_string());
			Ok(())
		}
	}

	fn names(metas: &[Arc<CommandMeta>]) -> Vec<&str> {
		let mut names: Vec<&str> = metas.iter().map(|m| m.name.as_str()).collect();
		names.sort();
		names
	}

	#[test]
	fn test_levels_and_aliases() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("guild").aliases(["g"]), binding(), owner());
		registry.register_command(
			CommandMeta::new("guild.kick").aliases(["boot"]),
			binding(),
			owner(),
		);

		assert_eq!(names(registry.commands()), vec!["g", "guild"]);
		assert_eq!(names(registry.sub_commands()), vec!["guild.boot", "guild.kick"]);
		assert_eq!(registry.all_commands().len(), 4);

		let matcher = registry.matcher();
		let boot = matcher.command("guild", &["boot"]).unwrap();
		assert_eq!(boot.meta().name, "guild.boot");
		assert!(boot.meta().aliases.is_empty());
	}

	#[test]
	fn test_reregister_replaces() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("party").usage("old"), binding(), owner());
		registry.register_command(CommandMeta::new("party").usage("new"), binding(), owner());

		assert_eq!(registry.commands().len(), 1);
		let member = registry.matcher().command::<&str>("party", &[]).unwrap();
		assert_eq!(member.meta().usage, "new");
	}

	#[test]
	fn test_verify_hierarchy_synthesizes_placeholders() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("guild.member.kick"), binding(), owner());
		registry.register_command(CommandMeta::new("party"), binding(), owner());

		let host = Host::default();
		assert_eq!(registry.verify_hierarchy(&host), 2);
		assert_eq!(registry.verify_hierarchy(&host), 0);

		let mut registered = host.registered.lock().unwrap().clone();
		registered.sort();
		assert_eq!(registered, vec!["guild", "party"]);

		let matcher = registry.matcher();
		let root = matcher.command::<&str>("guild", &[]).unwrap();
		assert!(root.is_placeholder());
		assert_eq!(root.meta().as_ref(), &CommandMeta::placeholder("guild"));

		let middle = matcher.command("guild", &["member"]).unwrap();
		assert!(middle.is_placeholder());
		assert_eq!(middle.meta().name, "guild.member");

		assert!(names(registry.commands()).contains(&"guild"));
		assert!(names(registry.sub_commands()).contains(&"guild.member"));
	}

	#[test]
	fn test_host_refusal_does_not_abort_batch() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("alpha"), binding(), owner());
		registry.register_command(CommandMeta::new("beta"), binding(), owner());

		let host = Host {
			refuse: Some("alpha".into()),
			..Host::default()
		};
		assert_eq!(registry.verify_hierarchy(&host), 1);
		assert_eq!(*host.registered.lock().unwrap(), vec!["beta"]);
		assert!(registry.contains_root("alpha"));
	}

	#[test]
	fn test_binding_a_placeholder_root_updates_the_host() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("guild.kick"), binding(), owner());
		let host = Host::default();
		assert_eq!(registry.verify_hierarchy(&host), 1);

		registry.register_command(
			CommandMeta::new("guild").description("Guild management").permission("guild.use"),
			binding(),
			owner(),
		);
		assert_eq!(registry.verify_hierarchy(&host), 1);
		assert_eq!(*host.released.lock().unwrap(), vec!["guild"]);
		assert_eq!(*host.registered.lock().unwrap(), vec!["guild", "guild"]);

		let root = registry.matcher().command::<&str>("guild", &[]).unwrap();
		assert!(!root.is_placeholder());
		assert_eq!(registry.verify_hierarchy(&host), 0);
	}

	#[test]
	fn test_unregister_releases_the_bound_name() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("kick").fallback_prefix("mod"), binding(), owner());
		let host = Host::default();
		registry.verify_hierarchy(&host);
		assert_eq!(*host.registered.lock().unwrap(), vec!["mod:kick"]);

		assert!(registry.unregister("kick", &host));
		assert_eq!(*host.released.lock().unwrap(), vec!["mod:kick"]);
	}

	#[test]
	fn test_unregister() {
		let mut registry = CommandRegistry::new();
		registry.register_command(CommandMeta::new("guild"), binding(), owner());
		registry.register_command(CommandMeta::new("guild.kick"), binding(), owner());
		registry.register_command(CommandMeta::new("party"), binding(), owner());
		let host = Host::default();
		registry.verify_hierarchy(&host);

		assert!(registry.unregister("GUILD", &host));
		assert!(!registry.contains_root("guild"));
		assert!(registry.sub_commands().is_empty());
		assert_eq!(names(registry.commands()), vec!["party"]);
		assert_eq!(*host.released.lock().unwrap(), vec!["guild"]);

		assert!(!registry.unregister("guild", &host));
		assert_eq!(registry.unregister_all(&host), 1);
		assert!(registry.all_commands().is_empty());
	}
}
