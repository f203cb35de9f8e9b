//! Declarative metadata attached to handlers.
//!
//! These records are pure data. The registry and the dispatcher read them;
//! nothing here executes.

use std::time::Duration;

use crate::message::Message;

/// Which kind of actor may run a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SenderRestriction {
	#[default]
	Any,
	InteractiveOnly,
	ConsoleOnly,
}

/// Metadata for an executable command or sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
	/// Dot-separated path, e.g. `guild.kick`.
	pub name: String,
	pub aliases: Vec<String>,
	/// Permission string; empty means none required.
	pub permission: String,
	pub description: String,
	pub usage: String,
	pub min_args: usize,
	/// `None` means unlimited.
	pub max_args: Option<usize>,
	/// Operator privilege is required. Checked before `permission`.
	pub operator_only: bool,
	/// Run the handler on the scheduler instead of inline.
	pub asynchronous: bool,
	pub sender: SenderRestriction,
	/// Namespace used by the host when the label clashes; empty means the
	/// host's default.
	pub fallback_prefix: String,
}

impl CommandMeta {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			aliases: Vec::new(),
			permission: String::new(),
			description: String::new(),
			usage: String::new(),
			min_args: 0,
			max_args: None,
			operator_only: false,
			asynchronous: false,
			sender: SenderRestriction::Any,
			fallback_prefix: String::new(),
		}
	}

	/// Neutral metadata for a synthetic parent node.
	pub fn placeholder(name: impl Into<String>) -> Self {
		Self::new(name)
	}

	/// Copy of `self` reachable under `alias`: the final path segment is
	/// replaced and the alias list is cleared so aliases never recurse.
	pub fn alias_of(&self, alias: &str) -> Self {
		let name = match self.name.rsplit_once('.') {
			Some((parent, _)) => format!("{parent}.{alias}"),
			None => alias.to_string(),
		};
		Self {
			name,
			aliases: Vec::new(),
			..self.clone()
		}
	}

	/// Validate the effective argument count against `min_args`/`max_args`.
	pub fn validate_arg_count(&self, arg_count: usize) -> Result<(), Message> {
		if arg_count < self.min_args {
			return Err(Message::ShortArgSize);
		}
		match self.max_args {
			Some(max) if arg_count > max => Err(Message::LongArgSize),
			_ => Ok(()),
		}
	}

	/// Number of dot-separated segments in the path.
	pub fn depth(&self) -> usize {
		path_depth(&self.name)
	}

	/// First path segment, the label known to the host.
	pub fn root(&self) -> &str {
		root_of(&self.name)
	}

	pub fn aliases<I, S>(mut self, aliases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.aliases = aliases.into_iter().map(Into::into).collect();
		self
	}

	pub fn permission(mut self, permission: impl Into<String>) -> Self {
		self.permission = permission.into();
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	pub fn usage(mut self, usage: impl Into<String>) -> Self {
		self.usage = usage.into();
		self
	}

	pub fn min_args(mut self, min: usize) -> Self {
		self.min_args = min;
		self
	}

	pub fn max_args(mut self, max: usize) -> Self {
		self.max_args = Some(max);
		self
	}

	pub fn operator_only(mut self) -> Self {
		self.operator_only = true;
		self
	}

	pub fn asynchronous(mut self) -> Self {
		self.asynchronous = true;
		self
	}

	pub fn sender(mut self, sender: SenderRestriction) -> Self {
		self.sender = sender;
		self
	}

	pub fn fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.fallback_prefix = prefix.into();
		self
	}
}

/// Metadata for a tab-completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleterMeta {
	pub name: String,
	pub aliases: Vec<String>,
	pub permission: String,
}

impl CompleterMeta {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			aliases: Vec::new(),
			permission: String::new(),
		}
	}

	pub fn alias_of(&self, alias: &str) -> Self {
		let name = match self.name.rsplit_once('.') {
			Some((parent, _)) => format!("{parent}.{alias}"),
			None => alias.to_string(),
		};
		Self {
			name,
			aliases: Vec::new(),
			permission: self.permission.clone(),
		}
	}

	pub fn depth(&self) -> usize {
		path_depth(&self.name)
	}

	pub fn aliases<I, S>(mut self, aliases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.aliases = aliases.into_iter().map(Into::into).collect();
		self
	}

	pub fn permission(mut self, permission: impl Into<String>) -> Self {
		self.permission = permission.into();
		self
	}
}

/// Per-actor cooldown between two runs of the same command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownSpec {
	pub duration: Duration,
	/// Actors holding this permission skip the cooldown.
	pub bypass_permission: String,
	/// Consoles are exempt unless this is set.
	pub override_console: bool,
}

impl CooldownSpec {
	pub fn new(duration: Duration) -> Self {
		Self {
			duration,
			bypass_permission: String::new(),
			override_console: false,
		}
	}

	pub fn seconds(secs: u64) -> Self {
		Self::new(Duration::from_secs(secs))
	}

	pub fn bypass_permission(mut self, permission: impl Into<String>) -> Self {
		self.bypass_permission = permission.into();
		self
	}

	pub fn override_console(mut self) -> Self {
		self.override_console = true;
		self
	}
}

/// Two-step confirmation: the first run prompts, a second run inside the
/// window executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSpec {
	pub message: String,
	pub bypass_permission: String,
	pub expire_after: Duration,
	pub override_console: bool,
}

impl ConfirmationSpec {
	pub fn new(message: impl Into<String>, expire_after: Duration) -> Self {
		Self {
			message: message.into(),
			bypass_permission: String::new(),
			expire_after,
			override_console: false,
		}
	}

	pub fn bypass_permission(mut self, permission: impl Into<String>) -> Self {
		self.bypass_permission = permission.into();
		self
	}

	pub fn override_console(mut self) -> Self {
		self.override_console = true;
		self
	}
}

/// A `--key=value[,value...]` option declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
	pub key: String,
	pub prefix: String,
	pub key_separator: String,
	pub value_separator: String,
	pub allow_separating: bool,
}

impl OptionSpec {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			prefix: "--".into(),
			key_separator: "=".into(),
			value_separator: ",".into(),
			allow_separating: true,
		}
	}

	pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
		self.key_separator = separator.into();
		self
	}

	pub fn value_separator(mut self, separator: impl Into<String>) -> Self {
		self.value_separator = separator.into();
		self
	}

	pub fn no_separating(mut self) -> Self {
		self.allow_separating = false;
		self
	}
}

/// A group of boolean `--flag` names sharing one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
	pub names: Vec<String>,
	pub prefix: String,
}

impl FlagSpec {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			names: names.into_iter().map(Into::into).collect(),
			prefix: "--".into(),
		}
	}

	pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}
}

pub(crate) fn path_depth(path: &str) -> usize {
	path.split('.').count()
}

pub(crate) fn root_of(path: &str) -> &str {
	path.split('.').next().unwrap_or(path)
}
