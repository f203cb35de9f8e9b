//! How application types describe their handlers.
//!
//! ```ignore
//! struct Guild;
//!
//! impl CommandSet for Guild {
//!     fn declare(d: &mut Declarations<Self>) {
//!         d.command(CommandMeta::new("guild.kick").min_args(1))
//!             .param(ParamSpec::of::<String>().named("target"))
//!             .handler(|guild, args, params| guild.kick(args, params));
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::arguments::CommandArguments;
use crate::error::HandlerResult;
use crate::meta::CommandMeta;
use crate::meta::CompleterMeta;
use crate::meta::ConfirmationSpec;
use crate::meta::CooldownSpec;
use crate::meta::FlagSpec;
use crate::meta::OptionSpec;
use crate::params::ParamSpec;
use crate::params::Params;

pub(crate) type CommandFn = Arc<dyn Fn(&CommandArguments, &mut Params) -> HandlerResult + Send + Sync>;
pub(crate) type CompleterFn =
	Arc<dyn Fn(&CommandArguments, &mut Params) -> HandlerResult<Vec<String>> + Send + Sync>;

/// A type that owns command and completion handlers.
pub trait CommandSet: Send + Sync + 'static {
	fn declare(d: &mut Declarations<Self>)
	where
		Self: Sized;
}

/// A bound command handler and everything the dispatcher needs to run it.
pub struct CommandBinding {
	pub(crate) handler: CommandFn,
	pub(crate) params: Vec<ParamSpec>,
	pub(crate) cooldown: Option<CooldownSpec>,
	pub(crate) confirmation: Option<ConfirmationSpec>,
	pub(crate) options: Vec<OptionSpec>,
	pub(crate) flags: Vec<FlagSpec>,
}

impl CommandBinding {
	pub fn params(&self) -> &[ParamSpec] {
		&self.params
	}

	pub fn cooldown(&self) -> Option<&CooldownSpec> {
		self.cooldown.as_ref()
	}

	pub fn confirmation(&self) -> Option<&ConfirmationSpec> {
		self.confirmation.as_ref()
	}

	pub(crate) fn parses_options(&self) -> bool {
		!self.options.is_empty() || !self.flags.is_empty()
	}
}

impl fmt::Debug for CommandBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandBinding")
			.field("params", &self.params)
			.field("cooldown", &self.cooldown)
			.field("confirmation", &self.confirmation)
			.field("options", &self.options)
			.field("flags", &self.flags)
			.finish_non_exhaustive()
	}
}

pub struct CompleterBinding {
	pub(crate) handler: CompleterFn,
	pub(crate) params: Vec<ParamSpec>,
}

impl fmt::Debug for CompleterBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompleterBinding")
			.field("params", &self.params)
			.finish_non_exhaustive()
	}
}

pub(crate) struct CommandDecl {
	pub(crate) meta: CommandMeta,
	pub(crate) binding: CommandBinding,
	pub(crate) debug_only: bool,
}

pub(crate) struct CompleterDecl {
	pub(crate) meta: CompleterMeta,
	pub(crate) binding: CompleterBinding,
	pub(crate) debug_only: bool,
}

/// Collects the handlers of one [`CommandSet`] instance.
pub struct Declarations<T> {
	owner: Arc<T>,
	pub(crate) commands: Vec<CommandDecl>,
	pub(crate) completers: Vec<CompleterDecl>,
}

impl<T: CommandSet> Declarations<T> {
	pub(crate) fn new(owner: Arc<T>) -> Self {
		Self {
			owner,
			commands: Vec::new(),
			completers: Vec::new(),
		}
	}

	pub(crate) fn owner(&self) -> Arc<dyn Any + Send + Sync> {
		self.owner.clone()
	}

	/// The instance being declared, for sets whose commands depend on its
	/// state.
	pub fn instance(&self) -> &T {
		&self.owner
	}

	pub fn command(&mut self, meta: CommandMeta) -> CommandBuilder<'_, T> {
		CommandBuilder {
			decls: self,
			meta,
			params: Vec::new(),
			cooldown: None,
			confirmation: None,
			options: Vec::new(),
			flags: Vec::new(),
			debug_only: false,
		}
	}

	pub fn completer(&mut self, meta: CompleterMeta) -> CompleterBuilder<'_, T> {
		CompleterBuilder {
			decls: self,
			meta,
			params: Vec::new(),
			debug_only: false,
		}
	}
}

/// Builder for one command declaration. Nothing is recorded until
/// [`CommandBuilder::handler`] is called.
#[must_use = "a command is only declared once `handler` is called"]
pub struct CommandBuilder<'d, T> {
	decls: &'d mut Declarations<T>,
	meta: CommandMeta,
	params: Vec<ParamSpec>,
	cooldown: Option<CooldownSpec>,
	confirmation: Option<ConfirmationSpec>,
	options: Vec<OptionSpec>,
	flags: Vec<FlagSpec>,
	debug_only: bool,
}

impl<T: CommandSet> CommandBuilder<'_, T> {
	pub fn param(mut self, spec: ParamSpec) -> Self {
		self.params.push(spec);
		self
	}

	pub fn cooldown(mut self, spec: CooldownSpec) -> Self {
		self.cooldown = Some(spec);
		self
	}

	pub fn confirmation(mut self, spec: ConfirmationSpec) -> Self {
		self.confirmation = Some(spec);
		self
	}

	pub fn option(mut self, spec: OptionSpec) -> Self {
		self.options.push(spec);
		self
	}

	pub fn flag(mut self, spec: FlagSpec) -> Self {
		self.flags.push(spec);
		self
	}

	/// Only register this command when the debug option is on.
	pub fn debug_only(mut self) -> Self {
		self.debug_only = true;
		self
	}

	pub fn handler<F>(self, f: F)
	where
		F: Fn(&T, &CommandArguments, &mut Params) -> HandlerResult + Send + Sync + 'static,
	{
		let owner = self.decls.owner.clone();
		let handler: CommandFn =
			Arc::new(move |args: &CommandArguments, params: &mut Params| f(&*owner, args, params));
		self.decls.commands.push(CommandDecl {
			meta: self.meta,
			binding: CommandBinding {
				handler,
				params: self.params,
				cooldown: self.cooldown,
				confirmation: self.confirmation,
				options: self.options,
				flags: self.flags,
			},
			debug_only: self.debug_only,
		});
	}
}

#[must_use = "a completer is only declared once `handler` is called"]
pub struct CompleterBuilder<'d, T> {
	decls: &'d mut Declarations<T>,
	meta: CompleterMeta,
	params: Vec<ParamSpec>,
	debug_only: bool,
}

impl<T: CommandSet> CompleterBuilder<'_, T> {
	pub fn param(mut self, spec: ParamSpec) -> Self {
		self.params.push(spec);
		self
	}

	pub fn debug_only(mut self) -> Self {
		self.debug_only = true;
		self
	}

	pub fn handler<F>(self, f: F)
	where
		F: Fn(&T, &CommandArguments, &mut Params) -> HandlerResult<Vec<String>> + Send + Sync + 'static,
	{
		let owner = self.decls.owner.clone();
		let handler: CompleterFn =
			Arc::new(move |args: &CommandArguments, params: &mut Params| f(&*owner, args, params));
		self.decls.completers.push(CompleterDecl {
			meta: self.meta,
			binding: CompleterBinding {
				handler,
				params: self.params,
			},
			debug_only: self.debug_only,
		});
	}
}
