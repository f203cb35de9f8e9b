//! The context object tying the registry, the resolver and the gates
//! together, plus the dispatch pipeline itself.

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::debug;
use log::error;

use crate::arguments::CommandArguments;
use crate::clock::Clock;
use crate::config::FrameworkConfig;
use crate::confirmation::ConfirmationManager;
use crate::cooldown::CooldownManager;
use crate::declare::CommandSet;
use crate::declare::Declarations;
use crate::error::FrameworkError;
use crate::error::HandlerError;
use crate::error::HandlerResult;
use crate::host::Actor;
use crate::host::ActorKind;
use crate::host::HostPlatform;
use crate::host::Scheduler;
use crate::message::Message;
use crate::meta::CommandMeta;
use crate::meta::SenderRestriction;
use crate::options::FrameworkOption;
use crate::options::Settings;
use crate::params::ParameterResolver;
use crate::parser::OptionParser;
use crate::registry::CommandRegistry;

/// Why an invocation stopped before reaching its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
	/// A validation check failed; the message was sent to the actor.
	Check(Message),
	/// The confirmation prompt was sent.
	AwaitingConfirmation,
	/// The actor was told to wait.
	OnCooldown,
}

/// What [`CommandFramework::execute`] did with an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	/// The handler ran to completion, or stopped on the cooldown sentinel.
	Executed,
	/// The handler returned an error, which was logged.
	Failed,
	/// The handler was handed to the scheduler.
	Deferred,
	Rejected(Rejection),
	/// A synthesized parent was invoked; nothing to run.
	Placeholder,
	/// No command is registered under the label.
	Unmatched,
}

impl DispatchOutcome {
	/// Whether the host should treat the input as a known command.
	pub fn is_handled(&self) -> bool {
		!matches!(self, DispatchOutcome::Unmatched)
	}
}

/// One framework instance per host application.
pub struct CommandFramework {
	registry: CommandRegistry,
	resolver: ParameterResolver,
	cooldowns: Arc<CooldownManager>,
	confirmations: ConfirmationManager,
	settings: ArcSwap<Settings>,
	host: Arc<dyn HostPlatform>,
	scheduler: Arc<dyn Scheduler>,
}

impl CommandFramework {
	pub fn new(host: Arc<dyn HostPlatform>, scheduler: Arc<dyn Scheduler>) -> Self {
		Self {
			registry: CommandRegistry::new(),
			resolver: ParameterResolver::new(),
			cooldowns: Arc::new(CooldownManager::new()),
			confirmations: ConfirmationManager::new(),
			settings: ArcSwap::from_pointee(Settings::default()),
			host,
			scheduler,
		}
	}

	/// Build a framework whose options and messages come from `config`.
	pub fn from_config(
		config: &FrameworkConfig,
		host: Arc<dyn HostPlatform>,
		scheduler: Arc<dyn Scheduler>,
	) -> Self {
		Self::new(host, scheduler).with_settings(config.settings())
	}

	pub fn with_settings(self, settings: Settings) -> Self {
		self.settings.store(Arc::new(settings));
		self
	}

	/// Drive cooldowns and confirmations from `clock`.
	///
	/// Any window recorded so far is dropped.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.cooldowns = Arc::new(CooldownManager::with_clock(clock.clone()));
		self.confirmations = ConfirmationManager::with_clock(clock);
		self
	}

	/// Register every handler `instance` declares, then verify the hierarchy.
	pub fn register<T: CommandSet>(&mut self, instance: T) {
		self.register_arc(Arc::new(instance));
	}

	pub fn register_arc<T: CommandSet>(&mut self, instance: Arc<T>) {
		let mut decls = Declarations::new(instance);
		T::declare(&mut decls);

		let owner = decls.owner();
		let debug_enabled = self.is_option_enabled(FrameworkOption::Debug);

		for decl in decls.commands {
			if decl.debug_only && !debug_enabled {
				debug!("Skipping debug-only command '{}'", decl.meta.name);
				continue;
			}
			self.registry
				.register_command(decl.meta, decl.binding, owner.clone());
		}
		for decl in decls.completers {
			if decl.debug_only && !debug_enabled {
				debug!("Skipping debug-only completer '{}'", decl.meta.name);
				continue;
			}
			self.registry
				.register_completer(decl.meta, decl.binding, owner.clone());
		}

		self.registry.verify_hierarchy(self.host.as_ref());
	}

	pub fn unregister(&mut self, root: &str) -> bool {
		self.registry.unregister(root, self.host.as_ref())
	}

	pub fn unregister_all(&mut self) -> usize {
		self.registry.unregister_all(self.host.as_ref())
	}

	pub fn registry(&self) -> &CommandRegistry {
		&self.registry
	}

	/// See [`ParameterResolver::add_provider`].
	pub fn add_provider<T, F>(&mut self, key: impl Into<String>, provider: F) -> Result<(), FrameworkError>
	where
		T: std::any::Any + Send,
		F: Fn(&CommandArguments) -> Option<T> + Send + Sync + 'static,
	{
		self.resolver.add_provider(key, provider)
	}

	pub fn add_type_provider<T, F>(&mut self, provider: F) -> Result<(), FrameworkError>
	where
		T: std::any::Any + Send,
		F: Fn(&CommandArguments) -> Option<T> + Send + Sync + 'static,
	{
		self.resolver.add_type_provider(provider)
	}

	/// The settings snapshot current right now.
	pub fn settings(&self) -> Arc<Settings> {
		self.settings.load_full()
	}

	pub fn is_option_enabled(&self, option: FrameworkOption) -> bool {
		self.settings.load().is_enabled(option)
	}

	pub fn enable_option(&self, option: FrameworkOption) {
		self.update_settings(|s| s.options.enable(option));
	}

	pub fn disable_option(&self, option: FrameworkOption) {
		self.update_settings(|s| s.options.disable(option));
	}

	pub fn set_message(&self, message: Message, text: impl Into<String>) {
		let text = text.into();
		self.update_settings(|s| s.messages.set(message, text.clone()));
	}

	fn update_settings<F: Fn(&mut Settings)>(&self, change: F) {
		self.settings.rcu(|current| {
			let mut next = Settings::clone(current);
			change(&mut next);
			next
		});
	}

	pub fn cooldowns(&self) -> &Arc<CooldownManager> {
		&self.cooldowns
	}

	pub fn confirmations(&self) -> &ConfirmationManager {
		&self.confirmations
	}

	/// Drop dead cooldown and confirmation entries.
	pub fn purge_expired(&self) -> usize {
		self.cooldowns.purge_expired() + self.confirmations.purge_expired()
	}

	/// Route one invocation and run it through the pipeline.
	///
	/// Rejections and handler failures are reported through the outcome.
	/// Only configuration errors come back as `Err`.
	pub fn execute<S: AsRef<str>>(
		&self,
		sender: Arc<dyn Actor>,
		label: &str,
		tokens: &[S],
	) -> Result<DispatchOutcome, FrameworkError> {
		let Some(member) = self.registry.matcher().command(label, tokens) else {
			return Ok(DispatchOutcome::Unmatched);
		};
		let meta = member.meta().clone();
		let settings = self.settings.load_full();
		let arguments = effective_arguments(meta.depth(), tokens);

		if let Err(message) = validate(&meta, sender.as_ref(), arguments.len()) {
			sender.send_message(settings.messages.render(message, &meta.usage));
			return Ok(DispatchOutcome::Rejected(Rejection::Check(message)));
		}

		let Some(binding) = member.binding().cloned() else {
			return Ok(DispatchOutcome::Placeholder);
		};

		if settings.is_enabled(FrameworkOption::Confirmations) {
			if let Some(spec) = &binding.confirmation {
				if self
					.confirmations
					.requires_confirmation(sender.as_ref(), &meta.name, spec)
				{
					return Ok(DispatchOutcome::Rejected(Rejection::AwaitingConfirmation));
				}
			}
		}

		if !settings.is_enabled(FrameworkOption::CustomCooldownChecker) {
			if let Some(spec) = &binding.cooldown {
				if self
					.cooldowns
					.has_cooldown(sender.as_ref(), &meta.name, spec)
				{
					sender.send_message(
						settings
							.messages
							.render(Message::WaitBeforeUsingAgain, &meta.usage),
					);
					return Ok(DispatchOutcome::Rejected(Rejection::OnCooldown));
				}
			}
		}

		let mut args = CommandArguments::for_dispatch(
			sender.clone(),
			meta.clone(),
			label,
			arguments,
			settings,
		);
		if let Some(spec) = &binding.cooldown {
			args = args.with_cooldown(self.cooldowns.clone(), spec.clone());
		}
		if binding.parses_options() {
			let parsed = OptionParser::new(&binding.options, &binding.flags).parse(args.arguments());
			args = args.with_parsed(parsed);
		}

		let mut params = self.resolver.resolve(&meta.name, &binding.params, &args)?;
		let raw: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();

		if meta.asynchronous {
			let label = label.to_string();
			self.scheduler.submit(Box::new(move || {
				if let Err(e) = contain(|| (binding.handler)(&args, &mut params)) {
					report_failure(&meta, &label, &raw, args.sender().as_ref(), &e);
				}
			}));
			return Ok(DispatchOutcome::Deferred);
		}

		match contain(|| (binding.handler)(&args, &mut params)) {
			Ok(()) => Ok(DispatchOutcome::Executed),
			Err(e) if FrameworkError::is_cooldown_sentinel(e.as_ref()) => Ok(DispatchOutcome::Executed),
			Err(e) => {
				report_failure(&meta, label, &raw, sender.as_ref(), &e);
				Ok(DispatchOutcome::Failed)
			}
		}
	}

	/// Ask the matching completer for candidates.
	///
	/// Returns `None` when nothing matches, the actor lacks the completer's
	/// permission, or the completer fails.
	pub fn complete<S: AsRef<str>>(
		&self,
		sender: Arc<dyn Actor>,
		label: &str,
		tokens: &[S],
	) -> Option<Vec<String>> {
		let completer = self.registry.matcher().completer(label, tokens)?;
		let meta = completer.meta();
		if !meta.permission.is_empty() && !sender.has_permission(&meta.permission) {
			return None;
		}

		let args = CommandArguments::for_dispatch(
			sender.clone(),
			Arc::new(CommandMeta::placeholder(meta.name.clone())),
			label,
			effective_arguments(meta.depth(), tokens),
			self.settings.load_full(),
		);
		let binding = completer.binding();
		let result = self
			.resolver
			.resolve(&meta.name, &binding.params, &args)
			.map_err(HandlerError::from)
			.and_then(|mut params| contain(|| (binding.handler)(&args, &mut params)));

		match result {
			Ok(candidates) => Some(candidates),
			Err(e) => {
				error!(
					"Completer '{}' failed (label '{}', arguments {:?}, actor '{}'): {}",
					meta.name,
					label,
					tokens.iter().map(AsRef::as_ref).collect::<Vec<&str>>(),
					sender.id(),
					e
				);
				None
			}
		}
	}
}

/// Run a handler call, turning a panic into an ordinary failure.
fn contain<T>(call: impl FnOnce() -> HandlerResult<T>) -> HandlerResult<T> {
	panic::catch_unwind(AssertUnwindSafe(call))
		.unwrap_or_else(|payload| Err(FrameworkError::HandlerPanicked(panic_message(payload.as_ref())).into()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(text) = payload.downcast_ref::<&str>() {
		text.to_string()
	} else if let Some(text) = payload.downcast_ref::<String>() {
		text.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

/// Tokens left once the routing tokens of a `depth`-segment path are gone.
fn effective_arguments<S: AsRef<str>>(depth: usize, tokens: &[S]) -> Vec<String> {
	tokens
		.iter()
		.skip(depth.saturating_sub(1))
		.map(|t| t.as_ref().to_string())
		.collect()
}

/// Operator, permission, sender kind and argument count, in that order.
fn validate(meta: &CommandMeta, sender: &dyn Actor, arg_count: usize) -> Result<(), Message> {
	if meta.operator_only && !sender.is_operator() {
		return Err(Message::MustBeOperator);
	}
	if !meta.permission.is_empty() && !sender.has_permission(&meta.permission) {
		return Err(Message::NoPermission);
	}
	match (meta.sender, sender.kind()) {
		(SenderRestriction::InteractiveOnly, ActorKind::Console) => {
			return Err(Message::OnlyInteractive);
		}
		(SenderRestriction::ConsoleOnly, ActorKind::Interactive) => {
			return Err(Message::OnlyConsole);
		}
		_ => {}
	}
	meta.validate_arg_count(arg_count)
}

fn report_failure(meta: &CommandMeta, label: &str, raw: &[String], sender: &dyn Actor, err: &HandlerError) {
	if FrameworkError::is_cooldown_sentinel(err.as_ref()) {
		return;
	}
	error!(
		"Command '{}' failed (label '{}', arguments {:?}, actor '{}'): {}",
		meta.name,
		label,
		raw,
		sender.id(),
		err
	);
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::testing::RecordingActor;

	#[rstest]
	#[case(1, &["a", "b"], &["a", "b"])]
	#[case(2, &["kick", "bob"], &["bob"])]
	#[case(3, &["member"], &[])]
	#[case(1, &[], &[])]
	fn test_effective_arguments(
		#[case] depth: usize,
		#[case] tokens: &[&str],
		#[case] expected: &[&str],
	) {
		assert_eq!(effective_arguments(depth, tokens), expected);
	}

	#[rstest]
	#[case::operator(CommandMeta::new("stop").operator_only(), Some(Message::MustBeOperator))]
	#[case::permission(CommandMeta::new("ban").permission("mod.ban"), Some(Message::NoPermission))]
	#[case::console_only(
		CommandMeta::new("reload").sender(SenderRestriction::ConsoleOnly),
		Some(Message::OnlyConsole)
	)]
	#[case::too_few(CommandMeta::new("pay").min_args(2), Some(Message::ShortArgSize))]
	#[case::too_many(CommandMeta::new("pay").max_args(0), Some(Message::LongArgSize))]
	#[case::ok(CommandMeta::new("pay").min_args(1).max_args(1), None)]
	fn test_validate_interactive(#[case] meta: CommandMeta, #[case] expected: Option<Message>) {
		let alice = RecordingActor::interactive("alice");
		assert_eq!(validate(&meta, &alice, 1).err(), expected);
	}

	#[test]
	fn test_validate_order_operator_before_permission() {
		let meta = CommandMeta::new("stop")
			.operator_only()
			.permission("server.stop")
			.sender(SenderRestriction::ConsoleOnly);
		let alice = RecordingActor::interactive("alice").with_permission("server.stop");
		assert_eq!(validate(&meta, &alice, 0), Err(Message::MustBeOperator));

		let console = RecordingActor::console();
		assert_eq!(validate(&meta, &console, 0), Ok(()));

		let meta = CommandMeta::new("fly").sender(SenderRestriction::InteractiveOnly);
		assert_eq!(validate(&meta, &console, 0), Err(Message::OnlyInteractive));
	}

	#[test]
	fn test_outcome_handled() {
		assert!(DispatchOutcome::Placeholder.is_handled());
		assert!(DispatchOutcome::Failed.is_handled());
		assert!(DispatchOutcome::Rejected(Rejection::OnCooldown).is_handled());
		assert!(!DispatchOutcome::Unmatched.is_handled());
	}

	#[test]
	fn test_contain_turns_panics_into_errors() {
		let err = contain::<()>(|| panic!("index out of bounds")).unwrap_err();
		assert_eq!(err.to_string(), "handler panicked: index out of bounds");

		let owned = contain::<()>(|| std::panic::panic_any(format!("code {}", 7))).unwrap_err();
		assert_eq!(owned.to_string(), "handler panicked: code 7");

		assert_eq!(contain(|| Ok(3)).unwrap(), 3);
	}
}
