//! The per-invocation context handed to handlers and providers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::cooldown::CooldownManager;
use crate::error::FrameworkError;
use crate::host::Actor;
use crate::host::ActorKind;
use crate::message::Message;
use crate::meta::CommandMeta;
use crate::meta::CooldownSpec;
use crate::options::FrameworkOption;
use crate::options::Settings;
use crate::parser::ParsedOptions;
use crate::utils;

#[derive(Clone)]
struct CooldownHandle {
	manager: Arc<CooldownManager>,
	spec: CooldownSpec,
}

/// Everything a handler knows about the invocation it is serving.
///
/// `arguments` are the effective arguments: routing tokens stripped,
/// options and flags still in place so positional indices match what the
/// actor typed. Parsed options and flags are exposed separately.
#[derive(Clone)]
pub struct CommandArguments {
	sender: Arc<dyn Actor>,
	meta: Arc<CommandMeta>,
	label: String,
	arguments: Vec<String>,
	parsed: Option<ParsedOptions>,
	settings: Arc<Settings>,
	cooldown: Option<CooldownHandle>,
}

impl CommandArguments {
	/// A context outside of dispatch, with neutral metadata named after
	/// `label` and default settings.
	pub fn new(sender: Arc<dyn Actor>, label: impl Into<String>, arguments: Vec<String>) -> Self {
		let label = label.into();
		Self {
			sender,
			meta: Arc::new(CommandMeta::placeholder(label.clone())),
			label,
			arguments,
			parsed: None,
			settings: Arc::new(Settings::default()),
			cooldown: None,
		}
	}

	pub(crate) fn for_dispatch(
		sender: Arc<dyn Actor>,
		meta: Arc<CommandMeta>,
		label: &str,
		arguments: Vec<String>,
		settings: Arc<Settings>,
	) -> Self {
		Self {
			sender,
			meta,
			label: label.to_string(),
			arguments,
			parsed: None,
			settings,
			cooldown: None,
		}
	}

	pub(crate) fn with_parsed(mut self, parsed: ParsedOptions) -> Self {
		self.parsed = Some(parsed);
		self
	}

	pub(crate) fn with_cooldown(mut self, manager: Arc<CooldownManager>, spec: CooldownSpec) -> Self {
		self.cooldown = Some(CooldownHandle { manager, spec });
		self
	}

	pub fn sender(&self) -> &Arc<dyn Actor> {
		&self.sender
	}

	pub fn meta(&self) -> &CommandMeta {
		&self.meta
	}

	/// The root label as typed by the actor.
	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn arguments(&self) -> &[String] {
		&self.arguments
	}

	/// Effective arguments minus every parsed option and flag token.
	pub fn remaining(&self) -> &[String] {
		match &self.parsed {
			Some(parsed) => &parsed.remaining,
			None => &self.arguments,
		}
	}

	pub fn argument(&self, index: usize) -> Option<&str> {
		self.arguments.get(index).map(String::as_str)
	}

	pub fn argument_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
		self.argument(index).unwrap_or(default)
	}

	pub fn first(&self) -> Option<&str> {
		self.argument(0)
	}

	pub fn last(&self) -> Option<&str> {
		self.arguments.last().map(String::as_str)
	}

	pub fn argument_as<T: FromStr>(&self, index: usize) -> Option<T> {
		self.argument(index)?.parse().ok()
	}

	pub fn argument_as_i32(&self, index: usize) -> i32 {
		utils::parse_or_default(self.argument(index))
	}

	pub fn argument_as_i64(&self, index: usize) -> i64 {
		utils::parse_or_default(self.argument(index))
	}

	pub fn argument_as_f32(&self, index: usize) -> f32 {
		utils::parse_or_default(self.argument(index))
	}

	pub fn argument_as_f64(&self, index: usize) -> f64 {
		utils::parse_or_default(self.argument(index))
	}

	/// `true` only for a case-insensitive `"true"`.
	pub fn argument_as_bool(&self, index: usize) -> bool {
		self.argument(index)
			.is_some_and(|s| s.eq_ignore_ascii_case("true"))
	}

	pub fn is_empty(&self) -> bool {
		self.arguments.is_empty()
	}

	pub fn len(&self) -> usize {
		self.arguments.len()
	}

	pub fn concat_arguments(&self) -> String {
		self.arguments.join(" ")
	}

	/// Join `arguments[from..to]` with spaces. Bounds are clamped.
	pub fn concat_range(&self, from: usize, to: usize) -> String {
		let to = to.min(self.arguments.len());
		if from >= to {
			return String::new();
		}
		self.arguments[from..to].join(" ")
	}

	pub fn is_numeric(&self, index: usize) -> bool {
		self.argument(index).is_some_and(utils::is_numeric)
	}

	pub fn is_integer(&self, index: usize) -> bool {
		self.argument(index).is_some_and(utils::is_integer)
	}

	pub fn is_floating_decimal(&self, index: usize) -> bool {
		self.argument(index).is_some_and(utils::is_floating_decimal)
	}

	pub fn send_message(&self, message: &str) {
		self.sender.send_message(message);
	}

	/// Send `template` with `{0}`, `{1}`, ... replaced by `params`.
	pub fn send_formatted(&self, template: &str, params: &[&dyn fmt::Display]) {
		self.sender
			.send_message(&utils::format_indexed(template, params));
	}

	/// Send one of the framework messages as currently configured.
	pub fn send(&self, message: Message) {
		let text = self.settings.messages.render(message, &self.meta.usage);
		self.sender.send_message(text);
	}

	pub fn is_sender_console(&self) -> bool {
		self.sender.kind() == ActorKind::Console
	}

	pub fn is_sender_interactive(&self) -> bool {
		self.sender.kind() == ActorKind::Interactive
	}

	pub fn has_permission(&self, permission: &str) -> bool {
		self.sender.has_permission(permission)
	}

	/// Values of a parsed option. `Some(&[])` means present with no value.
	pub fn option(&self, key: &str) -> Option<&[String]> {
		self.parsed
			.as_ref()?
			.options
			.get(key)
			.map(Vec::as_slice)
	}

	/// First value of a parsed option.
	pub fn find_option(&self, key: &str) -> Option<&str> {
		self.option(key)?.first().map(String::as_str)
	}

	pub fn is_flag_present(&self, flag: &str) -> bool {
		self.parsed
			.as_ref()
			.is_some_and(|parsed| parsed.flags.contains(flag))
	}

	/// Cooperative cooldown check for handlers running with
	/// [`FrameworkOption::CustomCooldownChecker`].
	///
	/// Opens a window when none is live. When one is, the actor is told to
	/// wait and [`FrameworkError::CooldownActive`] is returned; propagating it
	/// with `?` ends the handler without an error being logged.
	pub fn check_cooldown(&self) -> Result<(), FrameworkError> {
		if !self
			.settings
			.is_enabled(FrameworkOption::CustomCooldownChecker)
		{
			return Err(FrameworkError::CustomCooldownCheckerDisabled);
		}
		let Some(handle) = &self.cooldown else {
			return Ok(());
		};
		if handle
			.manager
			.has_cooldown(self.sender.as_ref(), &self.meta.name, &handle.spec)
		{
			self.send(Message::WaitBeforeUsingAgain);
			return Err(FrameworkError::CooldownActive);
		}
		Ok(())
	}
}

impl fmt::Debug for CommandArguments {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CommandArguments")
			.field("sender", &self.sender.id())
			.field("command", &self.meta.name)
			.field("label", &self.label)
			.field("arguments", &self.arguments)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rstest::rstest;

	use super::*;
	use crate::options::OptionSet;
	use crate::testing::RecordingActor;

	fn args(tokens: &[&str]) -> CommandArguments {
		CommandArguments::new(
			Arc::new(RecordingActor::interactive("alice")),
			"pay",
			tokens.iter().map(|s| s.to_string()).collect(),
		)
	}

	#[test]
	fn test_positional_access() {
		let a = args(&["bob", "12", "true"]);
		assert_eq!(a.len(), 3);
		assert_eq!(a.first(), Some("bob"));
		assert_eq!(a.last(), Some("true"));
		assert_eq!(a.argument(3), None);
		assert_eq!(a.argument_or(3, "none"), "none");
		assert_eq!(a.argument_as::<u8>(1), Some(12));
		assert_eq!(a.argument_as::<u8>(0), None);
		assert!(a.argument_as_bool(2));
		assert!(!a.argument_as_bool(0));

		let empty = args(&[]);
		assert!(empty.is_empty());
		assert_eq!(empty.first(), None);
		assert_eq!(empty.last(), None);
	}

	#[rstest]
	#[case(0, 0, 0.0)]
	#[case(1, 12, 12.0)]
	#[case(2, 0, 2.5)]
	#[case(9, 0, 0.0)]
	fn test_numeric_conversions(#[case] index: usize, #[case] int: i32, #[case] float: f64) {
		let a = args(&["bob", "12", "2.5"]);
		assert_eq!(a.argument_as_i32(index), int);
		assert_eq!(a.argument_as_i64(index), int as i64);
		assert_eq!(a.argument_as_f64(index), float);
		assert_eq!(a.argument_as_f32(index), float as f32);
	}

	#[rstest]
	#[case(0, 5, "a b c d")]
	#[case(1, 3, "b c")]
	#[case(3, 1, "")]
	#[case(9, 12, "")]
	fn test_concat_range(#[case] from: usize, #[case] to: usize, #[case] expected: &str) {
		let a = args(&["a", "b", "c", "d"]);
		assert_eq!(a.concat_range(from, to), expected);
		assert_eq!(a.concat_arguments(), "a b c d");
	}

	#[test]
	fn test_predicates() {
		let a = args(&["12", "-3", "1.5", "x"]);
		assert!(a.is_numeric(0));
		assert!(!a.is_numeric(1));
		assert!(a.is_integer(1));
		assert!(!a.is_integer(2));
		assert!(a.is_floating_decimal(2));
		assert!(!a.is_floating_decimal(3));
		assert!(!a.is_numeric(7));
	}

	#[test]
	fn test_options_and_flags() {
		let parsed = ParsedOptions {
			options: [("to".to_string(), vec!["bob".to_string()]), ("tags".to_string(), vec![String::new()])]
				.into_iter()
				.collect(),
			flags: HashSet::from(["silent".to_string()]),
			remaining: vec!["10".to_string()],
		};
		let a = args(&["--to=bob", "10", "--tags=", "--silent"]).with_parsed(parsed);

		assert_eq!(a.find_option("to"), Some("bob"));
		assert_eq!(a.option("tags"), Some(&[String::new()][..]));
		assert_eq!(a.find_option("tags"), Some(""));
		assert_eq!(a.option("mode"), None);
		assert!(a.is_flag_present("silent"));
		assert!(!a.is_flag_present("loud"));
		assert_eq!(a.argument(1), Some("10"));
		assert_eq!(a.remaining(), ["10".to_string()]);

		let plain = args(&["x"]);
		assert_eq!(plain.option("to"), None);
		assert_eq!(plain.remaining(), ["x".to_string()]);
	}

	#[test]
	fn test_messages() {
		let actor = Arc::new(RecordingActor::interactive("alice"));
		let meta = Arc::new(CommandMeta::new("pay").usage("/pay <who> <amount>"));
		let a = CommandArguments::for_dispatch(
			actor.clone(),
			meta,
			"pay",
			vec![],
			Arc::new(Settings::default()),
		);

		a.send(Message::ShortArgSize);
		a.send(Message::NoPermission);
		a.send_formatted("Paid {0} to {1}", &[&5, &"bob"]);

		assert_eq!(
			actor.messages(),
			vec![
				"/pay <who> <amount>",
				Message::NoPermission.default_text(),
				"Paid 5 to bob",
			]
		);
		assert!(a.is_sender_interactive());
		assert!(!a.is_sender_console());
	}

	#[test]
	fn test_check_cooldown_requires_option() {
		let a = args(&[]);
		assert_eq!(
			a.check_cooldown(),
			Err(FrameworkError::CustomCooldownCheckerDisabled)
		);
	}

	#[test]
	fn test_check_cooldown_cooperative() {
		let actor = Arc::new(RecordingActor::interactive("alice"));
		let settings = Settings {
			options: OptionSet::from_iter([FrameworkOption::CustomCooldownChecker]),
			..Settings::default()
		};
		let manager = Arc::new(CooldownManager::new());
		let a = CommandArguments::for_dispatch(
			actor.clone(),
			Arc::new(CommandMeta::new("heal")),
			"heal",
			vec![],
			Arc::new(settings),
		)
		.with_cooldown(manager, CooldownSpec::seconds(60));

		assert_eq!(a.check_cooldown(), Ok(()));
		assert_eq!(a.check_cooldown(), Err(FrameworkError::CooldownActive));
		assert_eq!(
			actor.messages(),
			vec![Message::WaitBeforeUsingAgain.default_text()]
		);
	}
}
