use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Rejection messages sent to actors by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
	ShortArgSize,
	LongArgSize,
	OnlyInteractive,
	OnlyConsole,
	NoPermission,
	MustBeOperator,
	WaitBeforeUsingAgain,
}

impl Message {
	pub const ALL: [Message; 7] = [
		Message::ShortArgSize,
		Message::LongArgSize,
		Message::OnlyInteractive,
		Message::OnlyConsole,
		Message::NoPermission,
		Message::MustBeOperator,
		Message::WaitBeforeUsingAgain,
	];

	pub fn default_text(self) -> &'static str {
		match self {
			Message::ShortArgSize => "Required argument length is less than needed!",
			Message::LongArgSize => "Required argument length is greater than needed!",
			Message::OnlyInteractive => "This command can only be run by players!",
			Message::OnlyConsole => "This command can only be run from the console!",
			Message::NoPermission => "You don't have enough permission to execute this command!",
			Message::MustBeOperator => "You must be an operator to execute this command!",
			Message::WaitBeforeUsingAgain => "You have to wait before using this command again!",
		}
	}

	/// Argument-count messages are replaced by the command's usage text
	/// when it has one.
	pub fn prefers_usage(self) -> bool {
		matches!(self, Message::ShortArgSize | Message::LongArgSize)
	}
}

/// Message texts with optional overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTable {
	overrides: HashMap<Message, String>,
}

impl MessageTable {
	pub fn text(&self, message: Message) -> &str {
		self.overrides
			.get(&message)
			.map(String::as_str)
			.unwrap_or_else(|| message.default_text())
	}

	pub fn set(&mut self, message: Message, text: impl Into<String>) {
		self.overrides.insert(message, text.into());
	}

	pub fn reset(&mut self, message: Message) {
		self.overrides.remove(&message);
	}

	/// Resolve what an actor should see for `message` given the command's
	/// usage string.
	pub fn render<'a>(&'a self, message: Message, usage: &'a str) -> &'a str {
		if message.prefers_usage() && !usage.is_empty() {
			return usage;
		}
		self.text(message)
	}
}
