//! Line-oriented console loop.
//!
//! Lines starting with `:` are console builtins, lines starting with `?`
//! ask for completions, everything else is dispatched as a command with an
//! optional leading `/`.

use std::sync::Arc;

use log::debug;
use log::error;
use log::info;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use trellis::Actor;
use trellis::CommandFramework;
use trellis::DispatchOutcome;

use crate::host::ConsoleActor;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReplError {
	#[error("unknown console command ':{0}', try :help")]
	UnknownBuiltin(String),

	#[error(":{0} needs an argument")]
	MissingArgument(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Builtin {
	Help,
	Level(String),
	Purge,
	Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
	Empty,
	Builtin(Builtin),
	Complete { label: String, tokens: Vec<String> },
	Invoke { label: String, tokens: Vec<String> },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

pub fn parse_line(line: &str) -> Result<Input, ReplError> {
	let line = line.trim_start();
	if let Some(rest) = line.strip_prefix(':') {
		let mut words = rest.split_whitespace();
		let builtin = match words.next().unwrap_or("") {
			"help" | "h" => Builtin::Help,
			"quit" | "q" | "exit" => Builtin::Quit,
			"purge" => Builtin::Purge,
			"level" => Builtin::Level(
				words
					.next()
					.ok_or(ReplError::MissingArgument("level"))?
					.to_string(),
			),
			other => return Err(ReplError::UnknownBuiltin(other.to_string())),
		};
		return Ok(Input::Builtin(builtin));
	}

	if let Some(rest) = line.strip_prefix('?') {
		let mut words = split(rest);
		if words.is_empty() {
			return Ok(Input::Empty);
		}
		// A trailing space starts a new, empty token.
		if rest.ends_with(char::is_whitespace) {
			words.push(String::new());
		}
		let label = words.remove(0);
		return Ok(Input::Complete { label, tokens: words });
	}

	let mut words = split(line.strip_prefix('/').unwrap_or(line));
	if words.is_empty() {
		return Ok(Input::Empty);
	}
	let label = words.remove(0);
	Ok(Input::Invoke { label, tokens: words })
}

fn split(line: &str) -> Vec<String> {
	line.split_whitespace().map(str::to_string).collect()
}

/// Handle one line of input.
pub fn handle_line(framework: &CommandFramework, actor: &Arc<ConsoleActor>, line: &str) -> Flow {
	let input = match parse_line(line) {
		Ok(input) => input,
		Err(e) => {
			actor.send_message(&e.to_string());
			return Flow::Continue;
		}
	};

	match input {
		Input::Empty => {}
		Input::Builtin(Builtin::Quit) => return Flow::Quit,
		Input::Builtin(Builtin::Help) => {
			let mut commands = framework.registry().commands().to_vec();
			commands.sort_by(|a, b| a.name.cmp(&b.name));
			for meta in commands {
				let line = format!("/{} {}", meta.name, meta.description);
				actor.send_message(line.trim_end());
			}
		}
		Input::Builtin(Builtin::Level(level)) => match telemetry::reload_log_level(&level) {
			Ok(()) => actor.send_message(&format!("Log level set to {}.", level.to_lowercase())),
			Err(e) => actor.send_message(&e.to_string()),
		},
		Input::Builtin(Builtin::Purge) => {
			let purged = framework.purge_expired();
			actor.send_message(&format!("Purged {purged} expired entries."));
		}
		Input::Complete { label, tokens } => {
			match framework.complete(actor.clone(), &label, tokens.as_slice()) {
				Some(candidates) if !candidates.is_empty() => actor.send_message(&candidates.join("  ")),
				_ => actor.send_message("(no completions)"),
			}
		}
		Input::Invoke { label, tokens } => match framework.execute(actor.clone(), &label, tokens.as_slice()) {
			Ok(DispatchOutcome::Unmatched) => {
				actor.send_message(&format!("Unknown command '{label}'."));
			}
			Ok(outcome) => debug!("'{}' {:?} -> {:?}", label, tokens, outcome),
			Err(e) => {
				error!("Command '{}' is misconfigured: {}", label, e);
				actor.send_message("An internal error occurred.");
			}
		},
	}
	Flow::Continue
}

/// Read stdin until EOF or `:quit`.
pub async fn run(framework: Arc<CommandFramework>, actor: Arc<ConsoleActor>) -> std::io::Result<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	info!("Console ready; type :help for the command list");
	while let Some(line) = lines.next_line().await? {
		if handle_line(&framework, &actor, &line) == Flow::Quit {
			break;
		}
	}
	info!("Console closed");
	Ok(())
}
