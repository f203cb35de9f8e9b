use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::message::MessageTable;

/// Framework-wide switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkOption {
	/// Turn off the automatic cooldown gate and let handlers call
	/// `CommandArguments::check_cooldown` themselves.
	CustomCooldownChecker,
	/// Enable the two-step confirmation gate.
	Confirmations,
	/// Register debug-only handlers.
	Debug,
}

/// The set of enabled options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
	enabled: BTreeSet<FrameworkOption>,
}

impl OptionSet {
	pub fn is_enabled(&self, option: FrameworkOption) -> bool {
		self.enabled.contains(&option)
	}

	pub fn enable(&mut self, option: FrameworkOption) {
		self.enabled.insert(option);
	}

	pub fn disable(&mut self, option: FrameworkOption) {
		self.enabled.remove(&option);
	}

	pub fn iter(&self) -> impl Iterator<Item = FrameworkOption> + '_ {
		self.enabled.iter().copied()
	}
}

impl FromIterator<FrameworkOption> for OptionSet {
	fn from_iter<I: IntoIterator<Item = FrameworkOption>>(iter: I) -> Self {
		Self {
			enabled: iter.into_iter().collect(),
		}
	}
}

/// Runtime settings read on every invocation.
///
/// The framework keeps these behind an `ArcSwap`; each invocation works on
/// the snapshot that was current when it started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
	pub options: OptionSet,
	pub messages: MessageTable,
}

impl Settings {
	pub fn is_enabled(&self, option: FrameworkOption) -> bool {
		self.options.is_enabled(option)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_enable_disable() {
		let mut options = OptionSet::default();
		assert!(!options.is_enabled(FrameworkOption::Debug));

		options.enable(FrameworkOption::Debug);
		options.enable(FrameworkOption::Debug);
		assert!(options.is_enabled(FrameworkOption::Debug));
		assert_eq!(options.iter().count(), 1);

		options.disable(FrameworkOption::Debug);
		assert!(!options.is_enabled(FrameworkOption::Debug));
	}

	#[test]
	fn test_deserialize_kebab_case() {
		let options: OptionSet =
			serde_json::from_str(r#"["confirmations", "custom-cooldown-checker"]"#).unwrap();
		assert!(options.is_enabled(FrameworkOption::Confirmations));
		assert!(options.is_enabled(FrameworkOption::CustomCooldownChecker));
		assert!(!options.is_enabled(FrameworkOption::Debug));
	}
}
