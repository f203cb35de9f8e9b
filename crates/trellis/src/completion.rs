use crate::arguments::CommandArguments;
use crate::utils::copy_partial_matches;

/// Filters completion candidates against what the actor has typed so far.
///
/// Completion handlers receive one through the built-in provider by
/// declaring a `ParamSpec::of::<CompleterHelper>()` parameter.
#[derive(Debug, Clone)]
pub struct CompleterHelper {
	arguments: Vec<String>,
}

impl CompleterHelper {
	pub fn new(args: &CommandArguments) -> Self {
		Self {
			arguments: args.arguments().to_vec(),
		}
	}

	/// Candidates matching the argument at `index`, or all of them when that
	/// argument has not been typed yet.
	pub fn copy_matches<I, S>(&self, index: usize, candidates: I) -> Vec<String>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let token = self.arguments.get(index).map(String::as_str).unwrap_or("");
		copy_partial_matches(token, candidates)
	}

	pub fn copy_matches_token<I, S>(&self, token: &str, candidates: I) -> Vec<String>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		copy_partial_matches(token, candidates)
	}

	/// Index of the argument being completed.
	pub fn current_index(&self) -> usize {
		self.arguments.len().saturating_sub(1)
	}

	pub fn current_token(&self) -> &str {
		self.arguments.last().map(String::as_str).unwrap_or("")
	}
}
