use crate::registry::RegisteredCompleter;
use crate::registry::RegisteredMember;
use crate::trie::CommandTree;

/// Longest-prefix lookup over the registry's tries.
pub struct CommandMatcher<'a> {
	commands: &'a CommandTree<RegisteredMember>,
	completers: &'a CommandTree<RegisteredCompleter>,
}

impl<'a> CommandMatcher<'a> {
	pub(crate) fn new(
		commands: &'a CommandTree<RegisteredMember>,
		completers: &'a CommandTree<RegisteredCompleter>,
	) -> Self {
		Self {
			commands,
			completers,
		}
	}

	/// The deepest command reachable from `label` along `tokens`.
	pub fn command<S: AsRef<str>>(&self, label: &str, tokens: &[S]) -> Option<&'a RegisteredMember> {
		find_in_tree(self.commands, label, tokens)
	}

	/// The deepest completer reachable from `label` along `tokens`.
	pub fn completer<S: AsRef<str>>(
		&self,
		label: &str,
		tokens: &[S],
	) -> Option<&'a RegisteredCompleter> {
		find_in_tree(self.completers, label, tokens)
	}
}

/// Walk `tree` from `label`, descending one exact token at a time, and
/// return the last member seen.
///
/// Walking stops at the first token with no matching child; that token and
/// everything after it are arguments. A deeper node without a member does
/// not shadow a shallower one that has one.
pub fn find_in_tree<'t, M, S: AsRef<str>>(
	tree: &'t CommandTree<M>,
	label: &str,
	tokens: &[S],
) -> Option<&'t M> {
	let mut node = tree.root(label)?;
	let mut last_match = node.member();

	for token in tokens {
		let Some(child) = node.child(token.as_ref()) else {
			break;
		};
		node = child;
		if let Some(member) = node.member() {
			last_match = Some(member);
		}
	}

	last_match
}
