//! Labelled trie over dot-separated command paths.

use std::collections::HashMap;

/// One level of the trie: an optional member plus children keyed by their
/// exact segment spelling.
#[derive(Debug)]
pub struct CommandNode<M> {
	member: Option<M>,
	children: HashMap<String, CommandNode<M>>,
}

impl<M> Default for CommandNode<M> {
	fn default() -> Self {
		Self {
			member: None,
			children: HashMap::new(),
		}
	}
}

impl<M> CommandNode<M> {
	pub fn member(&self) -> Option<&M> {
		self.member.as_ref()
	}

	pub fn set_member(&mut self, member: M) -> Option<M> {
		self.member.replace(member)
	}

	pub fn child(&self, segment: &str) -> Option<&CommandNode<M>> {
		self.children.get(segment)
	}

	pub fn children(&self) -> impl Iterator<Item = (&str, &CommandNode<M>)> {
		self.children.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = (&str, &mut CommandNode<M>)> {
		self.children.iter_mut().map(|(k, v)| (k.as_str(), v))
	}

	pub fn has_children(&self) -> bool {
		!self.children.is_empty()
	}

	/// A node with children but nothing bound to it.
	pub fn is_synthetic_parent(&self) -> bool {
		self.member.is_none() && self.has_children()
	}
}

/// A forest of [`CommandNode`]s, one tree per root label.
///
/// Root labels are stored lower-cased and looked up case-insensitively;
/// deeper segments keep their declared spelling.
#[derive(Debug)]
pub struct CommandTree<M> {
	roots: HashMap<String, CommandNode<M>>,
}

impl<M> Default for CommandTree<M> {
	fn default() -> Self {
		Self {
			roots: HashMap::new(),
		}
	}
}

impl<M> CommandTree<M> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Walk or create the nodes for `path` and bind `member` at its end.
	///
	/// Returns the member previously bound there, if any.
	pub fn insert(&mut self, path: &str, member: M) -> Option<M> {
		let mut segments = path.split('.');
		let root = segments.next().unwrap_or(path).to_lowercase();
		let mut node = self.roots.entry(root).or_default();
		for segment in segments {
			node = node.children.entry(segment.to_string()).or_default();
		}
		node.set_member(member)
	}

	pub fn root(&self, label: &str) -> Option<&CommandNode<M>> {
		self.roots.get(&label.to_lowercase())
	}

	pub fn contains_root(&self, label: &str) -> bool {
		self.root(label).is_some()
	}

	pub fn remove_root(&mut self, label: &str) -> Option<CommandNode<M>> {
		self.roots.remove(&label.to_lowercase())
	}

	pub fn root_labels(&self) -> Vec<String> {
		self.roots.keys().cloned().collect()
	}

	pub(crate) fn roots_mut(&mut self) -> impl Iterator<Item = (&str, &mut CommandNode<M>)> {
		self.roots.iter_mut().map(|(k, v)| (k.as_str(), v))
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}
}
