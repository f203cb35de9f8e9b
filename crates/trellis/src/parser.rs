//! `--key=value` options and `--flag` switches pulled out of the
//! effective arguments.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::meta::FlagSpec;
use crate::meta::OptionSpec;

/// What the parser extracted from one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
	pub options: HashMap<String, Vec<String>>,
	pub flags: HashSet<String>,
	/// Tokens that were neither an option nor a flag, in order.
	pub remaining: Vec<String>,
}

/// Single-pass parser over a private copy of the effective arguments.
pub struct OptionParser<'a> {
	options: &'a [OptionSpec],
	flags: &'a [FlagSpec],
}

impl<'a> OptionParser<'a> {
	pub fn new(options: &'a [OptionSpec], flags: &'a [FlagSpec]) -> Self {
		Self { options, flags }
	}

	pub fn parse<S: AsRef<str>>(&self, arguments: &[S]) -> ParsedOptions {
		let mut remaining: Vec<String> = arguments
			.iter()
			.map(|s| s.as_ref().to_string())
			.collect();
		let mut parsed = ParsedOptions::default();

		for spec in self.options {
			let head = format!("{}{}{}", spec.prefix, spec.key, spec.key_separator);
			let Some(position) = remaining.iter().position(|t| t.starts_with(&head)) else {
				continue;
			};
			let token = remaining.remove(position);
			let raw = &token[head.len()..];
			let values = if spec.allow_separating && !spec.value_separator.is_empty() && !raw.is_empty() {
				split_values(raw, &spec.value_separator)
			} else {
				vec![raw.to_string()]
			};
			parsed.options.insert(spec.key.clone(), values);
		}

		for spec in self.flags {
			for name in &spec.names {
				let wanted = format!("{}{}", spec.prefix, name);
				let before = remaining.len();
				remaining.retain(|t| *t != wanted);
				if remaining.len() != before {
					parsed.flags.insert(name.clone());
				}
			}
		}

		parsed.remaining = remaining;
		parsed
	}
}

/// Interior empty pieces are kept, trailing ones dropped.
fn split_values(raw: &str, separator: &str) -> Vec<String> {
	let mut values: Vec<String> = raw.split(separator).map(str::to_string).collect();
	while values.len() > 1 && values.last().is_some_and(String::is_empty) {
		values.pop();
	}
	values
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn parse(options: &[OptionSpec], flags: &[FlagSpec], tokens: &[&str]) -> ParsedOptions {
		OptionParser::new(options, flags).parse(tokens)
	}

	#[test]
	fn test_option_split_and_removed() {
		let parsed = parse(
			&[OptionSpec::new("players")],
			&[],
			&["first", "--players=alice,bob", "last"],
		);
		assert_eq!(
			parsed.options.get("players"),
			Some(&vec!["alice".to_string(), "bob".to_string()])
		);
		assert_eq!(parsed.remaining, vec!["first", "last"]);
	}

	#[test]
	fn test_flags_only_declared_names() {
		let parsed = parse(
			&[],
			&[FlagSpec::new(["verbose"])],
			&["--verbose", "--nogui"],
		);
		assert_eq!(parsed.flags, HashSet::from(["verbose".to_string()]));
		assert_eq!(parsed.remaining, vec!["--nogui"]);
	}

	#[rstest]
	#[case::no_separating(OptionSpec::new("msg").no_separating(), "--msg=a,b", vec!["a,b"])]
	#[case::custom_separators(
		OptionSpec::new("ids").prefix("-").key_separator(":").value_separator(";"),
		"-ids:1;2;3",
		vec!["1", "2", "3"]
	)]
	#[case::empty_value(OptionSpec::new("tags"), "--tags=", vec![""])]
	#[case::empty_pieces(OptionSpec::new("tags"), "--tags=a,,b,", vec!["a", "", "b"])]
	#[case::no_separating_empty(OptionSpec::new("msg").no_separating(), "--msg=", vec![""])]
	fn test_option_variants(
		#[case] spec: OptionSpec,
		#[case] token: &str,
		#[case] expected: Vec<&str>,
	) {
		let key = spec.key.clone();
		let parsed = parse(&[spec], &[], &[token]);
		let values = parsed.options.get(&key).expect("option present");
		assert_eq!(values, &expected);
		assert!(parsed.remaining.is_empty());
	}

	#[test]
	fn test_first_match_wins() {
		let parsed = parse(
			&[OptionSpec::new("to")],
			&[],
			&["--to=alice", "--to=bob"],
		);
		assert_eq!(parsed.options["to"], vec!["alice".to_string()]);
		assert_eq!(parsed.remaining, vec!["--to=bob"]);
	}

	#[test]
	fn test_unset_is_distinct_from_empty() {
		let parsed = parse(
			&[OptionSpec::new("tags"), OptionSpec::new("mode")],
			&[],
			&["--tags="],
		);
		assert_eq!(parsed.options.get("tags"), Some(&Vec::new()));
		assert!(!parsed.options.contains_key("mode"));
	}

	#[test]
	fn test_key_must_be_followed_by_separator() {
		let parsed = parse(&[OptionSpec::new("to")], &[], &["--town=x", "--to"]);
		assert!(parsed.options.is_empty());
		assert_eq!(parsed.remaining.len(), 2);
	}

	#[test]
	fn test_flag_group_with_prefix() {
		let parsed = parse(
			&[],
			&[FlagSpec::new(["s", "f"]).prefix("-")],
			&["-s", "x", "-f", "--s"],
		);
		assert_eq!(parsed.flags.len(), 2);
		assert_eq!(parsed.remaining, vec!["x", "--s"]);
	}
}
