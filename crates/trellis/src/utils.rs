use std::str::FromStr;

/// Parse `text` as `T`, falling back to `T::default()` when absent or
/// malformed.
pub fn parse_or_default<T: FromStr + Default>(text: Option<&str>) -> T {
	text.and_then(|s| s.parse::<T>().ok()).unwrap_or_default()
}

/// Non-empty and made of ASCII digits only.
pub fn is_numeric(text: &str) -> bool {
	!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_integer(text: &str) -> bool {
	text.parse::<i32>().is_ok()
}

pub fn is_floating_decimal(text: &str) -> bool {
	text.parse::<f64>().is_ok()
}

/// Replace `{0}`, `{1}`, ... in `template` with the matching parameter.
/// Placeholders without a parameter are left untouched.
pub fn format_indexed(template: &str, params: &[&dyn std::fmt::Display]) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);
		let after = &rest[open + 1..];
		let Some(close) = after.find('}') else {
			out.push_str(&rest[open..]);
			return out;
		};
		match after[..close].parse::<usize>().ok().and_then(|i| params.get(i)) {
			Some(param) => out.push_str(&param.to_string()),
			None => out.push_str(&rest[open..open + close + 2]),
		}
		rest = &after[close + 1..];
	}
	out.push_str(rest);
	out
}

/// Candidates starting with `token`, compared case-insensitively, in their
/// original order.
pub fn copy_partial_matches<I, S>(token: &str, candidates: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let token = token.to_lowercase();
	candidates
		.into_iter()
		.filter(|c| c.as_ref().to_lowercase().starts_with(&token))
		.map(|c| c.as_ref().to_string())
		.collect()
}
