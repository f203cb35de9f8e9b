use clap::Parser;

/// Command-line arguments for the console host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// Framework configuration file (TOML, JSON, or YAML)
	#[arg(short, long)]
	pub config: Option<String>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	pub log_level: String,

	/// Identity of the actor typing into the console
	#[arg(short, long, default_value = "player")]
	pub actor: String,

	/// Give the actor operator privilege
	#[arg(long)]
	pub operator: bool,

	/// Act as the console instead of an interactive player
	#[arg(long)]
	pub console: bool,

	/// Permissions granted to the actor; repeatable
	#[arg(short, long = "permission")]
	pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let cli = Cli::parse_from(["trellis-console"]);
		assert_eq!(cli.log_level, "info");
		assert_eq!(cli.actor, "player");
		assert!(!cli.operator);
		assert!(!cli.console);
		assert!(cli.permissions.is_empty());
	}

	#[test]
	fn test_repeated_permissions() {
		let cli = Cli::parse_from([
			"trellis-console",
			"--actor",
			"alice",
			"-p",
			"guild.kick",
			"--permission",
			"guild.promote",
			"--config",
			"conf/trellis.toml",
		]);
		assert_eq!(cli.actor, "alice");
		assert_eq!(cli.permissions, vec!["guild.kick", "guild.promote"]);
		assert_eq!(cli.config.as_deref(), Some("conf/trellis.toml"));
	}
}
