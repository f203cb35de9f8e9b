mod cli;
mod commands;
mod host;
mod repl;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::debug;
use log::info;
use trellis::ActorKind;
use trellis::CommandFramework;
use trellis::FrameworkConfig;
use trellis::FrameworkOption;
use trellis::TokioScheduler;

use crate::cli::Cli;
use crate::host::ConsoleActor;
use crate::host::ConsoleHost;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let args = Cli::parse();

	let config = match &args.config {
		Some(path) => trellis::config::load_from_file(path)?,
		None => FrameworkConfig::default(),
	};
	let level = if config.options.is_enabled(FrameworkOption::Debug) {
		"debug"
	} else {
		args.log_level.as_str()
	};
	telemetry::init(level)?;

	let host = Arc::new(ConsoleHost::new());
	let scheduler = TokioScheduler::current().ok_or("no tokio runtime")?;
	let mut framework = CommandFramework::from_config(&config, host.clone(), Arc::new(scheduler));
	commands::install(&mut framework)?;
	info!(
		"Registered labels: {}",
		host.labels()
			.iter()
			.map(|r| r.label.as_str())
			.collect::<Vec<_>>()
			.join(", ")
	);
	let framework = Arc::new(framework);

	if let Some(ms) = config.sweep_interval_ms.filter(|ms| *ms > 0) {
		let framework = framework.clone();
		tokio::spawn(async move {
			let mut interval = tokio::time::interval(Duration::from_millis(ms));
			loop {
				interval.tick().await;
				let purged = framework.purge_expired();
				if purged > 0 {
					debug!("Purged {} expired cooldown/confirmation entries", purged);
				}
			}
		});
	}

	let kind = if args.console {
		ActorKind::Console
	} else {
		ActorKind::Interactive
	};
	let permissions: HashSet<String> = args.permissions.into_iter().collect();
	let actor = Arc::new(ConsoleActor::new(args.actor, kind, args.operator, permissions));

	repl::run(framework, actor).await?;
	Ok(())
}
