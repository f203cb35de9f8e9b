//! Demo command sets exposed by the console.

use std::time::Duration;

use dashmap::DashMap;
use trellis::CommandArguments;
use trellis::CommandFramework;
use trellis::CommandMeta;
use trellis::CommandSet;
use trellis::CompleterHelper;
use trellis::CompleterMeta;
use trellis::ConfirmationSpec;
use trellis::CooldownSpec;
use trellis::Declarations;
use trellis::FlagSpec;
use trellis::FrameworkError;
use trellis::HandlerResult;
use trellis::OptionSpec;
use trellis::ParamSpec;
use trellis::Params;
use trellis::SenderRestriction;

const GUILD_SUBCOMMANDS: [&str; 7] = ["join", "kick", "member", "list", "disband", "backup", "inspect"];

/// One in-memory guild: member name to rank.
#[derive(Default)]
pub struct Guild {
	members: DashMap<String, u8>,
}

impl Guild {
	fn info(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		args.send_formatted("The guild has {0} member(s).", &[&self.members.len()]);
		Ok(())
	}

	fn join(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		let name = args.sender().id().to_string();
		if self.members.insert(name.clone(), 1).is_some() {
			args.send_message("You are already a member.");
		} else {
			args.send_formatted("{0} joined the guild.", &[&name]);
		}
		Ok(())
	}

	fn kick(&self, args: &CommandArguments, params: &mut Params) -> HandlerResult {
		let target = params.take::<String>(0).ok_or("target not bound")?;
		match self.members.remove(&target) {
			Some(_) => args.send_formatted("{0} was kicked.", &[&target]),
			None => args.send_formatted("{0} is not a member.", &[&target]),
		}
		Ok(())
	}

	fn promote(&self, args: &CommandArguments, params: &mut Params) -> HandlerResult {
		let target = params.take::<String>(0).ok_or("target not bound")?;
		let rank = params.get::<u8>(1).copied().ok_or("rank not bound")?;
		match self.members.get_mut(&target) {
			Some(mut entry) => {
				*entry = rank;
				args.send_formatted("{0} is now rank {1}.", &[&target, &rank]);
			}
			None => args.send_formatted("{0} is not a member.", &[&target]),
		}
		Ok(())
	}

	fn list(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		let mut members: Vec<(String, u8)> = self
			.members
			.iter()
			.map(|entry| (entry.key().clone(), *entry.value()))
			.collect();
		members.sort();
		if args.find_option("sort") == Some("rank") {
			members.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
		}
		if args.is_flag_present("count") {
			args.send_formatted("{0} member(s)", &[&members.len()]);
			return Ok(());
		}
		let line = members
			.iter()
			.map(|(name, rank)| format!("{name}({rank})"))
			.collect::<Vec<_>>()
			.join(", ");
		args.send_message(if line.is_empty() { "No members." } else { line.as_str() });
		Ok(())
	}

	fn disband(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		self.members.clear();
		args.send_message("The guild was disbanded.");
		Ok(())
	}

	fn backup(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		std::thread::sleep(Duration::from_millis(200));
		args.send_formatted("Backed up {0} member(s).", &[&self.members.len()]);
		Ok(())
	}

	fn inspect(&self, args: &CommandArguments, _: &mut Params) -> HandlerResult {
		args.send_message(&format!("{:?}", self.members));
		Ok(())
	}

	fn member_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.members.iter().map(|e| e.key().clone()).collect();
		names.sort();
		names
	}
}

impl CommandSet for Guild {
	fn declare(d: &mut Declarations<Self>) {
		d.command(
			CommandMeta::new("guild")
				.aliases(["g"])
				.description("Guild management")
				.usage("/guild <join|kick|member|list|disband|backup>"),
		)
		.handler(Guild::info);

		d.command(CommandMeta::new("guild.join").sender(SenderRestriction::InteractiveOnly))
			.handler(Guild::join);

		d.command(
			CommandMeta::new("guild.kick")
				.aliases(["boot"])
				.permission("guild.kick")
				.min_args(1)
				.max_args(1)
				.usage("/guild kick <member>"),
		)
		.param(ParamSpec::of::<String>().named("target"))
		.cooldown(CooldownSpec::seconds(5).bypass_permission("guild.nocooldown"))
		.handler(Guild::kick);

		d.command(
			CommandMeta::new("guild.member.promote")
				.permission("guild.promote")
				.min_args(1)
				.max_args(2)
				.usage("/guild member promote <member> [rank]"),
		)
		.param(ParamSpec::of::<String>().named("target"))
		.param(ParamSpec::parsed::<u8>().named("rank").default_value("2"))
		.handler(Guild::promote);

		d.command(CommandMeta::new("guild.list").usage("/guild list [--sort=rank] [--count]"))
			.option(OptionSpec::new("sort"))
			.flag(FlagSpec::new(["count"]))
			.handler(Guild::list);

		d.command(CommandMeta::new("guild.disband").operator_only())
			.confirmation(
				ConfirmationSpec::new(
					"Run the command again within 15 seconds to disband the guild.",
					Duration::from_secs(15),
				)
				.override_console(),
			)
			.handler(Guild::disband);

		d.command(CommandMeta::new("guild.backup").asynchronous())
			.handler(Guild::backup);

		d.command(CommandMeta::new("guild.inspect"))
			.debug_only()
			.handler(Guild::inspect);

		d.completer(CompleterMeta::new("guild").aliases(["g"]))
			.param(ParamSpec::of::<CompleterHelper>())
			.handler(|_, _, params| {
				let helper = params.get::<CompleterHelper>(0).ok_or("helper not bound")?;
				Ok(helper.copy_matches(0, GUILD_SUBCOMMANDS))
			});

		d.completer(CompleterMeta::new("guild.kick").aliases(["boot"]).permission("guild.kick"))
			.param(ParamSpec::of::<CompleterHelper>())
			.handler(|guild, _, params| {
				let helper = params.get::<CompleterHelper>(0).ok_or("helper not bound")?;
				Ok(helper.copy_matches(0, guild.member_names()))
			});
	}
}

/// Small utility commands.
pub struct Utility;

impl CommandSet for Utility {
	fn declare(d: &mut Declarations<Self>) {
		d.command(CommandMeta::new("echo").min_args(1).usage("/echo <text...>"))
			.handler(|_, args, _| {
				args.send_message(&args.concat_arguments());
				Ok(())
			});

		d.command(CommandMeta::new("roll").max_args(1).usage("/roll [sides]"))
			.cooldown(CooldownSpec::seconds(3))
			.handler(|_, args, _| {
				// Only limited when handlers check cooldowns themselves.
				match args.check_cooldown() {
					Err(FrameworkError::CustomCooldownCheckerDisabled) => {}
					other => other?,
				}
				let sides = match args.argument_as_i64(0) {
					n if n > 1 => n,
					_ => 6,
				};
				let seed = args.sender().id().bytes().map(i64::from).sum::<i64>();
				args.send_formatted("You rolled {0}.", &[&(seed % sides + 1)]);
				Ok(())
			});

		d.command(CommandMeta::new("reload").sender(SenderRestriction::ConsoleOnly))
			.handler(|_, args, _| {
				args.send_message("Nothing to reload.");
				Ok(())
			});
	}
}

/// Register the providers and command sets of the console.
pub fn install(framework: &mut CommandFramework) -> Result<(), FrameworkError> {
	framework.add_provider("target", |args: &CommandArguments| {
		args.first().map(str::to_string)
	})?;
	framework.add_provider("rank", |args: &CommandArguments| args.argument_as::<u8>(1))?;
	framework.register(Guild::default());
	framework.register(Utility);
	Ok(())
}
