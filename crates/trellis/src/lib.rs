//! Command registration and dispatch.
//!
//! Application types implement [`CommandSet`] to declare handlers under
//! dot-separated paths such as `guild.kick`. A [`CommandFramework`] keeps
//! them in a trie, routes `(label, tokens)` invocations to the deepest
//! matching handler and runs the permission, sender, argument-count,
//! confirmation and cooldown checks before binding parameters and calling
//! the handler inline or on a [`Scheduler`].

pub mod arguments;
pub mod clock;
pub mod completion;
pub mod config;
pub mod confirmation;
pub mod cooldown;
pub mod declare;
pub mod error;
pub mod expiring;
pub mod framework;
pub mod host;
pub mod matcher;
pub mod message;
pub mod meta;
pub mod options;
pub mod params;
pub mod parser;
pub mod registry;
pub mod trie;
pub mod utils;

#[cfg(test)]
mod testing;

pub use crate::arguments::CommandArguments;
pub use crate::clock::Clock;
pub use crate::clock::ManualClock;
pub use crate::clock::SystemClock;
pub use crate::completion::CompleterHelper;
pub use crate::config::FrameworkConfig;
pub use crate::declare::CommandSet;
pub use crate::declare::Declarations;
pub use crate::error::ConfigError;
pub use crate::error::FrameworkError;
pub use crate::error::HandlerError;
pub use crate::error::HandlerResult;
pub use crate::error::HostError;
pub use crate::expiring::SelfExpiringMap;
pub use crate::framework::CommandFramework;
pub use crate::framework::DispatchOutcome;
pub use crate::framework::Rejection;
pub use crate::host::Actor;
pub use crate::host::ActorKind;
pub use crate::host::DetachedHost;
pub use crate::host::HostPlatform;
pub use crate::host::InlineScheduler;
pub use crate::host::LabelRegistration;
pub use crate::host::Scheduler;
pub use crate::host::TokioScheduler;
pub use crate::message::Message;
pub use crate::meta::CommandMeta;
pub use crate::meta::CompleterMeta;
pub use crate::meta::ConfirmationSpec;
pub use crate::meta::CooldownSpec;
pub use crate::meta::FlagSpec;
pub use crate::meta::OptionSpec;
pub use crate::meta::SenderRestriction;
pub use crate::options::FrameworkOption;
pub use crate::options::Settings;
pub use crate::params::ParamSpec;
pub use crate::params::Params;
