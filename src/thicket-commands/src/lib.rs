//! Declarative command trees for game-server plugins.
//!
//! A plugin describes each root command once, as a tree of groups and
//! commands with typed positional arguments. The crate then takes care of
//! the rest of the command lifecycle:
//!
//! - walking invocations down the tree and checking player-only and
//!   permission guards
//! - parsing and validating arguments, with messages that carry the usage
//!   line as hover text
//! - permission-filtered, paginated help for groups
//! - tab completion from static lists, dynamic providers or type defaults
//! - binding every root to the host command framework exactly once
//!
//! # Building a tree
//!
//! ```rust,ignore
//! use thicket_commands::prelude::*;
//!
//! let eco = CommandTree::builder("eco")
//!     .aliases(["economy"])
//!     .sub_command("give", |c| {
//!         c.permission("eco.give")
//!             .add_player("target")
//!             .add_int_with_range("amount", 1, 10_000)
//!             .executes(|ctx| {
//!                 let target = ctx.player("target")?;
//!                 let amount: i32 = ctx.get("amount")?;
//!                 ctx.reply(&format!("<green>Gave {amount} to {}</green>", target.name));
//!                 Ok(())
//!             })
//!     })
//!     .build()?;
//! ```
//!
//! # Registering
//!
//! ```rust,ignore
//! let platform = Rc::new(Platform::new(permissions, selectors));
//! let mut registry = CommandRegistry::new(platform);
//! registry.add(eco)?;
//! registry.register(&mut host);
//! ```
//!
//! The host keeps the [`Dispatcher`] from each [`CommandBinding`] and calls
//! [`Dispatcher::execute`] and [`Dispatcher::suggest`] with the tokens that
//! followed the root label.

pub mod argument;
mod builder;
mod completion;
mod context;
mod dispatch;
mod error;
mod node;
mod parser;
pub mod platform;
mod registry;
pub mod settings;
mod tree;
mod usage;

#[cfg(test)]
mod testing;

pub use argument::{
    ArgValue, ArgumentKind, ArgumentSpec, Arguments, Conditional, FromArgument,
    SuggestionContext, Suggestions, TypeCategory,
};
pub use builder::{CommandBuilder, GroupBuilder, TreeBuilder};
pub use completion::{PLAYER_SELECTORS, default_candidates};
pub use context::{CommandContext, Executor};
pub use dispatch::{DispatchOutcome, Dispatcher, Rejection};
pub use error::{BuildError, CommandError, ConfigError, RegistryError, Result};
pub use node::{CommandSpec, Group, Node, NodeKind};
pub use parser::Tokenizer;
pub use platform::{
    CommandSender, Message, PermissionEvaluator, PlainFormatter, Platform, PlayerRef,
    SelectorResolver, TextFormatter,
};
pub use registry::{CommandBinding, CommandRegistry, HostDispatcher, TreeShape};
pub use settings::CommandSettings;
pub use tree::CommandTree;
pub use usage::{HelpPage, UsageGenerator};

/// Re-export common types for convenience.
pub mod prelude {
    pub use crate::{
        CommandContext, CommandError, CommandRegistry, CommandSender, CommandTree,
        DispatchOutcome, Dispatcher, HostDispatcher, Platform, PlayerRef, Result,
    };
}
