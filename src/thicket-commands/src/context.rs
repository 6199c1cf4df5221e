//! What leaf logic sees while it runs.

use std::rc::Rc;

use crate::argument::{Arguments, FromArgument};
use crate::error::{CommandError, Result};
use crate::node::Node;
use crate::platform::{CommandSender, Platform, PlayerRef};
use crate::settings::CommandSettings;

/// Leaf logic attached to a command node.
pub type Executor = Box<dyn Fn(&CommandContext<'_>) -> Result<()>>;

/// Context of a single command invocation.
pub struct CommandContext<'a> {
    sender: &'a dyn CommandSender,
    platform: &'a Platform,
    node: &'a Rc<Node>,
    args: Arguments,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        sender: &'a dyn CommandSender,
        platform: &'a Platform,
        node: &'a Rc<Node>,
        args: Arguments,
    ) -> Self {
        Self {
            sender,
            platform,
            node,
            args,
        }
    }

    pub fn sender(&self) -> &dyn CommandSender {
        self.sender
    }

    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// The command node being executed.
    pub fn node(&self) -> &Rc<Node> {
        self.node
    }

    pub fn settings(&self) -> &CommandSettings {
        self.platform.settings()
    }

    /// Shorthand for `args().get(name)`.
    pub fn get<T: FromArgument>(&self, name: &str) -> Result<T> {
        self.args.get(name)
    }

    /// Shorthand for `args().get_or(name, default)`.
    pub fn get_or<T: FromArgument>(&self, name: &str, default: T) -> T {
        self.args.get_or(name, default)
    }

    pub fn is_provided(&self, name: &str) -> bool {
        self.args.is_provided(name)
    }

    /// Resolve a player argument.
    pub fn player(&self, name: &str) -> Result<PlayerRef> {
        let input = self.args.selector(name)?;
        self.platform
            .selectors()
            .resolve_player(self.sender, input)
            .ok_or_else(|| CommandError::invalid_selector(name, input))
    }

    /// Resolve a player argument, or `None` if it was not supplied.
    pub fn player_opt(&self, name: &str) -> Result<Option<PlayerRef>> {
        if self.args.is_provided(name) {
            self.player(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Resolve a player-list argument. Matching nobody is an error.
    pub fn players(&self, name: &str) -> Result<Vec<PlayerRef>> {
        let input = self.args.selector(name)?;
        let players = self.platform.selectors().resolve_players(self.sender, input);
        if players.is_empty() {
            return Err(CommandError::invalid_selector(name, input));
        }
        Ok(players)
    }

    /// Check a permission for the sender.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.platform.has_permission(self.sender, permission)
    }

    /// Send markup to the sender.
    pub fn reply(&self, markup: &str) {
        self.sender.send_message(self.platform.message(markup));
    }

    /// Send markup with hover text to the sender.
    pub fn reply_with_hover(&self, markup: &str, hover: &str) {
        self.sender
            .send_message(self.platform.message_with_hover(markup, hover));
    }
}
