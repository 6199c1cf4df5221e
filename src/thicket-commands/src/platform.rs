//! Host collaborators consumed by the engine.
//!
//! The engine never talks to a game server directly. Everything it needs
//! from the host (who is running the command, whether they hold a
//! permission, how markup becomes chat text, which players a selector
//! names) goes through the traits in this module, bundled into a
//! [`Platform`].

use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use uuid::Uuid;

use crate::settings::CommandSettings;

/// A rendered chat line with an optional hover payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The rendered text.
    pub text: String,
    /// Rendered text shown when hovering the line.
    pub hover: Option<String>,
}

impl Message {
    /// Creates a message without hover text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hover: None,
        }
    }

    /// Attaches hover text.
    pub fn with_hover(mut self, hover: impl Into<String>) -> Self {
        self.hover = Some(hover.into());
        self
    }
}

/// A player resolved from a selector argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerRef {
    pub id: Uuid,
    pub name: String,
}

impl PlayerRef {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Whoever invoked a command: a player, the console, a command block.
pub trait CommandSender {
    /// Display name of the sender.
    fn name(&self) -> &str;

    /// The player's id, or `None` for non-player senders.
    fn player_id(&self) -> Option<Uuid>;

    /// Returns true if the sender is a player.
    fn is_player(&self) -> bool {
        self.player_id().is_some()
    }

    /// Deliver a rendered message to the sender.
    fn send_message(&self, message: Message);
}

/// Evaluates permission strings for a sender.
pub trait PermissionEvaluator {
    fn has(&self, sender: &dyn CommandSender, permission: &str) -> bool;
}

/// Resolves player-like arguments against live server state.
pub trait SelectorResolver {
    /// Resolve a single player by name or selector.
    fn resolve_player(&self, sender: &dyn CommandSender, input: &str) -> Option<PlayerRef>;

    /// Resolve a selector to a list of players. An empty list is a failure.
    fn resolve_players(&self, sender: &dyn CommandSender, input: &str) -> Vec<PlayerRef>;

    /// Names offered as completions for player arguments.
    fn online_players(&self) -> Vec<String>;
}

/// Turns markup into displayable text.
pub trait TextFormatter {
    fn render(&self, markup: &str) -> String;
}

static TAG_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/?[a-z_#!][a-z0-9_:#./-]*$").unwrap_or_else(|_| panic!("Invalid tag regex"))
});

/// Formatter that drops `<tag>` markup and keeps the text.
///
/// `\<` is an escaped literal `<`; anything between angle brackets that does
/// not look like a tag name is kept as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl TextFormatter for PlainFormatter {
    fn render(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut rest = markup;

        while let Some(pos) = rest.find(['\\', '<']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if let Some(after) = tail.strip_prefix("\\<") {
                out.push('<');
                rest = after;
                continue;
            }
            if tail.starts_with('\\') {
                out.push('\\');
                rest = &tail[1..];
                continue;
            }

            match tail.find('>') {
                Some(end) if TAG_NAME.is_match(&tail[1..end]) => {
                    rest = &tail[end + 1..];
                }
                _ => {
                    out.push('<');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Escape literal `<` so formatters do not read it as a tag.
pub fn escape_markup(text: &str) -> String {
    text.replace('<', "\\<")
}

/// The collaborators and settings a dispatcher runs against.
pub struct Platform {
    permissions: Box<dyn PermissionEvaluator>,
    selectors: Box<dyn SelectorResolver>,
    formatter: Box<dyn TextFormatter>,
    settings: CommandSettings,
}

impl Platform {
    /// Creates a platform with the plain formatter and default settings.
    pub fn new(
        permissions: impl PermissionEvaluator + 'static,
        selectors: impl SelectorResolver + 'static,
    ) -> Self {
        Self {
            permissions: Box::new(permissions),
            selectors: Box::new(selectors),
            formatter: Box::new(PlainFormatter),
            settings: CommandSettings::default(),
        }
    }

    /// Use a different text formatter.
    pub fn with_formatter(mut self, formatter: impl TextFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Use different settings.
    pub fn with_settings(mut self, settings: CommandSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CommandSettings {
        &self.settings
    }

    pub fn selectors(&self) -> &dyn SelectorResolver {
        self.selectors.as_ref()
    }

    /// Check a single permission.
    pub fn has_permission(&self, sender: &dyn CommandSender, permission: &str) -> bool {
        self.permissions.has(sender, permission)
    }

    /// Check that the sender holds every permission in `permissions`.
    pub fn has_all<'a>(
        &self,
        sender: &dyn CommandSender,
        permissions: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        permissions
            .into_iter()
            .all(|permission| self.permissions.has(sender, permission))
    }

    /// Render markup into a message.
    pub fn message(&self, markup: &str) -> Message {
        Message::new(self.formatter.render(markup))
    }

    /// Render markup into a message with rendered hover text.
    pub fn message_with_hover(&self, markup: &str, hover: &str) -> Message {
        Message::new(self.formatter.render(markup)).with_hover(self.formatter.render(hover))
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_formatter_strips_tags() {
        let f = PlainFormatter;
        assert_eq!(f.render("<gold>eco</gold> <yellow>give</yellow>"), "eco give");
        assert_eq!(f.render("no markup"), "no markup");
    }

    #[test]
    fn test_plain_formatter_keeps_non_tags() {
        let f = PlainFormatter;
        assert_eq!(f.render("<aqua>\\<x: integer></aqua>"), "<x: integer>");
        assert_eq!(f.render("a < b"), "a < b");
        assert_eq!(f.render("\\<player>"), "<player>");
        assert_eq!(f.render("trailing \\"), "trailing \\");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("<x>"), "\\<x>");
        assert_eq!(PlainFormatter.render(&escape_markup("<red>")), "<red>");
    }

    #[test]
    fn test_message_hover() {
        let msg = Message::new("hi").with_hover("usage");
        assert_eq!(msg.hover.as_deref(), Some("usage"));
    }
}
