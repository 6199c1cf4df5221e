//! Engine settings: message templates, help pagination and usage colors.
//!
//! Settings are plain serde structs so a plugin can keep them in its own
//! TOML file. Every field has a default, so a partial file only overrides
//! what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level settings for the command engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Messages sent to the sender.
    #[serde(default)]
    pub messages: Messages,

    /// Help listing and pagination.
    #[serde(default)]
    pub help: HelpSettings,

    /// Markup colors used by the usage generator.
    #[serde(default)]
    pub style: UsageStyle,
}

impl CommandSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded command settings from {:?}", path);
        Ok(settings)
    }
}

/// Message templates. `%s` is replaced with the argument label, hidden
/// count or page number depending on the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default = "default_missing_argument")]
    pub missing_argument: String,

    #[serde(default = "default_invalid_argument")]
    pub invalid_argument: String,

    #[serde(default = "default_invalid_selector")]
    pub invalid_selector: String,

    #[serde(default = "default_too_many_arguments")]
    pub too_many_arguments: String,

    #[serde(default = "default_permission_denied")]
    pub permission_denied: String,

    #[serde(default = "default_player_only")]
    pub player_only: String,

    #[serde(default = "default_unknown_subcommand")]
    pub unknown_subcommand: String,

    #[serde(default = "default_hidden_by_permission")]
    pub hidden_by_permission: String,

    #[serde(default = "default_page_footer")]
    pub page_footer: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_argument: default_missing_argument(),
            invalid_argument: default_invalid_argument(),
            invalid_selector: default_invalid_selector(),
            too_many_arguments: default_too_many_arguments(),
            permission_denied: default_permission_denied(),
            player_only: default_player_only(),
            unknown_subcommand: default_unknown_subcommand(),
            hidden_by_permission: default_hidden_by_permission(),
            page_footer: default_page_footer(),
        }
    }
}

fn default_missing_argument() -> String {
    "<red>Missing argument: '%s'</red>".to_string()
}

fn default_invalid_argument() -> String {
    "<red>Invalid value for '%s'</red>".to_string()
}

fn default_invalid_selector() -> String {
    "<red>No player matches '%s'</red>".to_string()
}

fn default_too_many_arguments() -> String {
    "<red>Too many arguments</red>".to_string()
}

fn default_permission_denied() -> String {
    "<red>You don't have permission to do that.</red>".to_string()
}

fn default_player_only() -> String {
    "<red>Only players can use this command.</red>".to_string()
}

fn default_unknown_subcommand() -> String {
    "<red>Unknown subcommand.</red>".to_string()
}

fn default_hidden_by_permission() -> String {
    "<gray>%s hidden by permission</gray>".to_string()
}

fn default_page_footer() -> String {
    "<gray>Page %s</gray>".to_string()
}

/// Help listing and pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpSettings {
    /// Entries per page in the permission-aware help.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Entries shown in the cached group listing before the ellipsis.
    #[serde(default = "default_listing_limit")]
    pub listing_limit: usize,

    /// Line appended when the cached listing is truncated.
    #[serde(default = "default_ellipsis")]
    pub ellipsis: String,
}

impl Default for HelpSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            listing_limit: default_listing_limit(),
            ellipsis: default_ellipsis(),
        }
    }
}

fn default_page_size() -> usize {
    8
}

fn default_listing_limit() -> usize {
    8
}

fn default_ellipsis() -> String {
    "...".to_string()
}

/// Markup tag names per node kind and argument category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStyle {
    #[serde(default = "default_group_color")]
    pub group: String,

    #[serde(default = "default_command_color")]
    pub command: String,

    #[serde(default = "default_boolean_color")]
    pub boolean: String,

    #[serde(default = "default_numeric_color")]
    pub numeric: String,

    #[serde(default = "default_string_color")]
    pub string: String,

    #[serde(default = "default_player_color")]
    pub player: String,

    #[serde(default = "default_item_color")]
    pub item: String,
}

impl Default for UsageStyle {
    fn default() -> Self {
        Self {
            group: default_group_color(),
            command: default_command_color(),
            boolean: default_boolean_color(),
            numeric: default_numeric_color(),
            string: default_string_color(),
            player: default_player_color(),
            item: default_item_color(),
        }
    }
}

fn default_group_color() -> String {
    "gold".to_string()
}

fn default_command_color() -> String {
    "yellow".to_string()
}

fn default_boolean_color() -> String {
    "light_purple".to_string()
}

fn default_numeric_color() -> String {
    "aqua".to_string()
}

fn default_string_color() -> String {
    "green".to_string()
}

fn default_player_color() -> String {
    "blue".to_string()
}

fn default_item_color() -> String {
    "dark_aqua".to_string()
}

/// Replace the first `%s` in `template` with `value`.
pub fn fill(template: &str, value: &str) -> String {
    template.replacen("%s", value, 1)
}
