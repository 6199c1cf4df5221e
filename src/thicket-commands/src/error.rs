//! Error types for the command tree engine.
//!
//! [`CommandError`] is what leaf logic and the argument pipeline return; the
//! dispatcher converts every variant into a rendered message for the sender.
//! [`BuildError`] covers malformed trees and is meant to surface while the
//! plugin loads, before anything is registered.

use thiserror::Error;

/// Errors raised while dispatching a single invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// A required argument was not supplied, or an absent argument was read
    /// without a default.
    #[error("Missing argument: {label}")]
    MissingArgument { label: String },

    /// A token could not be converted to the declared argument type.
    #[error("Invalid value '{input}' for argument {label} (expected {expected})")]
    InvalidArgumentType {
        label: String,
        input: String,
        expected: String,
    },

    /// A player argument did not resolve to any online player.
    #[error("No player matches '{input}' for argument {label}")]
    InvalidSelector { label: String, input: String },

    /// Tokens were left over after every argument was filled.
    #[error("Too many arguments: {input}")]
    TooManyArguments { input: String },

    /// The sender lacks a permission on the path to the command.
    #[error("Permission denied")]
    PermissionDenied,

    /// The command can only be run by a player.
    #[error("Only players can use this command")]
    PlayerOnly,

    /// Leaf logic stopped on purpose, optionally with a message for the
    /// sender.
    #[error("Command exited early")]
    Exit(Option<String>),
}

impl CommandError {
    /// Stop the current command without telling the sender anything.
    pub fn exit() -> Self {
        Self::Exit(None)
    }

    /// Stop the current command and send `message` to the sender.
    pub fn exit_with(message: impl Into<String>) -> Self {
        Self::Exit(Some(message.into()))
    }

    /// Create a missing argument error.
    pub fn missing(label: impl Into<String>) -> Self {
        Self::MissingArgument {
            label: label.into(),
        }
    }

    /// Create an invalid argument type error.
    pub fn invalid_type(
        label: impl Into<String>,
        input: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidArgumentType {
            label: label.into(),
            input: input.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid selector error.
    pub fn invalid_selector(label: impl Into<String>, input: impl Into<String>) -> Self {
        Self::InvalidSelector {
            label: label.into(),
            input: input.into(),
        }
    }

    /// The argument this error is about, if it is a data error.
    pub fn argument_label(&self) -> Option<&str> {
        match self {
            Self::MissingArgument { label }
            | Self::InvalidArgumentType { label, .. }
            | Self::InvalidSelector { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Returns true for the guard failures that run before arguments are read.
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::PlayerOnly)
    }
}

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors raised while turning builders into a frozen tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A node or argument label is empty.
    #[error("Empty label under '{parent}'")]
    EmptyLabel { parent: String },

    /// A node label contains whitespace and could never be typed.
    #[error("Label '{label}' contains whitespace")]
    WhitespaceInLabel { label: String },

    /// Two siblings share a label (compared case-insensitively).
    #[error("Duplicate label '{label}' under '{parent}'")]
    DuplicateLabel { parent: String, label: String },

    /// Two arguments of one command share a label.
    #[error("Duplicate argument '{argument}' in command '{command}'")]
    DuplicateArgument { command: String, argument: String },

    /// `set_optional` or `suggests` was called before any argument was added.
    #[error("Modifier '{modifier}' used before any argument in command '{command}'")]
    DanglingModifier { command: String, modifier: String },

    /// A command was never given an executor.
    #[error("Command '{command}' has no executor")]
    MissingExecutor { command: String },

    /// A group has no children.
    #[error("Group '{group}' has no sub-commands")]
    EmptyGroup { group: String },

    /// Sub-nodes were added to a root that was collapsed into a main command.
    #[error("Root '{root}' is a main command and cannot have sub-nodes")]
    MainCommandChildren { root: String },

    /// A numeric range has its bounds reversed.
    #[error("Argument '{argument}' has min greater than max")]
    InvalidRange { argument: String },

    /// A greedy argument must be the last one.
    #[error("Greedy argument '{argument}' in command '{command}' must be last")]
    GreedyNotLast { command: String, argument: String },
}

/// Errors raised by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A root with this label or alias is already present.
    #[error("Command '{0}' is already registered")]
    Duplicate(String),

    /// Trees cannot be added once the registry is bound to the host.
    #[error("Registry is already bound to the host; cannot add '{0}'")]
    AlreadyRegistered(String),
}

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("Invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_label() {
        assert_eq!(CommandError::missing("x").argument_label(), Some("x"));
        assert_eq!(
            CommandError::invalid_type("amount", "abc", "integer").argument_label(),
            Some("amount")
        );
        assert_eq!(
            CommandError::invalid_selector("target", "Nobody").argument_label(),
            Some("target")
        );
        assert_eq!(CommandError::PermissionDenied.argument_label(), None);
        assert_eq!(CommandError::exit_with("bye").argument_label(), None);
    }

    #[test]
    fn test_exit_constructors() {
        assert_eq!(CommandError::exit(), CommandError::Exit(None));
        assert_eq!(
            CommandError::exit_with("done"),
            CommandError::Exit(Some("done".to_string()))
        );
    }

    #[test]
    fn test_is_guard() {
        assert!(CommandError::PermissionDenied.is_guard());
        assert!(CommandError::PlayerOnly.is_guard());
        assert!(!CommandError::missing("x").is_guard());
    }

    #[test]
    fn test_error_display() {
        let err = BuildError::DuplicateLabel {
            parent: "eco".to_string(),
            label: "give".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate label 'give' under 'eco'");
    }
}
