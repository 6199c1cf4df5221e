//! Typed positional arguments.
//!
//! An [`ArgumentSpec`] declares one positional parameter of a command: its
//! label, [`ArgumentKind`], whether it is required and where completions
//! come from. Specs are fixed once the tree is built; their order is both
//! the parse order and the index used for suggestion context.

mod conditional;
mod parse;

use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::platform::CommandSender;

pub use conditional::Conditional;
pub use parse::{ArgValue, Arguments, FromArgument};

/// The declared type of an argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    Bool,
    Integer { min: Option<i32>, max: Option<i32> },
    Long { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f32>, max: Option<f32> },
    Double { min: Option<f64>, max: Option<f64> },
    /// A single token.
    Word,
    /// A single token, which may be a quoted phrase.
    String,
    /// Every remaining token joined by spaces.
    Greedy,
    Player,
    Players,
    Material,
    Item,
}

/// Display category used to color an argument in usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Boolean,
    Numeric,
    String,
    Player,
    Item,
}

impl ArgumentKind {
    /// Human readable type name shown in usage text.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgumentKind::Bool => "boolean",
            ArgumentKind::Integer { .. } => "integer",
            ArgumentKind::Long { .. } => "long",
            ArgumentKind::Float { .. } | ArgumentKind::Double { .. } => "decimal",
            ArgumentKind::Word => "text with no spaces",
            ArgumentKind::String => "text",
            ArgumentKind::Greedy => "text...",
            ArgumentKind::Player => "player",
            ArgumentKind::Players => "players",
            ArgumentKind::Material => "material",
            ArgumentKind::Item => "item",
        }
    }

    pub fn category(&self) -> TypeCategory {
        match self {
            ArgumentKind::Bool => TypeCategory::Boolean,
            ArgumentKind::Integer { .. }
            | ArgumentKind::Long { .. }
            | ArgumentKind::Float { .. }
            | ArgumentKind::Double { .. } => TypeCategory::Numeric,
            ArgumentKind::Word | ArgumentKind::String | ArgumentKind::Greedy => {
                TypeCategory::String
            }
            ArgumentKind::Player | ArgumentKind::Players => TypeCategory::Player,
            ArgumentKind::Material | ArgumentKind::Item => TypeCategory::Item,
        }
    }

    /// Returns true if the range bounds are ordered (or absent).
    pub(crate) fn has_valid_range(&self) -> bool {
        fn ordered<T: PartialOrd>(min: &Option<T>, max: &Option<T>) -> bool {
            match (min, max) {
                (Some(min), Some(max)) => min <= max,
                _ => true,
            }
        }

        match self {
            ArgumentKind::Integer { min, max } => ordered(min, max),
            ArgumentKind::Long { min, max } => ordered(min, max),
            ArgumentKind::Float { min, max } => ordered(min, max),
            ArgumentKind::Double { min, max } => ordered(min, max),
            _ => true,
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

static RESOURCE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9_.-]+:)?[a-z0-9_./-]+$")
        .unwrap_or_else(|_| panic!("Invalid resource id regex"))
});

/// Returns true if `input` is a `[namespace:]path` resource identifier.
pub fn is_resource_id(input: &str) -> bool {
    RESOURCE_ID.is_match(input)
}

/// Context handed to dynamic suggestion providers.
pub struct SuggestionContext<'a> {
    /// Who is completing.
    pub sender: &'a dyn CommandSender,
    /// Position of the argument being completed.
    pub index: usize,
    /// Tokens already supplied for earlier arguments.
    pub previous: &'a [String],
    /// What has been typed of the current argument so far.
    pub partial: &'a str,
}

/// Dynamic suggestion function.
pub type SuggestionFn = Box<dyn Fn(&SuggestionContext<'_>) -> Vec<String>>;

/// Where completions for an argument come from.
pub enum Suggestions {
    Static(Vec<String>),
    Dynamic(SuggestionFn),
}

impl Suggestions {
    /// Produce the candidates for this provider.
    pub fn candidates(&self, ctx: &SuggestionContext<'_>) -> Vec<String> {
        match self {
            Suggestions::Static(values) => values.clone(),
            Suggestions::Dynamic(provider) => provider(ctx),
        }
    }
}

impl fmt::Debug for Suggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestions::Static(values) => f.debug_tuple("Static").field(values).finish(),
            Suggestions::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Declaration of one positional argument.
#[derive(Debug)]
pub struct ArgumentSpec {
    pub label: String,
    pub kind: ArgumentKind,
    pub required: bool,
    pub suggestions: Option<Suggestions>,
}

impl ArgumentSpec {
    /// Creates a required argument without a suggestion provider.
    pub fn new(label: impl Into<String>, kind: ArgumentKind) -> Self {
        Self {
            label: label.into(),
            kind,
            required: true,
            suggestions: None,
        }
    }

    /// Type name as displayed, or `None` when it would just repeat the label.
    pub fn display_type(&self) -> Option<&'static str> {
        let name = self.kind.type_name();
        (name != self.label).then_some(name)
    }
}
