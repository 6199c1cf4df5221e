//! Root commands and their one-time binding to the host.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::argument::{ArgumentKind, ArgumentSpec};
use crate::dispatch::Dispatcher;
use crate::error::RegistryError;
use crate::node::{Node, NodeKind};
use crate::platform::Platform;
use crate::tree::CommandTree;

// ============================================================
// HOST INTERFACE
// ============================================================

/// Literal and argument graph of a tree, for hosts that build their own
/// parse graph from it.
///
/// Arguments chain: each argument is the single child of the one before
/// it. A node is `executable` when no required argument follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeShape {
    Literal {
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        permission: Option<String>,
        executable: bool,
        children: Vec<TreeShape>,
    },
    Argument {
        label: String,
        parser: &'static str,
        required: bool,
        executable: bool,
        /// Completions come from [`Dispatcher::suggest`].
        custom_suggestions: bool,
        children: Vec<TreeShape>,
    },
}

fn parser_name(kind: &ArgumentKind) -> &'static str {
    match kind {
        ArgumentKind::Bool => "bool",
        ArgumentKind::Integer { .. } => "integer",
        ArgumentKind::Long { .. } => "long",
        ArgumentKind::Float { .. } => "float",
        ArgumentKind::Double { .. } => "double",
        ArgumentKind::Word => "word",
        ArgumentKind::String => "string",
        ArgumentKind::Greedy => "greedy_string",
        ArgumentKind::Player => "player",
        ArgumentKind::Players => "players",
        ArgumentKind::Material => "material",
        ArgumentKind::Item => "item",
    }
}

fn argument_chain(arguments: &[ArgumentSpec]) -> Vec<TreeShape> {
    let Some((first, rest)) = arguments.split_first() else {
        return Vec::new();
    };
    vec![TreeShape::Argument {
        label: first.label.clone(),
        parser: parser_name(&first.kind),
        required: first.required,
        executable: rest.iter().all(|arg| !arg.required),
        custom_suggestions: first.suggestions.is_some(),
        children: argument_chain(rest),
    }]
}

impl TreeShape {
    /// Describe `node` and everything below it.
    pub fn of(node: &Node) -> Self {
        let (executable, children) = match node.kind() {
            NodeKind::Group(group) => (false, group.children().map(|c| Self::of(c)).collect()),
            NodeKind::Command(spec) => (
                !spec.has_required_arguments(),
                argument_chain(&spec.arguments),
            ),
        };
        TreeShape::Literal {
            label: node.label().to_string(),
            permission: node.permission().map(str::to_string),
            executable,
            children,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TreeShape::Literal { label, .. } | TreeShape::Argument { label, .. } => label,
        }
    }

    pub fn children(&self) -> &[TreeShape] {
        match self {
            TreeShape::Literal { children, .. } | TreeShape::Argument { children, .. } => children,
        }
    }
}

/// Everything the host needs to expose one root command.
#[derive(Debug, Clone)]
pub struct CommandBinding {
    pub label: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub shape: TreeShape,
    /// Run and complete invocations of this root.
    pub dispatcher: Dispatcher,
}

/// The host's command framework.
pub trait HostDispatcher {
    fn bind(&mut self, binding: CommandBinding);
}

// ============================================================
// COMMAND REGISTRY
// ============================================================

/// The root commands of a plugin.
///
/// Roots are collected with [`add`](Self::add) while the plugin loads and
/// bound to the host by a single [`register`](Self::register) call.
#[derive(Debug)]
pub struct CommandRegistry {
    platform: Rc<Platform>,
    trees: IndexMap<String, Rc<CommandTree>>,
    registered: bool,
}

impl CommandRegistry {
    pub fn new(platform: Rc<Platform>) -> Self {
        Self {
            platform,
            trees: IndexMap::new(),
            registered: false,
        }
    }

    pub fn platform(&self) -> &Rc<Platform> {
        &self.platform
    }

    /// Add a root. Its label and aliases must not collide with any root
    /// already added, ignoring case.
    pub fn add(&mut self, tree: CommandTree) -> Result<(), RegistryError> {
        if self.registered {
            return Err(RegistryError::AlreadyRegistered(tree.label().to_string()));
        }
        if let Some(name) = tree.all_names().find(|name| self.get(name).is_some()) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        tracing::debug!(
            "Added /{} ({} aliases) to the command registry",
            tree.label(),
            tree.aliases().len()
        );
        self.trees
            .insert(tree.label().to_lowercase(), Rc::new(tree));
        Ok(())
    }

    /// Look up a root by label or alias, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Rc<CommandTree>> {
        self.trees
            .get(&name.to_lowercase())
            .or_else(|| self.trees.values().find(|tree| tree.matches(name)))
    }

    /// A dispatcher for the root named `name`.
    pub fn dispatcher(&self, name: &str) -> Option<Dispatcher> {
        self.get(name)
            .map(|tree| Dispatcher::new(Rc::clone(tree), Rc::clone(&self.platform)))
    }

    pub fn trees(&self) -> impl Iterator<Item = &Rc<CommandTree>> {
        self.trees.values()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Bind every root to the host.
    ///
    /// Only the first call binds anything and returns `true`; later calls
    /// are logged and return `false`.
    pub fn register(&mut self, host: &mut dyn HostDispatcher) -> bool {
        if self.registered {
            tracing::warn!(
                "Command registry already registered; ignoring repeated registration of {} roots",
                self.trees.len()
            );
            return false;
        }
        self.registered = true;

        for tree in self.trees.values() {
            host.bind(CommandBinding {
                label: tree.label().to_string(),
                aliases: tree.aliases().to_vec(),
                description: tree.description().map(str::to_string),
                shape: TreeShape::of(tree.root()),
                dispatcher: Dispatcher::new(Rc::clone(tree), Rc::clone(&self.platform)),
            });
            tracing::debug!("Registered /{} with the host", tree.label());
        }
        true
    }
}
