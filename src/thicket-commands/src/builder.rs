//! Fluent construction of command trees.
//!
//! Builders are plain values. Each call consumes the builder and returns
//! it, configuration closures receive a fresh child builder, and
//! [`TreeBuilder::build`] checks the whole draft before freezing it into
//! `Rc` nodes. Misuse is collected along the way and reported by `build`,
//! so a plugin fails while loading instead of at first invocation.

use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::argument::{ArgumentKind, ArgumentSpec, SuggestionContext, Suggestions};
use crate::context::{CommandContext, Executor};
use crate::error::{BuildError, Result};
use crate::node::{CommandSpec, Group, Node, NodeKind};
use crate::tree::CommandTree;

// ============================================================
// COMMAND BUILDER
// ============================================================

/// Builds a command (leaf) node.
pub struct CommandBuilder {
    label: String,
    description: Option<String>,
    permission: Option<String>,
    player_only: bool,
    arguments: Vec<ArgumentSpec>,
    executor: Option<Executor>,
    errors: Vec<BuildError>,
}

impl CommandBuilder {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            permission: None,
            player_only: false,
            arguments: Vec::new(),
            executor: None,
            errors: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Only players may run this command.
    pub fn player_only(mut self) -> Self {
        self.player_only = true;
        self
    }

    /// Set the leaf logic.
    pub fn executes<F>(mut self, executor: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> Result<()> + 'static,
    {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Append an argument.
    pub fn argument(mut self, spec: ArgumentSpec) -> Self {
        self.arguments.push(spec);
        self
    }

    fn add(self, label: impl Into<String>, kind: ArgumentKind) -> Self {
        self.argument(ArgumentSpec::new(label, kind))
    }

    pub fn add_bool(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Bool)
    }

    pub fn add_int(self, label: impl Into<String>) -> Self {
        self.add(
            label,
            ArgumentKind::Integer {
                min: None,
                max: None,
            },
        )
    }

    pub fn add_int_with_range(self, label: impl Into<String>, min: i32, max: i32) -> Self {
        self.add(
            label,
            ArgumentKind::Integer {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    pub fn add_long(self, label: impl Into<String>) -> Self {
        self.add(
            label,
            ArgumentKind::Long {
                min: None,
                max: None,
            },
        )
    }

    pub fn add_long_with_range(self, label: impl Into<String>, min: i64, max: i64) -> Self {
        self.add(
            label,
            ArgumentKind::Long {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    pub fn add_float(self, label: impl Into<String>) -> Self {
        self.add(
            label,
            ArgumentKind::Float {
                min: None,
                max: None,
            },
        )
    }

    pub fn add_float_with_range(self, label: impl Into<String>, min: f32, max: f32) -> Self {
        self.add(
            label,
            ArgumentKind::Float {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    pub fn add_double(self, label: impl Into<String>) -> Self {
        self.add(
            label,
            ArgumentKind::Double {
                min: None,
                max: None,
            },
        )
    }

    pub fn add_double_with_range(self, label: impl Into<String>, min: f64, max: f64) -> Self {
        self.add(
            label,
            ArgumentKind::Double {
                min: Some(min),
                max: Some(max),
            },
        )
    }

    pub fn add_word(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Word)
    }

    pub fn add_string(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::String)
    }

    pub fn add_greedy(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Greedy)
    }

    pub fn add_player(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Player)
    }

    pub fn add_players(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Players)
    }

    pub fn add_material(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Material)
    }

    pub fn add_item(self, label: impl Into<String>) -> Self {
        self.add(label, ArgumentKind::Item)
    }

    fn modify_last(mut self, modifier: &str, apply: impl FnOnce(&mut ArgumentSpec)) -> Self {
        match self.arguments.last_mut() {
            Some(spec) => apply(spec),
            None => self.errors.push(BuildError::DanglingModifier {
                command: self.label.clone(),
                modifier: modifier.to_string(),
            }),
        }
        self
    }

    /// Make the last added argument optional.
    pub fn set_optional(self) -> Self {
        self.modify_last("set_optional", |spec| spec.required = false)
    }

    /// Offer a fixed list of completions for the last added argument.
    pub fn suggests<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.modify_last("suggests", |spec| {
            spec.suggestions = Some(Suggestions::Static(values));
        })
    }

    /// Compute completions for the last added argument on demand.
    pub fn suggests_with<F>(self, provider: F) -> Self
    where
        F: Fn(&SuggestionContext<'_>) -> Vec<String> + 'static,
    {
        self.modify_last("suggests_with", |spec| {
            spec.suggestions = Some(Suggestions::Dynamic(Box::new(provider)));
        })
    }

    fn check(self) -> std::result::Result<Checked, BuildError> {
        check_label(&self.label, "")?;
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let mut seen = HashSet::new();
        let last = self.arguments.len().saturating_sub(1);
        for (index, spec) in self.arguments.iter().enumerate() {
            if spec.label.trim().is_empty() {
                return Err(BuildError::EmptyLabel {
                    parent: self.label.clone(),
                });
            }
            if !seen.insert(spec.label.as_str()) {
                return Err(BuildError::DuplicateArgument {
                    command: self.label.clone(),
                    argument: spec.label.clone(),
                });
            }
            if !spec.kind.has_valid_range() {
                return Err(BuildError::InvalidRange {
                    argument: spec.label.clone(),
                });
            }
            if spec.kind == ArgumentKind::Greedy && index != last {
                return Err(BuildError::GreedyNotLast {
                    command: self.label.clone(),
                    argument: spec.label.clone(),
                });
            }
        }

        let executor = self.executor.ok_or_else(|| BuildError::MissingExecutor {
            command: self.label.clone(),
        })?;

        Ok(Checked::Command {
            label: self.label,
            description: self.description,
            permission: self.permission,
            spec: CommandSpec {
                arguments: self.arguments,
                player_only: self.player_only,
                executor,
            },
        })
    }
}

// ============================================================
// GROUP BUILDER
// ============================================================

enum Draft {
    Group(GroupBuilder),
    Command(CommandBuilder),
}

impl Draft {
    fn check(self) -> std::result::Result<Checked, BuildError> {
        match self {
            Draft::Group(group) => group.check(),
            Draft::Command(command) => command.check(),
        }
    }
}

/// Builds a group node.
pub struct GroupBuilder {
    label: String,
    description: Option<String>,
    permission: Option<String>,
    children: Vec<Draft>,
}

impl GroupBuilder {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            permission: None,
            children: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Add a nested group.
    pub fn sub_group(
        mut self,
        label: impl Into<String>,
        configure: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        self.children
            .push(Draft::Group(configure(GroupBuilder::new(label))));
        self
    }

    /// Add a command.
    pub fn sub_command(
        mut self,
        label: impl Into<String>,
        configure: impl FnOnce(CommandBuilder) -> CommandBuilder,
    ) -> Self {
        self.children
            .push(Draft::Command(configure(CommandBuilder::new(label))));
        self
    }

    fn check(self) -> std::result::Result<Checked, BuildError> {
        check_label(&self.label, "")?;
        let children = check_children(&self.label, self.children)?;
        Ok(Checked::Group {
            label: self.label,
            description: self.description,
            permission: self.permission,
            children,
        })
    }
}

fn check_label(label: &str, parent: &str) -> std::result::Result<(), BuildError> {
    if label.is_empty() {
        return Err(BuildError::EmptyLabel {
            parent: parent.to_string(),
        });
    }
    if label.contains(char::is_whitespace) {
        return Err(BuildError::WhitespaceInLabel {
            label: label.to_string(),
        });
    }
    Ok(())
}

fn check_children(
    parent: &str,
    children: Vec<Draft>,
) -> std::result::Result<Vec<Checked>, BuildError> {
    if children.is_empty() {
        return Err(BuildError::EmptyGroup {
            group: parent.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut checked = Vec::with_capacity(children.len());
    for child in children {
        let child = child.check().map_err(|err| match err {
            BuildError::EmptyLabel { parent: p } if p.is_empty() => BuildError::EmptyLabel {
                parent: parent.to_string(),
            },
            other => other,
        })?;
        if !seen.insert(child.label().to_lowercase()) {
            return Err(BuildError::DuplicateLabel {
                parent: parent.to_string(),
                label: child.label().to_string(),
            });
        }
        checked.push(child);
    }
    Ok(checked)
}

// ============================================================
// CHECKED DRAFT
// ============================================================

/// A draft that passed validation and can be frozen without failing.
enum Checked {
    Group {
        label: String,
        description: Option<String>,
        permission: Option<String>,
        children: Vec<Checked>,
    },
    Command {
        label: String,
        description: Option<String>,
        permission: Option<String>,
        spec: CommandSpec,
    },
}

impl Checked {
    fn label(&self) -> &str {
        match self {
            Checked::Group { label, .. } | Checked::Command { label, .. } => label,
        }
    }

    fn freeze(self, parent: Weak<Node>) -> Rc<Node> {
        match self {
            Checked::Group {
                label,
                description,
                permission,
                children,
            } => Rc::new_cyclic(|me| {
                let children = children.into_iter().map(|child| child.freeze(me.clone()));
                Node::new(
                    label,
                    description,
                    permission,
                    parent,
                    NodeKind::Group(Group::new(children)),
                )
            }),
            Checked::Command {
                label,
                description,
                permission,
                spec,
            } => Rc::new(Node::new(
                label,
                description,
                permission,
                parent,
                NodeKind::Command(spec),
            )),
        }
    }
}

// ============================================================
// TREE BUILDER
// ============================================================

enum Root {
    Group(Vec<Draft>),
    Main(Box<CommandBuilder>),
}

/// Builds a root command.
pub struct TreeBuilder {
    label: String,
    aliases: Vec<String>,
    description: Option<String>,
    permission: Option<String>,
    root: Root,
    errors: Vec<BuildError>,
}

impl TreeBuilder {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            aliases: Vec::new(),
            description: None,
            permission: None,
            root: Root::Group(Vec::new()),
            errors: Vec::new(),
        }
    }

    /// Alternative root labels.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    fn push(mut self, draft: Draft) -> Self {
        match &mut self.root {
            Root::Group(children) => children.push(draft),
            Root::Main(_) => self.errors.push(BuildError::MainCommandChildren {
                root: self.label.clone(),
            }),
        }
        self
    }

    /// Add a group below the root.
    pub fn sub_group(
        self,
        label: impl Into<String>,
        configure: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        let group = configure(GroupBuilder::new(label));
        self.push(Draft::Group(group))
    }

    /// Add a command below the root.
    pub fn sub_command(
        self,
        label: impl Into<String>,
        configure: impl FnOnce(CommandBuilder) -> CommandBuilder,
    ) -> Self {
        let command = configure(CommandBuilder::new(label));
        self.push(Draft::Command(command))
    }

    /// Make the root itself a single command, dropping any children added
    /// so far.
    pub fn main_command(mut self, configure: impl FnOnce(CommandBuilder) -> CommandBuilder) -> Self {
        if let Root::Group(children) = &self.root
            && !children.is_empty()
        {
            tracing::debug!(
                "Main command replaces {} sub-nodes of /{}",
                children.len(),
                self.label
            );
        }
        let command = configure(CommandBuilder::new(self.label.clone()));
        self.root = Root::Main(Box::new(command));
        self
    }

    /// Validate the draft and freeze it into a tree.
    pub fn build(self) -> std::result::Result<CommandTree, BuildError> {
        let label = self.label.clone();
        let tree = self.try_build();
        match &tree {
            Ok(tree) => tracing::debug!(
                "Built command tree /{} with {} commands",
                label,
                tree.root().leaves().len()
            ),
            Err(err) => tracing::warn!("Failed to build command tree /{}: {}", label, err),
        }
        tree
    }

    fn try_build(self) -> std::result::Result<CommandTree, BuildError> {
        check_label(&self.label, "")?;
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        for alias in &self.aliases {
            check_label(alias, &self.label)?;
        }

        let checked = match self.root {
            Root::Group(children) => Checked::Group {
                children: check_children(&self.label, children)?,
                label: self.label,
                description: self.description,
                permission: self.permission,
            },
            Root::Main(command) => match command.check()? {
                Checked::Command {
                    label,
                    description,
                    permission,
                    spec,
                } => Checked::Command {
                    label,
                    description: description.or(self.description),
                    permission: permission.or(self.permission),
                    spec,
                },
                group @ Checked::Group { .. } => group,
            },
        };

        Ok(CommandTree::new(checked.freeze(Weak::new()), self.aliases))
    }
}
