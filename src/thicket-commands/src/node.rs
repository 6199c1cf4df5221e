//! The command tree.
//!
//! A [`Node`] is either a group of uniquely labeled children or a command
//! with typed arguments and an executor. Children are owned through `Rc`,
//! parents are referenced through `Weak`, so a tree is dropped as soon as
//! its root is.

use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::argument::ArgumentSpec;
use crate::context::Executor;
use crate::usage::UsageCache;

/// Payload of a command (leaf) node.
pub struct CommandSpec {
    /// Positional arguments in parse order.
    pub arguments: Vec<ArgumentSpec>,
    /// Whether only players may run the command.
    pub player_only: bool,
    pub(crate) executor: Executor,
}

impl CommandSpec {
    /// Returns true if any argument is required.
    pub fn has_required_arguments(&self) -> bool {
        self.arguments.iter().any(|arg| arg.required)
    }

    /// Look up an argument by label.
    pub fn argument(&self, label: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|arg| arg.label == label)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("arguments", &self.arguments)
            .field("player_only", &self.player_only)
            .finish_non_exhaustive()
    }
}

/// Children of a group, keyed by lowercase label in insertion order.
#[derive(Debug, Default)]
pub struct Group {
    children: IndexMap<String, Rc<Node>>,
}

impl Group {
    pub(crate) fn new(children: impl IntoIterator<Item = Rc<Node>>) -> Self {
        Self {
            children: children
                .into_iter()
                .map(|child| (child.label.to_lowercase(), child))
                .collect(),
        }
    }

    /// Case-insensitive child lookup.
    pub fn child(&self, label: &str) -> Option<&Rc<Node>> {
        self.children.get(&label.to_lowercase())
    }

    pub fn children(&self) -> impl Iterator<Item = &Rc<Node>> {
        self.children.values()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// What a node is.
#[derive(Debug)]
pub enum NodeKind {
    Group(Group),
    Command(CommandSpec),
}

/// A vertex of the command tree.
pub struct Node {
    label: String,
    description: Option<String>,
    permission: Option<String>,
    parent: Weak<Node>,
    kind: NodeKind,
    pub(crate) usage: UsageCache,
}

impl Node {
    pub(crate) fn new(
        label: String,
        description: Option<String>,
        permission: Option<String>,
        parent: Weak<Node>,
        kind: NodeKind,
    ) -> Self {
        Self {
            label,
            description,
            permission,
            parent,
            kind,
            usage: UsageCache::default(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Permission required to use this node and everything below it.
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The parent node, or `None` for a root.
    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.parent.upgrade().is_none()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn is_command(&self) -> bool {
        matches!(self.kind, NodeKind::Command(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::Command(_) => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandSpec> {
        match &self.kind {
            NodeKind::Command(spec) => Some(spec),
            NodeKind::Group(_) => None,
        }
    }

    /// Case-insensitive child lookup. Commands have no children.
    pub fn child(&self, label: &str) -> Option<&Rc<Node>> {
        self.as_group().and_then(|group| group.child(label))
    }

    /// Children in declaration order. Empty for commands.
    pub fn children(&self) -> impl Iterator<Item = &Rc<Node>> {
        self.as_group()
            .into_iter()
            .flat_map(|group| group.children())
    }

    /// Resolve a space-separated path below this node.
    ///
    /// Segments match child labels case-insensitively. Returns `None` if a
    /// segment does not match or a command is reached with path left over.
    /// An empty path resolves to the node itself. When the path does not
    /// resolve from the children, a leading segment naming this node is
    /// skipped, so every entry of [`Node::sub_paths`] resolves to its leaf.
    pub fn find_descendant(self: &Rc<Self>, path: &str) -> Option<Rc<Node>> {
        let segments: Vec<&str> = path.split_whitespace().collect();
        self.walk(&segments).or_else(|| match segments.split_first() {
            Some((first, rest)) if first.eq_ignore_ascii_case(&self.label) => self.walk(rest),
            _ => None,
        })
    }

    fn walk(self: &Rc<Self>, segments: &[&str]) -> Option<Rc<Node>> {
        let mut current = Rc::clone(self);
        for segment in segments {
            let next = match &current.kind {
                NodeKind::Group(group) => Rc::clone(group.child(segment)?),
                NodeKind::Command(_) => return None,
            };
            current = next;
        }
        Some(current)
    }

    /// Paths of every command reachable from this node, each starting with
    /// this node's label.
    pub fn sub_paths(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::Command(_) => vec![self.label.clone()],
            NodeKind::Group(group) => group
                .children()
                .flat_map(|child| child.sub_paths())
                .map(|path| format!("{} {}", self.label, path))
                .collect(),
        }
    }

    /// Every command node below (or at) this node, depth first.
    pub fn leaves(self: &Rc<Self>) -> Vec<Rc<Node>> {
        match &self.kind {
            NodeKind::Command(_) => vec![Rc::clone(self)],
            NodeKind::Group(group) => group.children().flat_map(|child| child.leaves()).collect(),
        }
    }

    /// Ancestors from the root down to and including this node.
    pub fn lineage(self: &Rc<Self>) -> Vec<Rc<Node>> {
        let mut chain = vec![Rc::clone(self)];
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            cursor = node.parent();
            chain.push(node);
        }
        chain.reverse();
        chain
    }

    /// Labels from the root down to this node.
    pub fn path(self: &Rc<Self>) -> Vec<String> {
        self.lineage()
            .iter()
            .map(|node| node.label.clone())
            .collect()
    }

    /// Labels from the root down to this node, space-joined.
    pub fn full_path(self: &Rc<Self>) -> String {
        self.path().join(" ")
    }

    /// Number of ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent();
        }
        depth
    }

    /// Permissions declared on the path from the root to this node.
    pub fn effective_permissions(self: &Rc<Self>) -> Vec<String> {
        self.lineage()
            .iter()
            .filter_map(|node| node.permission.clone())
            .collect()
    }

    /// Permissions declared on the path from `ancestor` (exclusive) down to
    /// this node (inclusive).
    pub(crate) fn permissions_below(self: &Rc<Self>, ancestor: &Rc<Node>) -> Vec<String> {
        let mut permissions = Vec::new();
        let mut cursor = Some(Rc::clone(self));
        while let Some(node) = cursor {
            if Rc::ptr_eq(&node, ancestor) {
                break;
            }
            if let Some(permission) = &node.permission {
                permissions.push(permission.clone());
            }
            cursor = node.parent();
        }
        permissions
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("description", &self.description)
            .field("permission", &self.permission)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
