//! A built root command.

use std::rc::Rc;

use crate::builder::TreeBuilder;
use crate::node::Node;

/// A frozen command tree: the root node plus the root's aliases.
#[derive(Debug)]
pub struct CommandTree {
    root: Rc<Node>,
    aliases: Vec<String>,
}

impl CommandTree {
    /// Start building a root command.
    pub fn builder(label: impl Into<String>) -> TreeBuilder {
        TreeBuilder::new(label)
    }

    pub(crate) fn new(root: Rc<Node>, aliases: Vec<String>) -> Self {
        Self { root, aliases }
    }

    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    pub fn label(&self) -> &str {
        self.root.label()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.root.description()
    }

    /// Primary label followed by the aliases.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.label()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns true if `name` is the label or an alias, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.all_names().any(|n| n.eq_ignore_ascii_case(name))
    }
}
