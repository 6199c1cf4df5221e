//! Usage and help text.
//!
//! Output is markup: labels are wrapped in color tags from [`UsageStyle`]
//! and literal `<` is escaped, so a [`TextFormatter`] decides how it looks.
//!
//! Per-node text that does not depend on who is asking (the path prefix,
//! a command's usage line and a group's short listing) is computed on first
//! request and kept in the node for the life of the tree, using the settings
//! of that first request. Permission-filtered help is rebuilt on every call,
//! so permission changes never leave stale output behind.
//!
//! [`TextFormatter`]: crate::platform::TextFormatter

use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::argument::{ArgumentSpec, TypeCategory};
use crate::node::{Node, NodeKind};
use crate::platform::escape_markup;
use crate::settings::{CommandSettings, UsageStyle, fill};

/// Lazily filled per-node text.
#[derive(Debug, Default)]
pub(crate) struct UsageCache {
    path: OnceCell<String>,
    line: OnceCell<String>,
    listing: OnceCell<String>,
}

/// One page of permission-filtered help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpPage {
    /// Markup lines, ready to send one message per line.
    pub lines: Vec<String>,
    /// 1-based page shown.
    pub page: usize,
    /// Total number of pages (at least 1).
    pub pages: usize,
    /// Entries hidden because the subject lacks a permission.
    pub hidden: usize,
}

/// Renders usage and help text for nodes.
#[derive(Debug, Clone, Copy)]
pub struct UsageGenerator<'a> {
    settings: &'a CommandSettings,
}

fn colored(tag: &str, text: &str) -> String {
    format!("<{tag}>{text}</{tag}>")
}

fn category_color(style: &UsageStyle, category: TypeCategory) -> &str {
    match category {
        TypeCategory::Boolean => &style.boolean,
        TypeCategory::Numeric => &style.numeric,
        TypeCategory::String => &style.string,
        TypeCategory::Player => &style.player,
        TypeCategory::Item => &style.item,
    }
}

impl<'a> UsageGenerator<'a> {
    pub fn new(settings: &'a CommandSettings) -> Self {
        Self { settings }
    }

    fn node_label(&self, node: &Node) -> String {
        let tag = match node.kind() {
            NodeKind::Group(_) => &self.settings.style.group,
            NodeKind::Command(_) => &self.settings.style.command,
        };
        colored(tag, &escape_markup(node.label()))
    }

    /// A single argument: `<label: type>` if required, `[label: type]`
    /// otherwise.
    pub fn argument(&self, spec: &ArgumentSpec) -> String {
        let (open, close) = if spec.required { ("\\<", ">") } else { ("[", "]") };
        let body = match spec.display_type() {
            Some(type_name) => format!("{}: {}", escape_markup(&spec.label), type_name),
            None => escape_markup(&spec.label),
        };
        colored(
            category_color(&self.settings.style, spec.kind.category()),
            &format!("{open}{body}{close}"),
        )
    }

    /// Labels from the root down to `node`, colored by kind.
    pub fn path<'n>(&self, node: &'n Rc<Node>) -> &'n str {
        node.usage.path.get_or_init(|| {
            node.lineage()
                .iter()
                .map(|n| self.node_label(n))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// Full invocation syntax of a command, or the path of a group.
    pub fn usage<'n>(&self, node: &'n Rc<Node>) -> &'n str {
        node.usage.line.get_or_init(|| {
            let mut line = self.path(node).to_string();
            if let NodeKind::Command(spec) = node.kind() {
                for argument in &spec.arguments {
                    line.push(' ');
                    line.push_str(&self.argument(argument));
                }
            }
            line
        })
    }

    /// Short listing: a command's usage, or up to `listing_limit` command
    /// usages below a group followed by the ellipsis when truncated.
    pub fn listing<'n>(&self, node: &'n Rc<Node>) -> &'n str {
        node.usage.listing.get_or_init(|| match node.kind() {
            NodeKind::Command(_) => self.usage(node).to_string(),
            NodeKind::Group(_) => {
                let leaves = node.leaves();
                let limit = self.settings.help.listing_limit;
                let mut lines: Vec<String> = leaves
                    .iter()
                    .take(limit)
                    .map(|leaf| self.usage(leaf).to_string())
                    .collect();
                if leaves.len() > limit {
                    lines.push(self.settings.help.ellipsis.clone());
                }
                lines.join("\n")
            }
        })
    }

    fn entry(&self, node: &Rc<Node>) -> String {
        let usage = self.usage(node);
        match node.description() {
            Some(description) => format!(
                "{usage} <gray>- {}</gray>",
                escape_markup(description)
            ),
            None => usage.to_string(),
        }
    }

    /// Help for `node` as seen by a subject.
    ///
    /// `allowed` receives the permissions between `node` and an entry and
    /// decides whether the subject may see it. Entries are paginated by
    /// `page_size`; hidden entries are summarized in one line, which is the
    /// only line when nothing is visible.
    pub fn help(
        &self,
        node: &Rc<Node>,
        page: usize,
        allowed: impl Fn(&[String]) -> bool,
    ) -> HelpPage {
        let leaves = node.leaves();
        let (visible, hidden): (Vec<_>, Vec<_>) = leaves
            .iter()
            .partition(|leaf| Rc::ptr_eq(*leaf, node) || allowed(&leaf.permissions_below(node)));
        let hidden = hidden.len();

        let page_size = self.settings.help.page_size.max(1);
        let pages = visible.len().div_ceil(page_size).max(1);
        let page = page.clamp(1, pages);

        let mut lines: Vec<String> = visible
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|leaf| self.entry(leaf))
            .collect();

        if hidden > 0 {
            lines.push(fill(
                &self.settings.messages.hidden_by_permission,
                &hidden.to_string(),
            ));
        }
        if pages > 1 {
            lines.push(fill(
                &self.settings.messages.page_footer,
                &format!("{page}/{pages}"),
            ));
        }

        HelpPage {
            lines,
            page,
            pages,
            hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlainFormatter, TextFormatter};
    use crate::tree::CommandTree;
    use pretty_assertions::assert_eq;

    fn plain(markup: &str) -> String {
        PlainFormatter.render(markup)
    }

    fn wide_group(children: usize) -> CommandTree {
        let mut builder = CommandTree::builder("kit");
        for i in 0..children {
            builder = builder.sub_command(format!("k{i}"), move |c| {
                c.permission(format!("kit.k{i}")).executes(|_| Ok(()))
            });
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_leaf_usage_exact() {
        let tree = CommandTree::builder("label")
            .main_command(|c| {
                c.add_int("x")
                    .add_word("y")
                    .set_optional()
                    .executes(|_| Ok(()))
            })
            .build()
            .unwrap();
        let settings = CommandSettings::default();
        let usage = UsageGenerator::new(&settings).usage(tree.root()).to_string();

        assert_eq!(plain(&usage), "label <x: integer> [y: text with no spaces]");
    }

    #[test]
    fn test_usage_is_colored_by_kind() {
        let tree = CommandTree::builder("eco")
            .sub_command("give", |c| {
                c.add_player("player")
                    .add_double("amount")
                    .add_bool("silent")
                    .set_optional()
                    .add_item("item")
                    .set_optional()
                    .executes(|_| Ok(()))
            })
            .build()
            .unwrap();
        let settings = CommandSettings::default();
        let give = tree.root().child("give").unwrap();
        let usage = UsageGenerator::new(&settings).usage(give);

        assert_eq!(
            usage,
            "<gold>eco</gold> <yellow>give</yellow> <blue>\\<player></blue> \
             <aqua>\\<amount: decimal></aqua> <light_purple>[silent: boolean]</light_purple> \
             <dark_aqua>[item]</dark_aqua>"
        );
    }

    #[test]
    fn test_usage_is_cached() {
        let tree = wide_group(2);
        let settings = CommandSettings::default();
        let leaf = tree.root().child("k0").unwrap();

        let first = UsageGenerator::new(&settings).usage(leaf).as_ptr();

        let mut other = CommandSettings::default();
        other.style.command = "red".to_string();
        let second = UsageGenerator::new(&other).usage(leaf);

        assert_eq!(first, second.as_ptr());
        assert!(second.contains("<yellow>k0</yellow>"));
    }

    #[test]
    fn test_listing_truncates_after_eight() {
        let tree = wide_group(10);
        let settings = CommandSettings::default();
        let listing = plain(UsageGenerator::new(&settings).listing(tree.root()));
        let lines: Vec<_> = listing.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "kit k0");
        assert_eq!(lines[7], "kit k7");
        assert_eq!(lines[8], "...");
    }

    #[test]
    fn test_listing_expands_nested_groups() {
        let tree = CommandTree::builder("warp")
            .sub_command("list", |c| c.executes(|_| Ok(())))
            .sub_group("admin", |g| {
                g.sub_command("set", |c| c.add_word("name").executes(|_| Ok(())))
            })
            .build()
            .unwrap();
        let settings = CommandSettings::default();
        let listing = plain(UsageGenerator::new(&settings).listing(tree.root()));

        assert_eq!(listing, "warp list\nwarp admin set <name: text with no spaces>");
    }

    #[test]
    fn test_help_filters_by_permission() {
        let tree = wide_group(10);
        let settings = CommandSettings::default();
        let allowed = ["kit.k1", "kit.k4", "kit.k9"];

        let page = UsageGenerator::new(&settings).help(tree.root(), 1, |perms| {
            perms.iter().all(|p| allowed.contains(&p.as_str()))
        });

        let lines: Vec<_> = page.lines.iter().map(|l| plain(l)).collect();
        assert_eq!(
            lines,
            vec!["kit k1", "kit k4", "kit k9", "7 hidden by permission"]
        );
        assert_eq!(page.hidden, 7);
        assert_eq!(page.pages, 1);
    }

    #[test]
    fn test_help_with_nothing_visible() {
        let tree = wide_group(10);
        let settings = CommandSettings::default();
        let page = UsageGenerator::new(&settings).help(tree.root(), 1, |perms| perms.is_empty());

        let lines: Vec<_> = page.lines.iter().map(|l| plain(l)).collect();
        assert_eq!(lines, vec!["10 hidden by permission"]);
    }

    #[test]
    fn test_help_pagination() {
        let tree = wide_group(10);
        let mut settings = CommandSettings::default();
        settings.help.page_size = 4;
        let generator = UsageGenerator::new(&settings);

        let page = generator.help(tree.root(), 3, |_| true);
        let lines: Vec<_> = page.lines.iter().map(|l| plain(l)).collect();
        assert_eq!(lines, vec!["kit k8", "kit k9", "Page 3/3"]);

        let clamped = generator.help(tree.root(), 99, |_| true);
        assert_eq!(clamped.page, 3);

        let first = generator.help(tree.root(), 0, |_| true);
        assert_eq!(first.page, 1);
        assert_eq!(first.lines.len(), 5);
    }

    #[test]
    fn test_help_for_command_includes_description() {
        let tree = CommandTree::builder("home")
            .main_command(|c| {
                c.description("Go <home>")
                    .permission("home.use")
                    .executes(|_| Ok(()))
            })
            .build()
            .unwrap();
        let settings = CommandSettings::default();
        let page = UsageGenerator::new(&settings).help(tree.root(), 1, |_| false);

        let lines: Vec<_> = page.lines.iter().map(|l| plain(l)).collect();
        assert_eq!(lines, vec!["home - Go <home>"]);
    }
}
