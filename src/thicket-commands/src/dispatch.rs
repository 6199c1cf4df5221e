//! Running invocations against a built tree.
//!
//! The host hands the dispatcher the tokens that followed the root label.
//! The dispatcher walks groups while tokens match child labels, applies the
//! guards of the node it stopped at, parses arguments and runs the leaf.
//! Every failure is turned into a message for the sender here, so nothing
//! reaches the host as an error.

use std::rc::Rc;

use crate::argument::Arguments;
use crate::context::CommandContext;
use crate::error::CommandError;
use crate::node::{Node, NodeKind};
use crate::parser::Tokenizer;
use crate::platform::{CommandSender, Platform, escape_markup};
use crate::settings::fill;
use crate::tree::CommandTree;
use crate::usage::UsageGenerator;

/// Why an invocation was turned away before any argument was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    PlayerOnly,
    PermissionDenied,
    /// A group received a token that names none of its children.
    UnknownSubcommand(String),
}

/// What happened to an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The executor ran and returned `Ok`.
    Executed,
    /// Help was shown instead of running anything.
    Help { page: usize, pages: usize },
    /// A guard stopped the invocation.
    Rejected(Rejection),
    /// Parsing or the executor failed; the sender was told why.
    Failed(CommandError),
    /// The executor stopped early on purpose.
    Exited,
}

impl DispatchOutcome {
    /// Returns true if the executor ran to completion.
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }
}

// ============================================================
// DISPATCHER
// ============================================================

/// Entry point for one root command.
///
/// Cheap to clone; clones share the tree and platform.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tree: Rc<CommandTree>,
    platform: Rc<Platform>,
}

impl Dispatcher {
    pub fn new(tree: Rc<CommandTree>, platform: Rc<Platform>) -> Self {
        Self { tree, platform }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub(crate) fn usage(&self) -> UsageGenerator<'_> {
        UsageGenerator::new(self.platform.settings())
    }

    /// Descend through groups while tokens name children. Returns the node
    /// reached and how many tokens were consumed.
    pub(crate) fn walk(&self, tokens: &[String]) -> (Rc<Node>, usize) {
        let mut node = Rc::clone(self.tree.root());
        let mut consumed = 0;
        while let Some(token) = tokens.get(consumed) {
            let Some(child) = node.child(token).cloned() else {
                break;
            };
            node = child;
            consumed += 1;
        }
        (node, consumed)
    }

    /// Returns true if the sender holds every permission from the root down
    /// to `node`.
    pub(crate) fn can_use(&self, sender: &dyn CommandSender, node: &Rc<Node>) -> bool {
        let permissions = node.effective_permissions();
        self.platform
            .has_all(sender, permissions.iter().map(String::as_str))
    }

    /// Run the tokens that followed the root label.
    pub fn execute(&self, sender: &dyn CommandSender, tokens: &[String]) -> DispatchOutcome {
        let (node, consumed) = self.walk(tokens);
        let rest = &tokens[consumed..];
        tracing::trace!(
            "Dispatching /{} for {}: reached '{}' with {} tokens left",
            self.tree.label(),
            sender.name(),
            node.full_path(),
            rest.len()
        );

        if let Some(rejection) = self.check_guards(sender, &node) {
            return self.reject(sender, &node, rejection);
        }

        match node.kind() {
            NodeKind::Group(_) => match rest.first() {
                None => self.send_help(sender, &node, 1),
                Some(token) => match token.parse::<usize>() {
                    Ok(page) => self.send_help(sender, &node, page),
                    Err(_) => self.reject(
                        sender,
                        &node,
                        Rejection::UnknownSubcommand(token.clone()),
                    ),
                },
            },
            NodeKind::Command(spec) => {
                if node.is_root() && rest.is_empty() && spec.has_required_arguments() {
                    return self.send_help(sender, &node, 1);
                }

                let args = match Arguments::parse(&spec.arguments, rest) {
                    Ok(args) => args,
                    Err(err) => return self.fail(sender, &node, err),
                };
                let ctx = CommandContext::new(sender, &self.platform, &node, args);
                match (spec.executor)(&ctx) {
                    Ok(()) => {
                        tracing::trace!("Executed {} for {}", node.full_path(), sender.name());
                        DispatchOutcome::Executed
                    }
                    Err(err) => self.fail(sender, &node, err),
                }
            }
        }
    }

    /// Tokenize a raw line (without the root label) and run it.
    pub fn execute_line(&self, sender: &dyn CommandSender, line: &str) -> DispatchOutcome {
        self.execute(sender, &Tokenizer::split(line))
    }

    fn check_guards(&self, sender: &dyn CommandSender, node: &Rc<Node>) -> Option<Rejection> {
        if node.as_command().is_some_and(|spec| spec.player_only) && !sender.is_player() {
            return Some(Rejection::PlayerOnly);
        }
        if !self.can_use(sender, node) {
            return Some(Rejection::PermissionDenied);
        }
        None
    }

    fn reject(
        &self,
        sender: &dyn CommandSender,
        node: &Rc<Node>,
        rejection: Rejection,
    ) -> DispatchOutcome {
        tracing::debug!(
            "Rejected {} for {}: {:?}",
            node.full_path(),
            sender.name(),
            rejection
        );
        let messages = &self.platform.settings().messages;
        let message = match &rejection {
            Rejection::PlayerOnly => self.platform.message(&messages.player_only),
            Rejection::PermissionDenied => self.platform.message(&messages.permission_denied),
            Rejection::UnknownSubcommand(_) => self
                .platform
                .message_with_hover(&messages.unknown_subcommand, self.usage().listing(node)),
        };
        sender.send_message(message);
        DispatchOutcome::Rejected(rejection)
    }

    fn send_help(&self, sender: &dyn CommandSender, node: &Rc<Node>, page: usize) -> DispatchOutcome {
        let help = self.usage().help(node, page, |permissions| {
            self.platform
                .has_all(sender, permissions.iter().map(String::as_str))
        });
        for line in &help.lines {
            sender.send_message(self.platform.message(line));
        }
        DispatchOutcome::Help {
            page: help.page,
            pages: help.pages,
        }
    }

    fn fail(&self, sender: &dyn CommandSender, node: &Rc<Node>, err: CommandError) -> DispatchOutcome {
        let messages = &self.platform.settings().messages;
        let template = match &err {
            CommandError::Exit(message) => {
                if let Some(message) = message {
                    sender.send_message(self.platform.message(message));
                }
                return DispatchOutcome::Exited;
            }
            CommandError::PermissionDenied => &messages.permission_denied,
            CommandError::PlayerOnly => &messages.player_only,
            CommandError::MissingArgument { .. } => &messages.missing_argument,
            CommandError::InvalidArgumentType { .. } => &messages.invalid_argument,
            CommandError::InvalidSelector { .. } => &messages.invalid_selector,
            CommandError::TooManyArguments { .. } => &messages.too_many_arguments,
        };
        tracing::debug!("{} failed for {}: {}", node.full_path(), sender.name(), err);

        if err.is_guard() {
            sender.send_message(self.platform.message(template));
            return DispatchOutcome::Failed(err);
        }

        let subject = match &err {
            CommandError::TooManyArguments { input } => input.as_str(),
            other => other.argument_label().unwrap_or_default(),
        };
        let text = fill(template, &escape_markup(subject));
        sender.send_message(
            self.platform
                .message_with_hover(&text, self.usage().usage(node)),
        );
        DispatchOutcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestSender, test_platform};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn tokens(line: &str) -> Vec<String> {
        Tokenizer::split(line)
    }

    fn eco(ran: Rc<Cell<i32>>) -> CommandTree {
        CommandTree::builder("eco")
            .sub_command("give", move |c| {
                c.permission("eco.give")
                    .add_player("target")
                    .add_int_with_range("amount", 1, 1000)
                    .executes(move |ctx| {
                        let amount: i32 = ctx.get("amount")?;
                        let target = ctx.player("target")?;
                        ran.set(ran.get() + amount);
                        ctx.reply(&format!("Gave {amount} to {}", target.name));
                        Ok(())
                    })
            })
            .sub_command("fly", |c| c.player_only().executes(|_| Ok(())))
            .sub_command("quit", |c| {
                c.add_bool("loud")
                    .set_optional()
                    .executes(|ctx| match ctx.get_or("loud", false) {
                        true => Err(CommandError::exit_with("Bye!")),
                        false => Err(CommandError::exit()),
                    })
            })
            .build()
            .unwrap()
    }

    fn dispatcher(tree: CommandTree, permissions: &[&str]) -> Dispatcher {
        let (platform, _) = test_platform(permissions, &["Steve", "Alex"]);
        Dispatcher::new(Rc::new(tree), platform)
    }

    #[test]
    fn test_executes_leaf() {
        let ran = Rc::new(Cell::new(0));
        let dispatcher = dispatcher(eco(Rc::clone(&ran)), &["eco.give"]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("GIVE steve 5"));

        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(ran.get(), 5);
        assert_eq!(sender.texts(), vec!["Gave 5 to Steve"]);
    }

    #[test]
    fn test_missing_argument_message_has_usage_hover() {
        let dispatcher = dispatcher(eco(Rc::default()), &["eco.give"]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("give Steve"));

        assert_matches!(outcome, DispatchOutcome::Failed(CommandError::MissingArgument { ref label }) if label == "amount");
        let messages = sender.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Missing argument: 'amount'");
        assert_eq!(
            messages[0].hover.as_deref(),
            Some("eco give <target: player> <amount: integer>")
        );
    }

    #[test]
    fn test_invalid_and_out_of_range_values() {
        let ran = Rc::new(Cell::new(0));
        let dispatcher = dispatcher(eco(Rc::clone(&ran)), &["eco.give"]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("give Steve lots"));
        assert_matches!(outcome, DispatchOutcome::Failed(CommandError::InvalidArgumentType { .. }));

        let outcome = dispatcher.execute(&sender, &tokens("give Steve 5000"));
        assert_matches!(outcome, DispatchOutcome::Failed(CommandError::InvalidArgumentType { .. }));

        assert_eq!(ran.get(), 0);
        assert_eq!(
            sender.texts(),
            vec!["Invalid value for 'amount'", "Invalid value for 'amount'"]
        );
    }

    #[test]
    fn test_unknown_player_is_invalid_selector() {
        let dispatcher = dispatcher(eco(Rc::default()), &["eco.give"]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("give Herobrine 5"));

        assert_matches!(outcome, DispatchOutcome::Failed(CommandError::InvalidSelector { .. }));
        assert_eq!(sender.texts(), vec!["No player matches 'target'"]);
    }

    #[test]
    fn test_permission_guard_runs_before_parsing() {
        let dispatcher = dispatcher(eco(Rc::default()), &[]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("give"));

        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(Rejection::PermissionDenied)
        );
        assert_eq!(sender.texts(), vec!["You don't have permission to do that."]);
    }

    #[test]
    fn test_player_only_guard() {
        let dispatcher = dispatcher(eco(Rc::default()), &[]);
        let console = TestSender::console();

        let outcome = dispatcher.execute(&console, &tokens("fly"));
        assert_eq!(outcome, DispatchOutcome::Rejected(Rejection::PlayerOnly));
        assert_eq!(console.texts(), vec!["Only players can use this command."]);

        let player = TestSender::player("Notch");
        assert!(dispatcher.execute(&player, &tokens("fly")).is_executed());
    }

    #[test]
    fn test_player_only_checked_before_permission() {
        let tree = CommandTree::builder("fly")
            .main_command(|c| c.player_only().permission("fly.use").executes(|_| Ok(())))
            .build()
            .unwrap();
        let dispatcher = dispatcher(tree, &[]);
        let console = TestSender::console();

        let outcome = dispatcher.execute(&console, &[]);
        assert_eq!(outcome, DispatchOutcome::Rejected(Rejection::PlayerOnly));
        assert_eq!(console.texts(), vec!["Only players can use this command."]);

        let player = TestSender::player("Notch");
        assert_eq!(
            dispatcher.execute(&player, &[]),
            DispatchOutcome::Rejected(Rejection::PermissionDenied)
        );
    }

    #[test]
    fn test_exit_with_and_without_message() {
        let dispatcher = dispatcher(eco(Rc::default()), &[]);
        let sender = TestSender::player("Notch");

        assert_eq!(dispatcher.execute(&sender, &tokens("quit")), DispatchOutcome::Exited);
        assert!(sender.texts().is_empty());

        assert_eq!(
            dispatcher.execute(&sender, &tokens("quit true")),
            DispatchOutcome::Exited
        );
        assert_eq!(sender.texts(), vec!["Bye!"]);
    }

    #[test]
    fn test_too_many_arguments() {
        let dispatcher = dispatcher(eco(Rc::default()), &[]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("quit true now"));

        assert_matches!(outcome, DispatchOutcome::Failed(CommandError::TooManyArguments { .. }));
        assert_eq!(sender.texts(), vec!["Too many arguments"]);
    }

    #[test]
    fn test_group_help_and_pages() {
        let dispatcher = dispatcher(eco(Rc::default()), &["eco.give"]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &[]);
        assert_eq!(outcome, DispatchOutcome::Help { page: 1, pages: 1 });
        assert_eq!(
            sender.texts(),
            vec![
                "eco give <target: player> <amount: integer>",
                "eco fly",
                "eco quit [loud: boolean]",
            ]
        );

        let outcome = dispatcher.execute(&sender, &tokens("2"));
        assert_eq!(outcome, DispatchOutcome::Help { page: 1, pages: 1 });
    }

    #[test]
    fn test_help_follows_permission_changes() {
        let (platform, grants) = test_platform(&["eco.give"], &[]);
        let dispatcher = Dispatcher::new(Rc::new(eco(Rc::default())), platform);
        let sender = TestSender::player("Notch");

        dispatcher.execute(&sender, &[]);
        assert_eq!(sender.texts().len(), 3);

        grants.revoke("eco.give");
        dispatcher.execute(&sender, &[]);
        assert_eq!(
            sender.texts(),
            vec!["eco fly", "eco quit [loud: boolean]", "1 hidden by permission"]
        );
    }

    #[test]
    fn test_unknown_subcommand_hovers_listing() {
        let dispatcher = dispatcher(eco(Rc::default()), &[]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &tokens("lend Steve"));

        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(Rejection::UnknownSubcommand("lend".to_string()))
        );
        let messages = sender.messages();
        assert_eq!(messages[0].text, "Unknown subcommand.");
        assert_eq!(
            messages[0].hover.as_deref(),
            Some("eco give <target: player> <amount: integer>\neco fly\neco quit [loud: boolean]")
        );
    }

    #[test]
    fn test_root_main_command_without_tokens_shows_usage() {
        let tree = CommandTree::builder("tp")
            .main_command(|c| {
                c.description("Teleport")
                    .add_player("target")
                    .executes(|_| Ok(()))
            })
            .build()
            .unwrap();
        let dispatcher = dispatcher(tree, &[]);
        let sender = TestSender::player("Notch");

        let outcome = dispatcher.execute(&sender, &[]);

        assert_eq!(outcome, DispatchOutcome::Help { page: 1, pages: 1 });
        assert_eq!(sender.texts(), vec!["tp <target: player> - Teleport"]);
    }

    #[test]
    fn test_execute_line_honors_quotes() {
        let said = Rc::new(std::cell::RefCell::new(String::new()));
        let sink = Rc::clone(&said);
        let tree = CommandTree::builder("say")
            .main_command(move |c| {
                c.add_string("text").executes(move |ctx| {
                    *sink.borrow_mut() = ctx.get("text")?;
                    Ok(())
                })
            })
            .build()
            .unwrap();
        let dispatcher = dispatcher(tree, &[]);
        let sender = TestSender::player("Notch");

        assert!(dispatcher.execute_line(&sender, r#""hello world""#).is_executed());
        assert_eq!(*said.borrow(), "hello world");
    }
}
