//! Tab completion over a command tree.
//!
//! Completion follows the same walk as execution. At a group it offers the
//! children the sender may see; at a command it asks the argument at the
//! cursor for candidates, falling back to defaults for booleans and
//! players. Everything is prefix-filtered ignoring case.

use std::rc::Rc;

use indexmap::IndexSet;

use crate::argument::{ArgumentKind, ArgumentSpec, SuggestionContext};
use crate::dispatch::Dispatcher;
use crate::node::{CommandSpec, Node, NodeKind};
use crate::parser::Tokenizer;
use crate::platform::{CommandSender, SelectorResolver};

/// Selectors offered for player-list arguments.
pub const PLAYER_SELECTORS: [&str; 4] = ["@a", "@p", "@r", "@s"];

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Candidates an argument offers when it has no explicit provider.
pub fn default_candidates(kind: &ArgumentKind, selectors: &dyn SelectorResolver) -> Vec<String> {
    match kind {
        ArgumentKind::Bool => vec!["true".to_string(), "false".to_string()],
        ArgumentKind::Player => selectors.online_players(),
        ArgumentKind::Players => {
            let mut names = selectors.online_players();
            names.extend(PLAYER_SELECTORS.iter().map(|s| s.to_string()));
            names
        }
        _ => Vec::new(),
    }
}

// ============================================================
// COMPLETION
// ============================================================

impl Dispatcher {
    /// Candidates for the last token, given the tokens that followed the
    /// root label. The last token is the partial one and may be empty.
    pub fn suggest(&self, sender: &dyn CommandSender, tokens: &[String]) -> Vec<String> {
        let (partial, complete) = match tokens.split_last() {
            Some((partial, complete)) => (partial.as_str(), complete),
            None => ("", tokens),
        };

        let (node, consumed) = self.walk(complete);
        if !self.can_use(sender, &node) {
            return Vec::new();
        }

        let candidates = match node.kind() {
            NodeKind::Group(_) if consumed == complete.len() => self.child_labels(sender, &node),
            NodeKind::Group(_) => Vec::new(),
            NodeKind::Command(spec) => {
                if spec.player_only && !sender.is_player() {
                    return Vec::new();
                }
                self.argument_candidates(sender, spec, &complete[consumed..], partial)
            }
        };

        let matching: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| starts_with_ignore_case(candidate, partial))
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        tracing::trace!(
            "Completed '{}' under {} with {} candidates",
            partial,
            node.full_path(),
            matching.len()
        );
        matching
    }

    /// Tokenize a line that is still being typed and complete it.
    pub fn suggest_line(&self, sender: &dyn CommandSender, line: &str) -> Vec<String> {
        self.suggest(sender, &Tokenizer::split_partial(line))
    }

    fn child_labels(&self, sender: &dyn CommandSender, group: &Rc<Node>) -> Vec<String> {
        group
            .children()
            .filter(|child| {
                self.platform()
                    .has_all(sender, child.permission().into_iter())
            })
            .map(|child| child.label().to_string())
            .collect()
    }

    fn argument_candidates(
        &self,
        sender: &dyn CommandSender,
        spec: &CommandSpec,
        previous: &[String],
        partial: &str,
    ) -> Vec<String> {
        let Some((index, argument)) = argument_at(&spec.arguments, previous.len()) else {
            return Vec::new();
        };
        match &argument.suggestions {
            Some(provider) => provider.candidates(&SuggestionContext {
                sender,
                index,
                previous,
                partial,
            }),
            None => default_candidates(&argument.kind, self.platform().selectors()),
        }
    }
}

/// The argument under the cursor. A trailing greedy argument keeps
/// absorbing positions past its own.
fn argument_at(arguments: &[ArgumentSpec], position: usize) -> Option<(usize, &ArgumentSpec)> {
    match arguments.get(position) {
        Some(argument) => Some((position, argument)),
        None => arguments
            .last()
            .filter(|last| last.kind == ArgumentKind::Greedy)
            .map(|last| (arguments.len() - 1, last)),
    }
}
