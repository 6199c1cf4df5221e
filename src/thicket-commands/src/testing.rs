//! Fakes shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use uuid::Uuid;

use crate::platform::{
    CommandSender, Message, PermissionEvaluator, Platform, PlayerRef, SelectorResolver,
};

/// A sender that records what it is sent.
pub(crate) struct TestSender {
    name: String,
    id: Option<Uuid>,
    inbox: RefCell<Vec<Message>>,
}

impl TestSender {
    pub(crate) fn player(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: Some(Uuid::new_v4()),
            inbox: RefCell::default(),
        }
    }

    pub(crate) fn console() -> Self {
        Self {
            name: "CONSOLE".to_string(),
            id: None,
            inbox: RefCell::default(),
        }
    }

    /// Drain the messages received so far.
    pub(crate) fn messages(&self) -> Vec<Message> {
        self.inbox.take()
    }

    /// Drain the texts received so far.
    pub(crate) fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.text).collect()
    }
}

impl CommandSender for TestSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn player_id(&self) -> Option<Uuid> {
        self.id
    }

    fn send_message(&self, message: Message) {
        self.inbox.borrow_mut().push(message);
    }
}

/// Permissions granted to every sender. Clones share the set.
#[derive(Clone, Default)]
pub(crate) struct Grants(Rc<RefCell<HashSet<String>>>);

impl Grants {
    pub(crate) fn grant(&self, permission: &str) {
        self.0.borrow_mut().insert(permission.to_string());
    }

    pub(crate) fn revoke(&self, permission: &str) {
        self.0.borrow_mut().remove(permission);
    }
}

impl PermissionEvaluator for Grants {
    fn has(&self, _sender: &dyn CommandSender, permission: &str) -> bool {
        self.0.borrow().contains(permission)
    }
}

/// Online players, matched by name ignoring case. `@a` selects everyone.
pub(crate) struct Roster(Vec<PlayerRef>);

impl SelectorResolver for Roster {
    fn resolve_player(&self, _sender: &dyn CommandSender, input: &str) -> Option<PlayerRef> {
        self.0
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(input))
            .cloned()
    }

    fn resolve_players(&self, sender: &dyn CommandSender, input: &str) -> Vec<PlayerRef> {
        if input == "@a" {
            return self.0.clone();
        }
        self.resolve_player(sender, input).into_iter().collect()
    }

    fn online_players(&self) -> Vec<String> {
        self.0.iter().map(|p| p.name.clone()).collect()
    }
}

/// A platform with the given grants and online players.
pub(crate) fn test_platform(permissions: &[&str], players: &[&str]) -> (Rc<Platform>, Grants) {
    let grants = Grants::default();
    for permission in permissions {
        grants.grant(permission);
    }
    let roster = Roster(
        players
            .iter()
            .enumerate()
            .map(|(i, name)| PlayerRef::new(Uuid::from_u128(i as u128 + 1), *name))
            .collect(),
    );
    (Rc::new(Platform::new(grants.clone(), roster)), grants)
}
