//! Boolean chains over argument presence and equality.
//!
//! ```rust,ignore
//! args.if_provided("amount")
//!     .and_if_equal("mode", &"add".to_string())
//!     .then(|| add(amount))
//!     .or_end(|| show_balance());
//! ```
//!
//! Once a branch has run the chain is spent: later `and`/`or` steps are not
//! evaluated and no other branch fires.

use super::{Arguments, FromArgument};

/// A condition being built over a set of [`Arguments`].
#[derive(Debug, Clone, Copy)]
pub struct Conditional<'a> {
    args: &'a Arguments,
    value: bool,
    operational: bool,
}

impl<'a> Conditional<'a> {
    pub(crate) fn new(args: &'a Arguments, value: bool) -> Self {
        Self {
            args,
            value,
            operational: true,
        }
    }

    /// Current value of the condition.
    pub fn is_true(&self) -> bool {
        self.value
    }

    /// Returns false once a branch has fired.
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    fn and_with(mut self, check: impl FnOnce(&Arguments) -> bool) -> Self {
        if self.operational && self.value {
            self.value = check(self.args);
        }
        self
    }

    fn or_with(mut self, check: impl FnOnce(&Arguments) -> bool) -> Self {
        if self.operational && !self.value {
            self.value = check(self.args);
        }
        self
    }

    pub fn and_if_provided(self, name: &str) -> Self {
        self.and_with(|args| args.is_provided(name))
    }

    pub fn and_if_equal<T: FromArgument + PartialEq>(self, name: &str, expected: &T) -> Self {
        self.and_with(|args| args.is_equal(name, expected))
    }

    pub fn and_if_true(self, condition: bool) -> Self {
        self.and_with(|_| condition)
    }

    pub fn or_if_provided(self, name: &str) -> Self {
        self.or_with(|args| args.is_provided(name))
    }

    pub fn or_if_equal<T: FromArgument + PartialEq>(self, name: &str, expected: &T) -> Self {
        self.or_with(|args| args.is_equal(name, expected))
    }

    pub fn or_if_true(self, condition: bool) -> Self {
        self.or_with(|_| condition)
    }

    /// Run `f` if the condition holds, then spend the chain.
    pub fn then(mut self, f: impl FnOnce()) -> Self {
        if self.operational && self.value {
            f();
            self.operational = false;
        }
        self
    }

    /// Run `f` if the condition does not hold, then spend the chain.
    pub fn or_else(mut self, f: impl FnOnce()) -> Self {
        if self.operational && !self.value {
            f();
            self.operational = false;
        }
        self
    }

    /// Like [`then`](Self::then), ending the chain. Returns whether `f` ran.
    pub fn then_end(self, f: impl FnOnce()) -> bool {
        let ran = self.operational && self.value;
        self.then(f);
        ran
    }

    /// Like [`or_else`](Self::or_else), ending the chain. Returns whether `f` ran.
    pub fn or_end(self, f: impl FnOnce()) -> bool {
        let ran = self.operational && !self.value;
        self.or_else(f);
        ran
    }
}
