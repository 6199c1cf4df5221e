//! Splitting raw input lines into positional tokens.
//!
//! Hosts that hand over a whole line (consoles, command blocks, chat
//! bridges) go through here before dispatch:
//!
//! - `give Steve 5` gives three tokens
//! - `msg Steve "hello there"` keeps the quoted text as one token
//! - `msg Steve 'it\'s fine'` honors escapes inside quotes

// ============================================================
// TOKENIZER
// ============================================================

/// Quote-aware splitter for command lines.
pub struct Tokenizer;

impl Tokenizer {
    /// Split a line into tokens.
    ///
    /// Whitespace separates tokens outside quotes. Double and single quotes
    /// group text and are removed; inside quotes `\"`, `\'`, `\\`, `\n` and
    /// `\t` are unescaped. A leading `/` is not special.
    pub fn split(line: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        let mut in_double = false;
        let mut in_single = false;

        while let Some(c) = chars.next() {
            match c {
                '"' if !in_single => {
                    in_double = !in_double;
                    quoted = true;
                }
                '\'' if !in_double => {
                    in_single = !in_single;
                    quoted = true;
                }
                '\\' if in_double || in_single => match chars.peek().copied() {
                    Some(next @ ('"' | '\'' | '\\')) => {
                        chars.next();
                        current.push(next);
                    }
                    Some('n') => {
                        chars.next();
                        current.push('\n');
                    }
                    Some('t') => {
                        chars.next();
                        current.push('\t');
                    }
                    _ => current.push('\\'),
                },
                c if c.is_whitespace() && !in_double && !in_single => {
                    if !current.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut current));
                    }
                    quoted = false;
                }
                _ => current.push(c),
            }
        }

        if !current.is_empty() || quoted {
            tokens.push(current);
        }
        tokens
    }

    /// Split a line that is still being typed.
    ///
    /// The last token is the one under the cursor: if the line ends in
    /// whitespace an empty token is appended, so completion offers the next
    /// argument rather than finishing the previous one.
    pub fn split_partial(line: &str) -> Vec<String> {
        let mut tokens = Self::split(line);
        if tokens.is_empty() || line.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }
        tokens
    }
}
