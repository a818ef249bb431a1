//! Shell token quoting
//!
//! Command lines are assembled from two kinds of tokens: literals written in
//! this crate (flags, program names, operators) and values coming from
//! records or callers (paths, hosts, messages). Only the latter are quoted.

use std::borrow::Cow;
use std::fmt;

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}

/// Quote a value for a POSIX shell
///
/// Safe tokens are returned as-is, anything else is single-quoted with
/// embedded single quotes closed, escaped and reopened.
pub fn quote(value: &str) -> Cow<'_, str> {
    if !value.is_empty() && value.chars().all(is_safe) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', "'\\''")))
    }
}

/// A command line built token by token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
    tokens: Vec<String>,
}

impl ShellCommand {
    /// Start a command; `program` may hold several literal words
    pub fn new(program: &str) -> Self {
        Self {
            tokens: vec![program.to_string()],
        }
    }

    /// Append a trusted literal
    pub fn arg(mut self, literal: impl Into<String>) -> Self {
        self.tokens.push(literal.into());
        self
    }

    /// Append several trusted literals
    pub fn args<I, S>(mut self, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(literals.into_iter().map(Into::into));
        self
    }

    /// Append an untrusted value, quoted
    pub fn value(mut self, value: impl AsRef<str>) -> Self {
        self.tokens.push(quote(value.as_ref()).into_owned());
        self
    }

    /// Append `literal` immediately followed by a quoted value, e.g. `--user=<v>`
    pub fn option(mut self, literal: &str, value: impl AsRef<str>) -> Self {
        self.tokens
            .push(format!("{}{}", literal, quote(value.as_ref())));
        self
    }

    /// `| next`
    pub fn pipe(mut self, next: ShellCommand) -> Self {
        self.tokens.push("|".to_string());
        self.tokens.extend(next.tokens);
        self
    }

    /// `> path`
    pub fn redirect_to(self, path: impl AsRef<str>) -> Self {
        self.arg(">").value(path)
    }

    /// `< path`
    pub fn read_from(self, path: impl AsRef<str>) -> Self {
        self.arg("<").value(path)
    }

    pub fn render(&self) -> String {
        self.tokens.join(" ")
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<ShellCommand> for String {
    fn from(command: ShellCommand) -> Self {
        command.render()
    }
}
