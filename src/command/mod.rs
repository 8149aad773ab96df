//! Command intents.
//!
//! Every emitter produces [`Command`] values rather than strings. A command
//! is only turned into shell text by [`Command::to_shell`] when the script is
//! rendered, so tests can assert on argv vectors and quoting lives in one
//! place.
//!
//! ## Submodules
//!
//! - `node`: container / namespace creation, removal, exec prefixes, image pull
//! - `switch`: bridge creation and removal
//! - `netns`: link activation and namespace-handle management

pub mod netns;
pub mod node;
pub mod switch;

use serde::Serialize;
use std::fmt;

/// A single command of a generated script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Program and arguments, quoted individually when rendered
    Argv(Vec<String>),
    /// A command run inside a node: `prefix` is an argv (`docker exec R1`)
    /// and `cmd` is user-written shell text appended verbatim
    Prefixed { prefix: Vec<String>, cmd: String },
    /// Shell text emitted verbatim (user hooks, variable expansion)
    Shell(String),
}

impl Command {
    /// Start an argv command
    pub fn new(program: impl Into<String>) -> Self {
        Command::Argv(vec![program.into()])
    }

    /// Verbatim shell text
    pub fn shell(text: impl Into<String>) -> Self {
        Command::Shell(text.into())
    }

    /// Append one argument. Only meaningful for argv commands; the other
    /// variants are returned unchanged.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        if let Command::Argv(argv) = &mut self {
            argv.push(arg.into());
        }
        self
    }

    /// Append several arguments
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        args.into_iter().fold(self, |cmd, arg| cmd.arg(arg))
    }

    /// The argv of an argv command
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            Command::Argv(argv) => Some(argv.as_slice()),
            _ => None,
        }
    }

    /// Render as one line of shell
    pub fn to_shell(&self) -> String {
        match self {
            Command::Argv(argv) => join_quoted(argv),
            Command::Prefixed { prefix, cmd } => format!("{} {}", join_quoted(prefix), cmd),
            Command::Shell(text) => text.clone(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell())
    }
}

fn join_quoted(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote_arg(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote a single shell word.
///
/// Words made only of characters the shell treats literally are returned as
/// they are; anything else is wrapped in single quotes.
///
/// # Examples
/// ```
/// use tinet::command::quote_arg;
///
/// assert_eq!(quote_arg("net.ipv4.ip_forward=1"), "net.ipv4.ip_forward=1");
/// assert_eq!(quote_arg("a b"), "'a b'");
/// assert_eq!(quote_arg("it's"), r"'it'\''s'");
/// ```
pub fn quote_arg(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && !arg.starts_with('#')
        && arg.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | '@' | '%' | '+' | ',' | '#')
        });

    if is_plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
