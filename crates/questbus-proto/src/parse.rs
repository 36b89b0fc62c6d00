//! Text-to-command parsing.
//!
//! A line starting with the prefix character is a command: the first
//! whitespace-delimited token (minus the prefix) is the topic and the rest are
//! arguments. Anything else is plain text on the empty topic. There is no
//! quoting or escaping, and any string is a legal topic.

use crate::command::ParsedCommand;

/// The prefix marking a line as a command.
pub const DEFAULT_PREFIX: char = '/';

/// Parses text with a fixed command prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parser {
    prefix: char,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX,
        }
    }
}

impl Parser {
    /// Create a parser recognising `prefix` as the command marker.
    pub fn with_prefix(prefix: char) -> Self {
        Self { prefix }
    }

    /// The command marker this parser recognises.
    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Parse a line of text.
    ///
    /// Returns `None` for empty text; nothing should be published for it.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        if text.is_empty() {
            return None;
        }

        let Some(rest) = text.strip_prefix(self.prefix) else {
            return Some(ParsedCommand::plain(text));
        };

        let mut tokens = rest.split_whitespace();
        // `rest` may start with whitespace ("/ foo"), in which case the
        // topic token is empty and everything after it is arguments.
        let topic = if rest.starts_with(char::is_whitespace) {
            String::new()
        } else {
            tokens.next().unwrap_or_default().to_string()
        };
        let args: Vec<String> = tokens.map(str::to_string).collect();
        let body = args.join(" ");

        Some(ParsedCommand { topic, body, args })
    }
}

/// Parse `text` with the default `/` prefix.
pub fn parse(text: &str) -> Option<ParsedCommand> {
    Parser::default().parse(text)
}
