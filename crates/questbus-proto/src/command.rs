//! Command types.

use std::collections::HashMap;
use std::fmt;

/// Topic identifier. The empty string is the plain-text topic.
pub type Topic = String;

/// Out-of-band metadata travelling with a command (keys are unique).
pub type Attributes = HashMap<String, String>;

/// Attribute key carrying the sender's display name.
pub const SENDER_NAME: &str = "sender_name";

/// The result of parsing a line of text, before it is attributed to a sender.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedCommand {
    /// Topic token with the prefix stripped, or `""` for plain text.
    pub topic: Topic,
    /// Text after the topic token (the whole line for plain text).
    pub body: String,
    /// Whitespace-separated tokens after the topic token.
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Build a plain-text command: empty topic, the whole line as body.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            topic: Topic::new(),
            body: text.into(),
            args: Vec::new(),
        }
    }

    /// Returns `true` if this is plain text rather than a prefixed command.
    pub fn is_plain(&self) -> bool {
        self.topic.is_empty() && self.args.is_empty()
    }
}

/// One routed unit of input.
///
/// A `Command` is immutable once built. The only constructor takes the parsed
/// line together with the sender identity, so a topic never exists without
/// the sender that published it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    topic: Topic,
    body: String,
    args: Vec<String>,
    sender_id: String,
    attributes: Attributes,
}

impl Command {
    /// Attribute a parsed line to its sender.
    pub fn new(parsed: ParsedCommand, sender_id: impl Into<String>, attributes: Attributes) -> Self {
        let ParsedCommand { topic, body, args } = parsed;
        Self {
            topic,
            body,
            args,
            sender_id: sender_id.into(),
            attributes,
        }
    }

    /// Topic this command is routed under.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Text after the topic token.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Arguments following the topic token.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Opaque identity of the originating user or session.
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// All attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The sender's display name, if one was attached.
    pub fn sender_name(&self) -> Option<&str> {
        self.attribute(SENDER_NAME)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.topic.is_empty() {
            write!(f, "<{}> {}", self.sender_id, self.body)
        } else if self.body.is_empty() {
            write!(f, "<{}> [{}]", self.sender_id, self.topic)
        } else {
            write!(f, "<{}> [{}] {}", self.sender_id, self.topic, self.body)
        }
    }
}
