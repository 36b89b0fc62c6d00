//! # questbus-proto
//!
//! The command model shared by everything that talks to the questbus
//! command router, and the rule that turns a raw line of chat text into a
//! command.
//!
//! ## Quick Start
//!
//! ```rust
//! use questbus_proto::{parse, Attributes, Command};
//!
//! let parsed = parse("/a the answer").expect("non-empty text");
//! assert_eq!(parsed.topic, "a");
//! assert_eq!(parsed.args, vec!["the", "answer"]);
//!
//! let cmd = Command::new(parsed, "user-1", Attributes::new());
//! assert_eq!(cmd.body(), "the answer");
//! assert_eq!(cmd.sender_id(), "user-1");
//! ```
//!
//! Plain text (anything not starting with the command prefix) lands on the
//! empty topic with the whole line as its body:
//!
//! ```rust
//! use questbus_proto::parse;
//!
//! let parsed = parse("hello there").expect("non-empty text");
//! assert_eq!(parsed.topic, "");
//! assert_eq!(parsed.body, "hello there");
//! assert!(parsed.args.is_empty());
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod command;
mod parse;

pub use self::command::{Attributes, Command, ParsedCommand, Topic, SENDER_NAME};
pub use self::parse::{parse, Parser, DEFAULT_PREFIX};
