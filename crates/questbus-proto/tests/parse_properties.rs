//! Property-based tests for command parsing.
//!
//! Verifies across random input that:
//! 1. Prefixed lines split into topic and arguments on whitespace
//! 2. Anything else is plain text with the whole line as body
//! 3. Parsing never attributes a sender (that is the publisher's job)

use proptest::prelude::*;
use questbus_proto::{parse, Attributes, Command, Parser};

/// A topic token: no whitespace, does not itself start with the prefix.
fn topic_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_\\-]{1,16}").expect("valid regex")
}

/// A single argument token.
fn arg_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\\s]{1,12}").expect("valid regex")
}

/// Separator of one or more whitespace characters.
fn separator_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ \t]{1,3}").expect("valid regex")
}

/// Text that never starts with the `/` prefix.
fn plain_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^/][^\n]{0,80}").expect("valid regex")
}

proptest! {
    #[test]
    fn prefixed_lines_split_into_topic_and_args(
        topic in topic_strategy(),
        args in prop::collection::vec(arg_strategy(), 0..6),
        sep in separator_strategy(),
    ) {
        let mut line = format!("/{topic}");
        for arg in &args {
            line.push_str(&sep);
            line.push_str(arg);
        }

        let parsed = parse(&line).expect("non-empty line");
        prop_assert_eq!(&parsed.topic, &topic);
        prop_assert_eq!(&parsed.args, &args);
        prop_assert_eq!(parsed.body, args.join(" "));
    }

    #[test]
    fn plain_text_keeps_whole_line(text in plain_text_strategy()) {
        let parsed = parse(&text).expect("non-empty line");
        prop_assert_eq!(parsed.topic, "");
        prop_assert_eq!(&parsed.body, &text);
        prop_assert!(parsed.args.is_empty());
    }

    #[test]
    fn custom_prefix_ignores_default(topic in topic_strategy()) {
        let parser = Parser::with_prefix('!');
        let line = format!("/{topic}");
        let parsed = parser.parse(&line).expect("non-empty line");
        prop_assert_eq!(parsed.topic, "");
        prop_assert_eq!(parsed.body, line);
    }
}

#[test]
fn empty_text_is_not_a_command() {
    assert!(parse("").is_none());
    assert!(Parser::with_prefix('!').parse("").is_none());
}

#[test]
fn sender_is_attached_after_parsing() {
    let parsed = parse("/userres hello").unwrap();
    let cmd = Command::new(parsed, "42", Attributes::new());
    assert_eq!(cmd.topic(), "userres");
    assert_eq!(cmd.sender_id(), "42");
    assert!(cmd.attributes().is_empty());
}
