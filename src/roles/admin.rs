//! Oversight role: sees what players say and what the bot tells them.

use super::{not_from_sender, topics};
use crate::bus::{Combinator, CommandBus, Teardown};
use crate::output::{Output, write_logged};
use questbus_proto::Command;
use std::sync::Arc;
use tracing::{Instrument, debug, info};

/// Admin role handle. Dropping it does not stop the role; call
/// [`Admin::destroy`].
pub struct Admin {
    user_id: String,
    output: Arc<dyn Output>,
    teardown: Teardown,
}

impl Admin {
    /// Subscribe to player traffic (bot responses, plain text and answers,
    /// excluding the admin's own) and start forwarding it to `output`.
    pub async fn spawn(user_id: &str, bus: &CommandBus, output: Arc<dyn Output>) -> Self {
        let teardown = Teardown::new();

        let mut inputs = Vec::with_capacity(3);
        for topic in [topics::USER_RESPONSE, topics::PLAIN, topics::ANSWER] {
            let sub = bus
                .filtered_subscribe(
                    topic,
                    not_from_sender(user_id.to_string()),
                    teardown.child_token(),
                )
                .await;
            inputs.push(sub);
        }
        let combinator = Combinator::spawn(inputs, teardown.clone());

        let span = crate::telemetry::role("admin", user_id);
        tokio::spawn(handle_forwards(combinator, Arc::clone(&output)).instrument(span));
        info!(user_id = %user_id, "Admin started");

        Self {
            user_id: user_id.to_string(),
            output,
            teardown,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub async fn greeting(&self) {
        write_logged(self.output.as_ref(), "Hello, admin").await;
    }

    /// Stop the role. Returns `false` if it was already stopped.
    pub fn destroy(&self) -> bool {
        let fired = self.teardown.destroy();
        if fired {
            info!(user_id = %self.user_id, "Admin destroyed");
        }
        fired
    }
}

/// Render a forwarded command for the admin.
///
/// Sender name, a separator line, an `!Answer:` marker for answers, then the
/// body. Falls back to the sender id when no display name was attached.
pub fn format_forward(cmd: &Command) -> String {
    let sender = cmd.sender_name().unwrap_or(cmd.sender_id());
    let mut msg = format!("{sender}\n=====\n");
    if cmd.topic() == topics::ANSWER {
        msg.push_str("!Answer: ");
    }
    msg.push_str(cmd.body());
    msg
}

async fn handle_forwards(mut combinator: Combinator, output: Arc<dyn Output>) {
    while let Some(cmd) = combinator.recv().await {
        write_logged(output.as_ref(), &format_forward(&cmd)).await;
    }
    debug!("Admin handler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use questbus_proto::{Attributes, SENDER_NAME, parse};

    fn cmd(text: &str, name: Option<&str>) -> Command {
        let mut attributes = Attributes::new();
        if let Some(name) = name {
            attributes.insert(SENDER_NAME.to_string(), name.to_string());
        }
        Command::new(parse(text).unwrap(), "7", attributes)
    }

    #[test]
    fn format_plain_text() {
        assert_eq!(
            format_forward(&cmd("where am I", Some("Jane Doe"))),
            "Jane Doe\n=====\nwhere am I"
        );
    }

    #[test]
    fn format_answer() {
        assert_eq!(
            format_forward(&cmd("/a forty two", Some("Jane Doe"))),
            "Jane Doe\n=====\n!Answer: forty two"
        );
    }

    #[test]
    fn format_without_name_uses_id() {
        assert_eq!(format_forward(&cmd("/userres hi", None)), "7\n=====\nhi");
    }
}
