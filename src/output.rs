//! Output sinks for consumer roles.
//!
//! Roles write text through [`Output`]. A failed write is logged and
//! counted by [`write_logged`] and never reaches the bus.

use crate::bus::CommandBus;
use crate::metrics;
use crate::roles::topics;
use async_trait::async_trait;
use parking_lot::Mutex;
use questbus_proto::{Attributes, SENDER_NAME};
use std::io;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Destination for text produced by a role.
#[async_trait]
pub trait Output: Send + Sync {
    /// Write `text`, returning the number of bytes accepted.
    async fn write(&self, text: &str) -> io::Result<usize>;
}

/// Write `text` and log (rather than return) any failure.
pub async fn write_logged(output: &dyn Output, text: &str) {
    if let Err(e) = output.write(text).await {
        warn!(error = %e, "Failed to write output");
        metrics::record_output_error();
    }
}

/// In-memory transcript of everything written.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write so far, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// All writes concatenated.
    pub fn contents(&self) -> String {
        self.messages.lock().concat()
    }

    /// Whether any single write contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }
}

#[async_trait]
impl Output for MemoryOutput {
    async fn write(&self, text: &str) -> io::Result<usize> {
        self.messages.lock().push(text.to_string());
        Ok(text.len())
    }
}

/// Writes to stdout, one block per write, labelled with the recipient.
#[derive(Debug, Clone)]
pub struct ConsoleOutput {
    recipient: String,
}

impl ConsoleOutput {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl Output for ConsoleOutput {
    async fn write(&self, text: &str) -> io::Result<usize> {
        let block = format!("[-> {}] {}\n", self.recipient, text);
        let mut stdout = tokio::io::stdout();
        stdout.write_all(block.as_bytes()).await?;
        stdout.flush().await?;
        Ok(text.len())
    }
}

/// Delivers through an inner output, then publishes what was written back
/// onto the bus as a `userres` command from the recipient, so an admin can
/// follow what the bot told each user.
pub struct EchoOutput {
    inner: Arc<dyn Output>,
    bus: CommandBus,
    recipient: String,
    bot_name: String,
}

impl EchoOutput {
    pub fn new(
        inner: Arc<dyn Output>,
        bus: CommandBus,
        recipient: impl Into<String>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            bus,
            recipient: recipient.into(),
            bot_name: bot_name.into(),
        }
    }
}

#[async_trait]
impl Output for EchoOutput {
    async fn write(&self, text: &str) -> io::Result<usize> {
        let written = self.inner.write(text).await?;

        let line = format!(
            "{}{} {}",
            self.bus.parser().prefix(),
            topics::USER_RESPONSE,
            text
        );
        let mut attributes = Attributes::new();
        attributes.insert(SENDER_NAME.to_string(), self.bot_name.clone());
        self.bus.publish(&line, &self.recipient, attributes).await;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;

    struct BrokenOutput;

    #[async_trait]
    impl Output for BrokenOutput {
        async fn write(&self, _text: &str) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[tokio::test]
    async fn test_memory_output_records_writes() {
        let output = MemoryOutput::new();
        assert_eq!(output.write("one").await.unwrap(), 3);
        output.write("two").await.unwrap();

        assert_eq!(output.messages(), vec!["one", "two"]);
        assert_eq!(output.contents(), "onetwo");
        assert!(output.contains("tw"));
        assert!(!output.contains("three"));
    }

    #[tokio::test]
    async fn test_write_logged_swallows_errors() {
        write_logged(&BrokenOutput, "lost").await;
    }

    #[tokio::test]
    async fn test_echo_output_publishes_user_response() {
        let bus = CommandBus::new(&BusConfig {
            delivery_timeout_ms: 200,
            ..BusConfig::default()
        });
        let mut responses = bus.subscribe(topics::USER_RESPONSE).await;

        let memory = MemoryOutput::new();
        let echo = EchoOutput::new(Arc::new(memory.clone()), bus.clone(), "42", "Narrator");
        echo.write("Mission 1 begins").await.unwrap();

        assert_eq!(memory.messages(), vec!["Mission 1 begins"]);
        let cmd = responses.recv().await.unwrap();
        assert_eq!(cmd.body(), "Mission 1 begins");
        assert_eq!(cmd.sender_id(), "42");
        assert_eq!(cmd.sender_name(), Some("Narrator"));
    }

    #[tokio::test]
    async fn test_echo_output_skips_publish_on_failure() {
        let bus = CommandBus::new(&BusConfig::default());
        let echo = EchoOutput::new(Arc::new(BrokenOutput), bus, "42", "Narrator");
        assert!(echo.write("nope").await.is_err());
    }
}
