//! Shared helpers for integration tests.

#![allow(dead_code)]

use questbus::config::BusConfig;
use questbus::quest::Quest;
use questbus::{Command, CommandBus, Subscription};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

/// Two missions: the first with start/end messages and a clue, the second
/// bare.
pub const QUEST_JSON: &str = r#"[
    {
        "name": "Mission 1",
        "missionStartMessage": "Welcome to mission 1",
        "missionEndMessage": "Mission 1 complete",
        "task": {
            "statement": "What is one?",
            "clue": "clue 1",
            "correctAnswer": "answer 1"
        }
    },
    {
        "name": "Mission 2",
        "task": {
            "statement": "What is two?",
            "clue": "clue 2",
            "correctAnswer": "answer 2"
        }
    }
]"#;

const WAIT: Duration = Duration::from_secs(2);

/// Bus with a bounded wait generous enough for loaded test machines.
pub fn bus() -> CommandBus {
    bus_with_timeout(200)
}

pub fn bus_with_timeout(delivery_timeout_ms: u64) -> CommandBus {
    CommandBus::new(&BusConfig {
        delivery_timeout_ms,
        ..BusConfig::default()
    })
}

pub fn quest() -> Quest {
    Quest::from_json(QUEST_JSON).expect("fixture quest is valid")
}

pub fn quest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create quest file");
    file.write_all(QUEST_JSON.as_bytes())
        .expect("Failed to write quest file");
    file
}

/// Poll `check` until it holds, failing the test after a couple of seconds.
pub async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        sleep(Duration::from_millis(5)).await;
    }
}

/// Wait until `topic` has exactly `expected` raw subscriptions.
pub async fn eventually_count(bus: &CommandBus, topic: &str, expected: usize) {
    let deadline = Instant::now() + WAIT;
    loop {
        let count = bus
            .subscription_count(topic)
            .await
            .expect("registry is running");
        if count == expected {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "topic '{topic}' has {count} subscriptions, expected {expected}"
        );
        sleep(Duration::from_millis(5)).await;
    }
}

/// Next command, failing the test if none arrives in time.
pub async fn recv(sub: &mut Subscription) -> Arc<Command> {
    timeout(WAIT, sub.recv())
        .await
        .expect("timed out waiting for a command")
        .expect("subscription closed")
}
