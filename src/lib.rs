//! questbus - topic-keyed text-command bus.
//!
//! Free-form text published by users is parsed into [`Command`]s and routed
//! by topic to subscribers. Derived subscriptions filter by predicate, and a
//! [`Combinator`] merges several of them behind one teardown. The quest
//! roles in [`roles`] are built on top.

pub mod bus;
pub mod config;
pub mod console;
pub mod error;
pub mod metrics;
pub mod output;
pub mod quest;
pub mod roles;
pub mod telemetry;

pub use bus::{Combinator, CommandBus, Subscription, SubscriptionId, Teardown};
pub use config::Config;
pub use error::{BusError, QuestError};
pub use questbus_proto::{Attributes, Command, ParsedCommand, Topic};
