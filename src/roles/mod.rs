//! Consumer roles.
//!
//! Both roles follow the same shape: open filtered subscriptions tied to a
//! [`Teardown`](crate::bus::Teardown), merge them with a
//! [`Combinator`](crate::bus::Combinator), and run one handler task over the
//! merged stream until the role is destroyed.

mod admin;
mod player;

pub use admin::{Admin, format_forward};
pub use player::{Player, PlayerConfig};

use crate::bus::Teardown;
use crate::output::{Output, write_logged};
use crate::quest::Announcement;
use questbus_proto::Command;

/// Topics the roles exchange.
pub mod topics {
    /// Plain chat text.
    pub const PLAIN: &str = "";
    /// A player's answer to the current task.
    pub const ANSWER: &str = "a";
    /// A message from the admin to players.
    pub const ADMIN_MESSAGE: &str = "adminmsg";
    /// Text the bot sent to a user, echoed back for the admin.
    pub const USER_RESPONSE: &str = "userres";
}

/// Matches commands sent by `user_id`.
pub fn from_sender(user_id: String) -> impl Fn(&Command) -> bool + Send + Sync + 'static {
    move |cmd: &Command| cmd.sender_id() == user_id
}

/// Matches commands sent by anyone except `user_id`.
pub fn not_from_sender(user_id: String) -> impl Fn(&Command) -> bool + Send + Sync + 'static {
    move |cmd: &Command| cmd.sender_id() != user_id
}

/// Write announcements in order, honouring each one's delay.
///
/// Stops at the first delay or write reached after `teardown` fires, and
/// returns `false` if it did.
pub(crate) async fn announce(
    output: &dyn Output,
    announcements: Vec<Announcement>,
    teardown: &Teardown,
) -> bool {
    for announcement in announcements {
        if !announcement.delay.is_zero() {
            tokio::select! {
                biased;
                _ = teardown.destroyed() => return false,
                _ = tokio::time::sleep(announcement.delay) => {}
            }
        }
        if teardown.is_destroyed() {
            return false;
        }
        write_logged(output, &announcement.text).await;
    }
    true
}
