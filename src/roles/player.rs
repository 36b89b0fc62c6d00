//! Participant role: answers tasks and hears from the admin.

use super::{announce, from_sender, not_from_sender, topics};
use crate::bus::{Combinator, CommandBus, Teardown};
use crate::config::PlayerSettings;
use crate::output::{Output, write_logged};
use crate::quest::{Announcement, Quest};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info};

/// Per-player settings.
#[derive(Debug, Clone, Default)]
pub struct PlayerConfig {
    pub user_id: String,
    /// Wrong answers on one mission before its clue is written; 0 never
    /// writes it.
    pub wrong_answers_for_clue: u32,
    pub intro_message: String,
    pub outro_message: String,
    pub outro_delay: Duration,
}

impl PlayerConfig {
    pub fn from_settings(user_id: impl Into<String>, settings: &PlayerSettings) -> Self {
        Self {
            user_id: user_id.into(),
            wrong_answers_for_clue: settings.wrong_answers_for_clue,
            intro_message: settings.intro_message.clone(),
            outro_message: settings.outro_message.clone(),
            outro_delay: settings.outro_delay(),
        }
    }
}

struct Progress {
    quest: Quest,
    /// Wrong answers per mission name.
    tries: HashMap<String, u32>,
}

struct Shared {
    config: PlayerConfig,
    progress: Mutex<Progress>,
    output: Arc<dyn Output>,
}

impl Shared {
    /// Returns `false` if teardown cut the replies short.
    async fn handle_answer(&self, answer: &str, teardown: &Teardown) -> bool {
        let announcements = self.resolve(answer);
        announce(self.output.as_ref(), announcements, teardown).await
    }

    /// Apply an answer to the quest and collect what to tell the player.
    fn resolve(&self, answer: &str) -> Vec<Announcement> {
        let mut guard = self.progress.lock();
        let progress = &mut *guard;
        if progress.quest.finished() {
            return Vec::new();
        }

        let outcome = progress.quest.answer(answer);
        let mut announcements = outcome.announcements;

        if !outcome.correct {
            let mission = progress.quest.mission_name().to_string();
            let tries = progress.tries.entry(mission).or_default();
            *tries += 1;
            debug!(tries = *tries, "Wrong answer");

            if *tries == self.config.wrong_answers_for_clue
                && let Some(clue) = progress.quest.clue()
            {
                announcements.push(Announcement::now(clue));
            }
        }

        if progress.quest.finished() {
            info!(user_id = %self.config.user_id, "Quest finished");
            if !self.config.outro_message.is_empty() {
                announcements.push(Announcement::after(
                    self.config.outro_delay,
                    self.config.outro_message.clone(),
                ));
            }
        }

        announcements
    }
}

/// Player role handle. Dropping it does not stop the role; call
/// [`Player::destroy`].
pub struct Player {
    shared: Arc<Shared>,
    teardown: Teardown,
}

impl Player {
    /// Subscribe to this player's answers and to admin messages, write the
    /// intro, and start the quest.
    ///
    /// The intro is written before this returns; the first mission's
    /// messages follow from the handler task.
    pub async fn spawn(
        config: PlayerConfig,
        bus: &CommandBus,
        quest: Quest,
        output: Arc<dyn Output>,
    ) -> Self {
        let teardown = Teardown::new();

        let answers = bus
            .filtered_subscribe(
                topics::ANSWER,
                from_sender(config.user_id.clone()),
                teardown.child_token(),
            )
            .await;
        let admin_messages = bus
            .filtered_subscribe(
                topics::ADMIN_MESSAGE,
                not_from_sender(config.user_id.clone()),
                teardown.child_token(),
            )
            .await;
        let combinator = Combinator::spawn(vec![answers, admin_messages], teardown.clone());

        if !config.intro_message.is_empty() {
            write_logged(output.as_ref(), &config.intro_message).await;
        }

        let span = crate::telemetry::role("player", &config.user_id);
        info!(user_id = %config.user_id, missions = quest.mission_count(), "Player started");

        let shared = Arc::new(Shared {
            config,
            progress: Mutex::new(Progress {
                quest,
                tries: HashMap::new(),
            }),
            output,
        });

        let start = shared.progress.lock().quest.start();
        tokio::spawn(
            handle_commands(Arc::clone(&shared), combinator, teardown.clone(), start)
                .instrument(span),
        );

        Self { shared, teardown }
    }

    pub fn user_id(&self) -> &str {
        &self.shared.config.user_id
    }

    pub fn mission_name(&self) -> String {
        self.shared.progress.lock().quest.mission_name().to_string()
    }

    pub fn finished(&self) -> bool {
        self.shared.progress.lock().quest.finished()
    }

    /// Stop the role. Returns `false` if it was already stopped.
    pub fn destroy(&self) -> bool {
        let fired = self.teardown.destroy();
        if fired {
            info!(user_id = %self.user_id(), "Player destroyed");
        }
        fired
    }
}

async fn handle_commands(
    shared: Arc<Shared>,
    mut combinator: Combinator,
    teardown: Teardown,
    start: Vec<Announcement>,
) {
    if !announce(shared.output.as_ref(), start, &teardown).await {
        debug!("Player destroyed before the first mission");
        return;
    }

    loop {
        let cmd = tokio::select! {
            biased;
            _ = teardown.destroyed() => break,
            next = combinator.recv() => match next {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd.topic() {
            topics::ANSWER => {
                if !shared.handle_answer(cmd.body(), &teardown).await {
                    break;
                }
            }
            topics::ADMIN_MESSAGE => write_logged(shared.output.as_ref(), cmd.body()).await,
            other => debug!(topic = %other, "Unexpected topic"),
        }
    }
    debug!("Player handler stopped");
}
