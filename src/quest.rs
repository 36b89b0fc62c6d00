//! Quest progression.
//!
//! A quest is an ordered list of missions, each with a single task. Loading
//! is JSON (`serde_json`); progress is plain synchronous state. Anything the
//! player should be told is returned as [`Announcement`]s rather than
//! written directly, so callers can hold the quest behind a lock without
//! holding it across the delays between messages.

use crate::error::QuestError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// One mission as described in quest content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDescription {
    pub name: String,
    /// Sent when the mission starts (skipped if empty).
    #[serde(default)]
    pub mission_start_message: String,
    /// Seconds to wait before the start message.
    #[serde(default)]
    pub mission_start_delay: u64,
    /// Sent when the mission's task is solved (skipped if empty).
    #[serde(default)]
    pub mission_end_message: String,
    pub task: TaskDescription,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescription {
    pub statement: String,
    /// Seconds to wait before the statement.
    #[serde(default)]
    pub statement_delay: u64,
    #[serde(default)]
    pub clue: String,
    pub correct_answer: String,
}

impl TaskDescription {
    /// Case-insensitive, surrounding whitespace ignored.
    fn resolves(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}

/// A message to deliver after waiting `delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub delay: Duration,
    pub text: String,
}

impl Announcement {
    pub fn now(text: impl Into<String>) -> Self {
        Self::after(Duration::ZERO, text)
    }

    pub fn after(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

/// Result of answering the current task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    NotStarted,
    InProgress,
    Finished,
}

/// A quest and the player's position in it.
#[derive(Debug, Clone)]
pub struct Quest {
    missions: Vec<MissionDescription>,
    current: usize,
    progress: Progress,
}

impl Quest {
    pub fn new(missions: Vec<MissionDescription>) -> Result<Self, QuestError> {
        if missions.is_empty() {
            return Err(QuestError::NoMissions);
        }
        if let Some(idx) = missions.iter().position(|m| m.name.trim().is_empty()) {
            return Err(QuestError::UnnamedMission(idx + 1));
        }

        Ok(Self {
            missions,
            current: 0,
            progress: Progress::NotStarted,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, QuestError> {
        let missions: Vec<MissionDescription> = serde_json::from_str(json)?;
        Self::new(missions)
    }

    /// Load a quest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn mission_count(&self) -> usize {
        self.missions.len()
    }

    /// Start the first mission. Starting twice yields nothing.
    pub fn start(&mut self) -> Vec<Announcement> {
        if self.progress != Progress::NotStarted {
            return Vec::new();
        }
        self.progress = Progress::InProgress;
        self.mission_start(self.current)
    }

    /// Name of the current mission (the last one once finished).
    pub fn mission_name(&self) -> &str {
        &self.missions[self.current].name
    }

    /// Clue for the current task, if it has one.
    pub fn clue(&self) -> Option<&str> {
        let clue = self.missions[self.current].task.clue.as_str();
        (!clue.is_empty()).then_some(clue)
    }

    pub fn finished(&self) -> bool {
        self.progress == Progress::Finished
    }

    /// Try to solve the current task.
    ///
    /// A correct answer ends the mission and starts the next one, or
    /// finishes the quest after the last. Answers outside a running quest
    /// are never correct.
    pub fn answer(&mut self, answer: &str) -> AnswerOutcome {
        if self.progress != Progress::InProgress
            || !self.missions[self.current].task.resolves(answer)
        {
            return AnswerOutcome {
                correct: false,
                announcements: Vec::new(),
            };
        }

        let mut announcements = Vec::new();
        let end_message = &self.missions[self.current].mission_end_message;
        if !end_message.is_empty() {
            announcements.push(Announcement::now(end_message.clone()));
        }

        if self.current + 1 < self.missions.len() {
            self.current += 1;
            announcements.extend(self.mission_start(self.current));
        } else {
            self.progress = Progress::Finished;
        }

        AnswerOutcome {
            correct: true,
            announcements,
        }
    }

    fn mission_start(&self, idx: usize) -> Vec<Announcement> {
        let mission = &self.missions[idx];
        let mut announcements = Vec::with_capacity(2);

        let mut pending_delay = Duration::from_secs(mission.mission_start_delay);
        if !mission.mission_start_message.is_empty() {
            announcements.push(Announcement::after(
                pending_delay,
                mission.mission_start_message.clone(),
            ));
            pending_delay = Duration::ZERO;
        }
        announcements.push(Announcement::after(
            pending_delay + Duration::from_secs(mission.task.statement_delay),
            mission.task.statement.clone(),
        ));
        announcements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const QUEST: &str = r#"[
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
            "missionStartDelay": 2,
            "task": {
                "statement": "What is two?",
                "statementDelay": 1,
                "correctAnswer": "answer 2"
            }
        }
    ]"#;

    fn texts(announcements: &[Announcement]) -> Vec<&str> {
        announcements.iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn test_load_and_start() {
        let mut quest = Quest::from_json(QUEST).unwrap();
        assert_eq!(quest.mission_count(), 2);
        assert_eq!(quest.mission_name(), "Mission 1");
        assert!(!quest.finished());

        let start = quest.start();
        assert_eq!(texts(&start), vec!["Welcome to mission 1", "What is one?"]);
        assert!(quest.start().is_empty());
    }

    #[test]
    fn test_answers_progress_to_finish() {
        let mut quest = Quest::from_json(QUEST).unwrap();
        quest.start();

        let wrong = quest.answer("nope");
        assert!(!wrong.correct);
        assert_eq!(quest.mission_name(), "Mission 1");

        let right = quest.answer("  ANSWER 1 ");
        assert!(right.correct);
        assert_eq!(texts(&right.announcements), vec!["Mission 1 complete", "What is two?"]);
        assert_eq!(quest.mission_name(), "Mission 2");

        let last = quest.answer("answer 2");
        assert!(last.correct);
        assert!(last.announcements.is_empty());
        assert!(quest.finished());
        assert_eq!(quest.mission_name(), "Mission 2");

        assert!(!quest.answer("answer 2").correct);
    }

    #[test]
    fn test_answer_before_start_is_wrong() {
        let mut quest = Quest::from_json(QUEST).unwrap();
        assert!(!quest.answer("answer 1").correct);
        assert_eq!(quest.mission_name(), "Mission 1");
    }

    #[test]
    fn test_start_delays() {
        let mut quest = Quest::from_json(QUEST).unwrap();
        quest.start();
        let outcome = quest.answer("answer 1");

        // No start message on mission 2: its delay carries over to the statement.
        assert_eq!(
            outcome.announcements[1],
            Announcement::after(Duration::from_secs(3), "What is two?")
        );
    }

    #[test]
    fn test_clue() {
        let mut quest = Quest::from_json(QUEST).unwrap();
        quest.start();
        assert_eq!(quest.clue(), Some("clue 1"));
        quest.answer("answer 1");
        assert_eq!(quest.clue(), None);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(Quest::from_json("[]"), Err(QuestError::NoMissions)));
        assert!(matches!(Quest::from_json("{"), Err(QuestError::Json(_))));
        assert!(matches!(
            Quest::from_json(r#"[{"name": " ", "task": {"statement": "s", "correctAnswer": "a"}}]"#),
            Err(QuestError::UnnamedMission(1))
        ));
        assert!(matches!(
            Quest::load("/definitely/not/here.json"),
            Err(QuestError::Io(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(QUEST.as_bytes()).unwrap();
        let quest = Quest::load(file.path()).unwrap();
        assert_eq!(quest.mission_count(), 2);
    }
}
