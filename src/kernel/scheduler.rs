use std::time::Duration;

use super::event::{SessionId, UtteranceId};
use super::speech::prompts::{Announcement, PromptTable};
use super::state::{DialogueSession, Outcome, StateDelta, Step};

/// Work the driver performs on behalf of the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Hand `text` to Speech Output. A prompt expects a completion callback,
    /// an announcement is fire-and-forget.
    Speak {
        utterance: UtteranceId,
        text: String,
        expects_answer: bool,
    },
    /// Start a capture. Only ever emitted from a Speech Output completion.
    StartCapture { session: SessionId, continuous: bool },
    StopCapture,
    CancelSpeech,
    /// Deliver `CommitDue { session, generation }` after `after`.
    ScheduleCommit {
        session: SessionId,
        generation: u64,
        after: Duration,
    },
    /// Session is gone. Background work scoped to it must stop.
    Finished { session: SessionId, outcome: Outcome },
}

pub struct Scheduler;

impl Scheduler {
    /// Pure projection: Step -> (StateDelta, SideEffect) for the step prompt,
    /// optionally preceded by an announcement in the same utterance.
    pub fn prompt_with_preamble(
        session: &mut DialogueSession,
        step: Step,
        preamble: Option<Announcement>,
    ) -> (StateDelta, SideEffect) {
        let utterance = session.allocate_utterance();
        let text = match preamble {
            Some(announcement) => format!(
                "{} {}",
                PromptTable::announcement(announcement),
                PromptTable::prompt(step)
            ),
            None => PromptTable::prompt(step).to_string(),
        };
        (
            StateDelta::PromptIssued(utterance),
            SideEffect::Speak {
                utterance,
                text,
                expects_answer: true,
            },
        )
    }

    /// Closing message for a session that is about to end.
    pub fn announce(session: &mut DialogueSession, announcement: Announcement) -> SideEffect {
        SideEffect::Speak {
            utterance: session.allocate_utterance(),
            text: PromptTable::announcement(announcement),
            expects_answer: false,
        }
    }
}
