use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic identifier of a dialogue session. A callback stamped with an
/// older id belongs to a superseded session and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next(&self) -> Self {
        SessionId(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Identifies one Speech Output request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtteranceId {
    pub session: SessionId,
    pub ordinal: u32,
}

/// User-initiated commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

/// Everything the controller reacts to besides commands. Every variant is
/// scoped to the session it was issued for.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Speech Output finished rendering an utterance.
    PromptFinished { utterance: UtteranceId },
    /// Speech Output failed. Non-fatal, treated like completion.
    PromptFailed { utterance: UtteranceId, reason: String },
    /// Speech Input delivered a (possibly interim) transcript.
    Transcript {
        session: SessionId,
        text: String,
        is_final: bool,
    },
    /// Speech Input stopped on its own without a usable transcript.
    CaptureEnded { session: SessionId },
    /// The debounce timer for `generation` elapsed.
    CommitDue { session: SessionId, generation: u64 },
}

impl Event {
    pub fn session(&self) -> SessionId {
        match self {
            Event::PromptFinished { utterance } | Event::PromptFailed { utterance, .. } => {
                utterance.session
            }
            Event::Transcript { session, .. }
            | Event::CaptureEnded { session }
            | Event::CommitDue { session, .. } => *session,
        }
    }

    pub fn transcript(session: SessionId, text: &str) -> Self {
        Event::Transcript {
            session,
            text: text.to_string(),
            is_final: true,
        }
    }
}
