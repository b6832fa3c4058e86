use serde::{Deserialize, Serialize};

use crate::kernel::event::SessionId;
use crate::kernel::state::{OutcomeKind, Step};

// Allowed: ids, step names, outcome kinds.
// Forbidden: names, villages, reasons, mobile numbers, raw transcripts.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    SessionStarted { session: SessionId },
    /// Start was refused before a session existed.
    StartRejected { unavailable: bool },
    PromptIssued { session: SessionId, step: Step },
    PlaybackFailed { session: SessionId },
    StepCommitted { session: SessionId, step: Step },
    ConfirmationUnrecognized { session: SessionId },
    DraftIncomplete { session: SessionId },
    /// A callback for a superseded or terminated session was dropped.
    StaleEventDiscarded { session: SessionId },
    Terminated { session: SessionId, outcome: OutcomeKind },
}
