use serde::{Deserialize, Serialize};
use std::fmt;

use super::debounce::Coalescer;
use super::event::{SessionId, UtteranceId};
use super::lease::CapabilityLease;
use crate::queue::{QueueTicket, Registration};

/// The four interview steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Name = 0,
    Village = 1,
    Reason = 2,
    Confirm = 3,
}

impl Step {
    pub fn index(self) -> usize {
        self as usize
    }

    /// `None` for Confirm, which is terminal.
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Name => Some(Step::Village),
            Step::Village => Some(Step::Reason),
            Step::Reason => Some(Step::Confirm),
            Step::Confirm => None,
        }
    }

    /// Whether an empty answer may be committed for this step.
    pub fn accepts_empty(self) -> bool {
        matches!(self, Step::Reason)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Name => "name",
            Step::Village => "village",
            Step::Reason => "reason",
            Step::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

/// In-progress record assembled from spoken answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub village: String,
    /// Never spoken. Filled with a synthetic number at submission.
    pub mobile: String,
    pub reason: String,
}

impl Draft {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.village.trim().is_empty()
    }
}

/// Exactly one holds at a time. The session never listens while speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    /// Waiting on Speech Output for this utterance.
    Speaking(UtteranceId),
    Listening,
    /// A transcript is buffered and waits for the debounce to fire.
    Processing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub registration: Registration,
    pub ticket: QueueTicket,
}

/// How a session terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Submitted(Submission),
    Cancelled,
    Stopped,
}

/// Content-free discriminant of [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Submitted,
    Cancelled,
    Stopped,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Submitted(_) => OutcomeKind::Submitted,
            Outcome::Cancelled => OutcomeKind::Cancelled,
            Outcome::Stopped => OutcomeKind::Stopped,
        }
    }
}

/// Strict state delta. This is the only way a session mutates.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDelta {
    /// A prompt was handed to Speech Output.
    PromptIssued(UtteranceId),
    /// Speech Output is done, capture is running.
    ListeningStarted,
    /// A transcript arrived and (re)armed the debounce.
    TranscriptBuffered(String),
    /// The buffered answer was written to the draft for `step`.
    AnswerCommitted { step: Step, text: String },
    Advanced(Step),
    /// Recoverable restart: back to the first step with an empty draft.
    Restarted,
}

/// Live state of one voice-guided registration. Dropping it releases the
/// speech capabilities.
#[derive(Debug)]
pub struct DialogueSession {
    pub id: SessionId,
    step: Step,
    draft: Draft,
    activity: Activity,
    transcripts: Coalescer,
    next_utterance: u32,
    lease: CapabilityLease,
}

impl DialogueSession {
    pub fn new(id: SessionId, lease: CapabilityLease) -> Self {
        Self {
            id,
            step: Step::Name,
            draft: Draft::default(),
            activity: Activity::Idle,
            transcripts: Coalescer::new(),
            next_utterance: 0,
            lease,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.activity, Activity::Speaking(_))
    }

    pub fn is_listening(&self) -> bool {
        self.activity == Activity::Listening
    }

    pub fn is_processing(&self) -> bool {
        self.activity == Activity::Processing
    }

    pub fn pending_transcript(&self) -> Option<&str> {
        self.transcripts.pending()
    }

    pub(crate) fn transcripts(&self) -> &Coalescer {
        &self.transcripts
    }

    pub(crate) fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Takes the buffered transcript if `generation` is still current.
    pub(crate) fn take_pending(&mut self, generation: u64) -> Option<String> {
        self.transcripts.take(generation)
    }

    /// Reserves the id for the next prompt of this session.
    pub(crate) fn allocate_utterance(&mut self) -> UtteranceId {
        let id = UtteranceId {
            session: self.id,
            ordinal: self.next_utterance,
        };
        self.next_utterance += 1;
        id
    }

    /// Ends the session but keeps its hold on the speech devices.
    pub(crate) fn into_lease(self) -> CapabilityLease {
        self.lease
    }

    /// Pure reduction: Session + Delta -> mutated Session.
    pub(crate) fn reduce(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::PromptIssued(utterance) => {
                self.transcripts.clear();
                self.activity = Activity::Speaking(utterance);
            }
            StateDelta::ListeningStarted => {
                self.activity = Activity::Listening;
            }
            StateDelta::TranscriptBuffered(text) => {
                self.transcripts.observe(text);
                self.activity = Activity::Processing;
            }
            StateDelta::AnswerCommitted { step, text } => {
                match step {
                    Step::Name => self.draft.name = text,
                    Step::Village => self.draft.village = text,
                    Step::Reason => self.draft.reason = text,
                    Step::Confirm => {}
                }
                self.transcripts.clear();
                self.activity = Activity::Idle;
            }
            StateDelta::Advanced(step) => {
                // Monotonic outside of restarts.
                if step > self.step {
                    self.step = step;
                }
            }
            StateDelta::Restarted => {
                self.step = Step::Name;
                self.draft = Draft::default();
                self.transcripts.clear();
                self.activity = Activity::Idle;
            }
        }
    }
}
