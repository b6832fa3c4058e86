use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::event::{Event, SessionId, UtteranceId};
use super::intent::arbitrator::ConfirmationArbitrator;
use super::intent::types::Confirmation;
use super::lease::{CapabilityArbiter, CapabilityLease};
use super::scheduler::{Scheduler, SideEffect};
use super::speech::prompts::Announcement;
use super::state::{Activity, DialogueSession, Outcome, StateDelta, Step, Submission};
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use crate::config::FlowConfig;
use crate::error::DialogueError;
use crate::queue::{synthetic_mobile, QueueAssignment, Registration};

/// The voice-guided registration state machine.
///
/// Purely reactive: every entry point returns the [`SideEffect`]s the driver
/// must execute and never awaits I/O or timers itself. Every callback is
/// checked against the current [`SessionId`] and dropped when it belongs to
/// a session that has ended.
pub struct DialogueController {
    config: FlowConfig,
    arbiter: Arc<CapabilityArbiter>,
    assigner: Box<dyn QueueAssignment>,
    rng: Box<dyn RngCore + Send>,
    session: Option<DialogueSession>,
    last_session: SessionId,
    last_outcome: Option<Outcome>,
    pub telemetry: TelemetryRecorder,
}

impl DialogueController {
    pub fn new(
        config: FlowConfig,
        arbiter: Arc<CapabilityArbiter>,
        assigner: Box<dyn QueueAssignment>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let telemetry = TelemetryRecorder::with_capacity(config.telemetry_capacity);
        Self {
            config,
            arbiter,
            assigner,
            rng,
            session: None,
            last_session: SessionId(0),
            last_outcome: None,
            telemetry,
        }
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_speaking())
    }

    pub fn is_listening(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_listening())
    }

    pub fn is_processing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_processing())
    }

    /// How the most recent session ended.
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Begins a new session at the name step.
    ///
    /// A running session is stopped first and its hold on the speech
    /// devices passes to the new one. Fails without touching Speech Output
    /// when the platform has no Speech Input.
    pub fn start(&mut self, input_available: bool) -> Result<Vec<SideEffect>, DialogueError> {
        if !input_available {
            warn!("Voice flow refused: speech input unavailable");
            self.telemetry
                .record(TelemetryEvent::StartRejected { unavailable: true });
            return Err(DialogueError::CapabilityUnavailable);
        }

        let (mut effects, lease) = match self.session.take() {
            Some(running) => {
                let mut effects = vec![SideEffect::CancelSpeech, SideEffect::StopCapture];
                let lease = self.retire(running, Outcome::Stopped, &mut effects);
                (effects, lease)
            }
            None => match self.arbiter.try_acquire() {
                Some(lease) => (Vec::new(), lease),
                None => {
                    warn!("Voice flow refused: speech capabilities busy");
                    self.telemetry
                        .record(TelemetryEvent::StartRejected { unavailable: false });
                    return Err(DialogueError::CapabilityBusy);
                }
            },
        };

        let id = self.last_session.next();
        self.last_session = id;
        let mut session = DialogueSession::new(id, lease);
        info!(session = %id, "Voice session started");
        self.telemetry
            .record(TelemetryEvent::SessionStarted { session: id });

        effects.push(self.issue_prompt(&mut session, Step::Name, None));
        self.session = Some(session);
        Ok(effects)
    }

    /// Halts speech and capture and discards the draft. No-op when idle.
    pub fn stop(&mut self) -> Vec<SideEffect> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let mut effects = vec![SideEffect::CancelSpeech, SideEffect::StopCapture];
        self.terminate(session, Outcome::Stopped, &mut effects);
        effects
    }

    pub fn handle(&mut self, event: Event) -> Vec<SideEffect> {
        let target = event.session();
        let session = match self.session.take() {
            Some(session) if session.id == target => session,
            other => {
                self.session = other;
                debug!(session = %target, "Discarded stale callback");
                self.telemetry
                    .record(TelemetryEvent::StaleEventDiscarded { session: target });
                return Vec::new();
            }
        };

        let mut effects = Vec::new();
        self.session = match event {
            Event::PromptFinished { utterance } => {
                self.on_prompt_done(session, utterance, &mut effects)
            }
            Event::PromptFailed { utterance, reason } => {
                let err = DialogueError::PlaybackError(reason);
                warn!(session = %session.id, "{}; continuing to listen", err);
                self.telemetry
                    .record(TelemetryEvent::PlaybackFailed { session: session.id });
                self.on_prompt_done(session, utterance, &mut effects)
            }
            Event::Transcript { text, is_final, .. } => {
                self.on_transcript(session, text, is_final, &mut effects)
            }
            Event::CaptureEnded { .. } => self.on_capture_ended(session, &mut effects),
            Event::CommitDue { generation, .. } => {
                self.on_commit_due(session, generation, &mut effects)
            }
        };
        effects
    }

    fn on_prompt_done(
        &mut self,
        mut session: DialogueSession,
        utterance: UtteranceId,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        if session.activity() != Activity::Speaking(utterance) {
            debug!(session = %session.id, ordinal = utterance.ordinal, "Ignoring completion of superseded utterance");
            return Some(session);
        }
        session.reduce(StateDelta::ListeningStarted);
        effects.push(SideEffect::StartCapture {
            session: session.id,
            continuous: false,
        });
        Some(session)
    }

    fn on_transcript(
        &mut self,
        mut session: DialogueSession,
        text: String,
        is_final: bool,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        if !matches!(session.activity(), Activity::Listening | Activity::Processing) {
            debug!(session = %session.id, "Transcript outside of listening ignored");
            return Some(session);
        }
        let text = text.trim().to_string();
        if text.is_empty() && !session.step().accepts_empty() {
            return Some(session);
        }

        debug!(session = %session.id, step = %session.step(), is_final, "Transcript buffered");
        session.reduce(StateDelta::TranscriptBuffered(text));
        effects.push(SideEffect::ScheduleCommit {
            session: session.id,
            generation: session.transcripts().generation(),
            after: self.config.debounce,
        });
        Some(session)
    }

    fn on_capture_ended(
        &mut self,
        session: DialogueSession,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        if !session.is_listening() {
            return Some(session);
        }
        let step = session.step();
        if step.accepts_empty() {
            debug!(session = %session.id, step = %step, "Silence taken as skip");
            return self.commit(session, String::new(), effects);
        }
        let mut session = session;
        effects.push(self.issue_prompt(&mut session, step, None));
        Some(session)
    }

    fn on_commit_due(
        &mut self,
        mut session: DialogueSession,
        generation: u64,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        if !session.is_processing() {
            return Some(session);
        }
        match session.take_pending(generation) {
            Some(text) => self.commit(session, text, effects),
            // A newer transcript re-armed the debounce.
            None => Some(session),
        }
    }

    fn commit(
        &mut self,
        mut session: DialogueSession,
        text: String,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        effects.push(SideEffect::StopCapture);
        let step = session.step();

        let Some(next) = step.next() else {
            return self.confirm(session, &text, effects);
        };

        session.reduce(StateDelta::AnswerCommitted { step, text });
        self.telemetry.record(TelemetryEvent::StepCommitted {
            session: session.id,
            step,
        });
        session.reduce(StateDelta::Advanced(next));
        info!(session = %session.id, from = %step, to = %next, "Step committed");
        effects.push(self.issue_prompt(&mut session, next, None));
        Some(session)
    }

    fn confirm(
        &mut self,
        mut session: DialogueSession,
        text: &str,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        session.reduce(StateDelta::AnswerCommitted {
            step: Step::Confirm,
            text: String::new(),
        });
        match ConfirmationArbitrator::classify(text) {
            Confirmation::Affirmative => self.submit(session, effects),
            Confirmation::Negative => {
                effects.push(Scheduler::announce(&mut session, Announcement::Cancelled));
                self.terminate(session, Outcome::Cancelled, effects);
                None
            }
            Confirmation::Unrecognized => {
                debug!(session = %session.id, "{}", DialogueError::UnrecognizedConfirmation);
                self.telemetry
                    .record(TelemetryEvent::ConfirmationUnrecognized { session: session.id });
                effects.push(self.issue_prompt(&mut session, Step::Confirm, None));
                Some(session)
            }
        }
    }

    fn submit(
        &mut self,
        mut session: DialogueSession,
        effects: &mut Vec<SideEffect>,
    ) -> Option<DialogueSession> {
        let registration = match self.complete_registration(&mut session) {
            Ok(registration) => registration,
            Err(err) => {
                warn!(session = %session.id, "Submission refused: {}; restarting", err);
                self.telemetry
                    .record(TelemetryEvent::DraftIncomplete { session: session.id });
                session.reduce(StateDelta::Restarted);
                effects.push(self.issue_prompt(
                    &mut session,
                    Step::Name,
                    Some(Announcement::Restart),
                ));
                return Some(session);
            }
        };

        let ticket = self.assigner.assign(&registration);
        effects.push(Scheduler::announce(&mut session, Announcement::Joined(ticket)));
        self.terminate(
            session,
            Outcome::Submitted(Submission {
                registration,
                ticket,
            }),
            effects,
        );
        None
    }

    fn complete_registration(
        &mut self,
        session: &mut DialogueSession,
    ) -> Result<Registration, DialogueError> {
        if !session.draft().is_complete() {
            return Err(DialogueError::IncompleteDraft);
        }
        let mobile = synthetic_mobile(&mut *self.rng);
        session.draft_mut().mobile = mobile;

        let draft = session.draft();
        let registration = Registration::new(&draft.name, &draft.village, &draft.mobile, &draft.reason);
        registration.validate()?;
        Ok(registration)
    }

    fn issue_prompt(
        &mut self,
        session: &mut DialogueSession,
        step: Step,
        preamble: Option<Announcement>,
    ) -> SideEffect {
        let (delta, effect) = Scheduler::prompt_with_preamble(session, step, preamble);
        session.reduce(delta);
        self.telemetry.record(TelemetryEvent::PromptIssued {
            session: session.id,
            step,
        });
        debug!(session = %session.id, step = %step, "Prompt issued");
        effect
    }

    /// Ends `session`. Dropping it releases the speech capabilities.
    fn terminate(
        &mut self,
        session: DialogueSession,
        outcome: Outcome,
        effects: &mut Vec<SideEffect>,
    ) {
        drop(self.retire(session, outcome, effects));
    }

    /// Ends `session` and hands back its lease.
    fn retire(
        &mut self,
        session: DialogueSession,
        outcome: Outcome,
        effects: &mut Vec<SideEffect>,
    ) -> CapabilityLease {
        let id = session.id;
        info!(session = %id, outcome = ?outcome.kind(), "Voice session ended");
        self.telemetry.record(TelemetryEvent::Terminated {
            session: id,
            outcome: outcome.kind(),
        });
        self.last_outcome = Some(outcome.clone());
        effects.push(SideEffect::Finished {
            session: id,
            outcome,
        });
        session.into_lease()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::speech::prompts::PromptTable;
    use crate::queue::RandomAssignment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn controller() -> DialogueController {
        let config = FlowConfig::fixed();
        let assigner = RandomAssignment::new(Box::new(StdRng::seed_from_u64(1)), &config);
        DialogueController::new(
            config,
            CapabilityArbiter::new(),
            Box::new(assigner),
            Box::new(StdRng::seed_from_u64(2)),
        )
    }

    fn spoken(effects: &[SideEffect]) -> Option<(UtteranceId, &str)> {
        effects.iter().find_map(|e| match e {
            SideEffect::Speak {
                utterance, text, ..
            } => Some((*utterance, text.as_str())),
            _ => None,
        })
    }

    #[test]
    fn test_incomplete_draft_restarts_without_ending_session() {
        let mut ctrl = controller();
        let effects = ctrl.start(true).expect("start");
        let (utterance, _) = spoken(&effects).expect("name prompt");
        let id = utterance.session;

        // Jump to confirm with nothing collected.
        if let Some(session) = ctrl.session.as_mut() {
            session.reduce(StateDelta::Advanced(Step::Confirm));
        }
        ctrl.handle(Event::PromptFinished { utterance });
        let buffered = ctrl.handle(Event::transcript(id, "yes"));
        let generation = buffered
            .iter()
            .find_map(|e| match e {
                SideEffect::ScheduleCommit { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("debounce armed");
        let effects = ctrl.handle(Event::CommitDue {
            session: id,
            generation,
        });

        assert!(!effects
            .iter()
            .any(|e| matches!(e, SideEffect::Finished { .. })));
        let (_, restart) = spoken(&effects).expect("restart announced");
        assert!(restart.starts_with("Some details were missing."));
        assert!(restart.ends_with(PromptTable::prompt(Step::Name)));

        let session = ctrl.session().expect("session survives");
        assert_eq!(session.id, id);
        assert_eq!(session.step(), Step::Name);
        assert!(ctrl.last_outcome().is_none());
        assert_eq!(ctrl.telemetry.snapshot().incomplete_drafts, 1);
    }
}
