use serde::Serialize;
use std::collections::VecDeque;

use super::event::TelemetryEvent;
use crate::kernel::state::OutcomeKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub sessions_started: u64,
    pub starts_rejected: u64,
    pub prompts_issued: u64,
    pub playback_failures: u64,
    pub steps_committed: u64,
    pub unrecognized_confirmations: u64,
    pub incomplete_drafts: u64,
    pub stale_events: u64,
    pub outcomes: OutcomeStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeStats {
    pub submitted: u64,
    pub cancelled: u64,
    pub stopped: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::SessionStarted { .. } => snap.sessions_started += 1,
            TelemetryEvent::StartRejected { .. } => snap.starts_rejected += 1,
            TelemetryEvent::PromptIssued { .. } => snap.prompts_issued += 1,
            TelemetryEvent::PlaybackFailed { .. } => snap.playback_failures += 1,
            TelemetryEvent::StepCommitted { .. } => snap.steps_committed += 1,
            TelemetryEvent::ConfirmationUnrecognized { .. } => {
                snap.unrecognized_confirmations += 1
            }
            TelemetryEvent::DraftIncomplete { .. } => snap.incomplete_drafts += 1,
            TelemetryEvent::StaleEventDiscarded { .. } => snap.stale_events += 1,
            TelemetryEvent::Terminated { outcome, .. } => match outcome {
                OutcomeKind::Submitted => snap.outcomes.submitted += 1,
                OutcomeKind::Cancelled => snap.outcomes.cancelled += 1,
                OutcomeKind::Stopped => snap.outcomes.stopped += 1,
            },
        }
    }

    snap
}
