use rand::rngs::StdRng;
use rand::SeedableRng;

use gramqueue::kernel::event::{Event, SessionId};
use gramqueue::kernel::lease::CapabilityArbiter;
use gramqueue::kernel::scheduler::SideEffect;
use gramqueue::kernel::state::{OutcomeKind, Step};
use gramqueue::kernel::telemetry::event::TelemetryEvent;
use gramqueue::kernel::telemetry::recorder::TelemetryRecorder;
use gramqueue::queue::RandomAssignment;
use gramqueue::{DialogueController, FlowConfig};

#[test]
fn test_recorder_drops_oldest_when_full() {
    let mut recorder = TelemetryRecorder::with_capacity(3);

    for n in 1..=5 {
        recorder.record(TelemetryEvent::SessionStarted {
            session: SessionId(n),
        });
    }

    assert_eq!(recorder.len(), 3);
    let first = recorder.events().next().cloned();
    assert_eq!(
        first,
        Some(TelemetryEvent::SessionStarted {
            session: SessionId(3)
        })
    );
    assert_eq!(recorder.snapshot().sessions_started, 3);

    recorder.clear();
    assert!(recorder.is_empty());
}

#[test]
fn test_snapshot_counts_by_kind() {
    let mut recorder = TelemetryRecorder::new();
    let session = SessionId(1);
    recorder.record(TelemetryEvent::SessionStarted { session });
    recorder.record(TelemetryEvent::PromptIssued {
        session,
        step: Step::Name,
    });
    recorder.record(TelemetryEvent::StepCommitted {
        session,
        step: Step::Name,
    });
    recorder.record(TelemetryEvent::StaleEventDiscarded { session });
    recorder.record(TelemetryEvent::Terminated {
        session,
        outcome: OutcomeKind::Cancelled,
    });

    let snap = recorder.snapshot();
    assert_eq!(snap.sessions_started, 1);
    assert_eq!(snap.prompts_issued, 1);
    assert_eq!(snap.steps_committed, 1);
    assert_eq!(snap.stale_events, 1);
    assert_eq!(snap.outcomes.cancelled, 1);
    assert_eq!(snap.outcomes.submitted, 0);
}

#[test]
fn test_telemetry_never_contains_answers() {
    let config = FlowConfig::fixed();
    let assigner = RandomAssignment::new(Box::new(StdRng::seed_from_u64(3)), &config);
    let mut ctrl = DialogueController::new(
        config,
        CapabilityArbiter::new(),
        Box::new(assigner),
        Box::new(StdRng::seed_from_u64(4)),
    );

    let mut effects = ctrl.start(true).expect("start");
    let session = ctrl.session().map(|s| s.id).expect("active");
    for text in ["Ramesh Kumar", "Alwar", "stomach ache", "yes"] {
        let utterance = effects
            .iter()
            .find_map(|e| match e {
                SideEffect::Speak {
                    utterance,
                    expects_answer: true,
                    ..
                } => Some(*utterance),
                _ => None,
            })
            .expect("prompt");
        ctrl.handle(Event::PromptFinished { utterance });
        let armed = ctrl.handle(Event::transcript(session, text));
        let generation = armed
            .iter()
            .find_map(|e| match e {
                SideEffect::ScheduleCommit { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("armed");
        effects = ctrl.handle(Event::CommitDue {
            session,
            generation,
        });
    }

    let dump = serde_json::to_string(&ctrl.telemetry.events().collect::<Vec<_>>())
        .expect("serializable");
    for secret in ["Ramesh", "Alwar", "stomach"] {
        assert!(!dump.contains(secret), "telemetry leaked {:?}", secret);
    }
    assert_eq!(ctrl.telemetry.snapshot().outcomes.submitted, 1);
}
