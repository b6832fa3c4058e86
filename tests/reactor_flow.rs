use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use gramqueue::kernel::event::{Command, Event, UtteranceId};
use gramqueue::kernel::lease::CapabilityArbiter;
use gramqueue::kernel::state::{Outcome, Step};
use gramqueue::queue::RandomAssignment;
use gramqueue::speech::mock::{MockSpeechInput, MockSpeechOutput, PlaybackMode};
use gramqueue::{DialogueController, DialogueError, FlowConfig, Reactor};

struct Harness {
    reactor: Reactor,
    output: MockSpeechOutput,
    input: MockSpeechInput,
    arbiter: Arc<CapabilityArbiter>,
}

fn harness(mode: PlaybackMode, input_available: bool) -> Harness {
    let config = FlowConfig::fixed();
    let arbiter = CapabilityArbiter::new();
    let assigner = RandomAssignment::new(Box::new(StdRng::seed_from_u64(1)), &config);
    let controller = DialogueController::new(
        config,
        Arc::clone(&arbiter),
        Box::new(assigner),
        Box::new(StdRng::seed_from_u64(2)),
    );
    let output = MockSpeechOutput::new(mode);
    let input = MockSpeechInput::new(input_available);
    let reactor = Reactor::new(
        controller,
        Box::new(output.clone()),
        Box::new(input.clone()),
    );
    Harness {
        reactor,
        output,
        input,
        arbiter,
    }
}

/// Lets the debounce window pass and processes everything it produced.
async fn settle(reactor: &mut Reactor) -> Vec<Outcome> {
    let mut outcomes = reactor.drain();
    tokio::time::sleep(Duration::from_millis(1_300)).await;
    outcomes.extend(reactor.drain());
    outcomes
}

#[tokio::test(start_paused = true)]
async fn test_full_voice_registration() {
    let mut h = harness(PlaybackMode::Instant, true);

    // 1. Start: the name prompt plays and capture opens.
    h.reactor.start().expect("start");
    h.reactor.drain();
    assert!(h.input.is_capturing());
    assert!(h.arbiter.is_held());

    // 2. Answer each step.
    let mut outcomes = Vec::new();
    for text in ["Ramesh Kumar", "Alwar", "", "yes, please"] {
        assert!(h.input.say(text), "capture should be open for {:?}", text);
        outcomes.extend(settle(&mut h.reactor).await);
    }

    // 3. Submitted with a ticket inside the mock range.
    assert_eq!(outcomes.len(), 1);
    let Outcome::Submitted(submission) = &outcomes[0] else {
        panic!("expected submission, got {:?}", outcomes);
    };
    assert_eq!(submission.registration.name, "Ramesh Kumar");
    assert_eq!(submission.registration.village, "Alwar");
    assert!((1..=20).contains(&submission.ticket.queue_number));
    assert_eq!(
        submission.ticket.wait_minutes,
        submission.ticket.queue_number * 15
    );

    let spoken = h.output.spoken();
    assert_eq!(spoken.len(), 5, "four prompts and one announcement");
    assert!(spoken[4].starts_with("You have joined the queue."));
    assert!(!h.input.is_capturing());
    assert!(!h.arbiter.is_held());
    assert!(!h.reactor.controller.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_input_never_speaks() {
    let mut h = harness(PlaybackMode::Instant, false);

    let result = h.reactor.start();

    assert_eq!(result, Err(DialogueError::CapabilityUnavailable));
    assert!(h.output.spoken().is_empty());
    assert_eq!(h.input.starts(), 0);
    assert!(!h.reactor.controller.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_capture_waits_for_prompt_completion() {
    let mut h = harness(PlaybackMode::Manual, true);

    h.reactor.start().expect("start");
    h.reactor.drain();
    assert!(h.output.has_pending());
    assert!(!h.input.is_capturing(), "no capture while speaking");

    h.output.finish_pending();
    h.reactor.drain();
    assert!(h.input.is_capturing());
    assert_eq!(h.input.starts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_devices_and_ignores_late_callbacks() {
    let mut h = harness(PlaybackMode::Manual, true);
    let session = h.reactor.start().expect("start").session;

    let outcome = h.reactor.stop();

    assert_eq!(outcome, Some(Outcome::Stopped));
    assert_eq!(h.output.cancels(), 1);
    assert_eq!(h.input.stops(), 1);
    assert!(!h.arbiter.is_held());

    // A completion for the cancelled prompt arrives late.
    let late = Event::PromptFinished {
        utterance: UtteranceId {
            session,
            ordinal: 0,
        },
    };
    assert_eq!(h.reactor.dispatch(late), None);
    assert_eq!(h.input.starts(), 0, "late callback must not open capture");

    // Second stop changes nothing.
    assert_eq!(h.reactor.stop(), None);
    assert_eq!(h.output.cancels(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_waits_for_quiet_period() {
    let mut h = harness(PlaybackMode::Instant, true);
    h.reactor.start().expect("start");
    h.reactor.drain();

    // 1. Partial then full utterance, 600ms apart.
    h.input.say_interim("Ram");
    h.reactor.drain();
    tokio::time::sleep(Duration::from_millis(600)).await;
    h.input.say("Ramesh Kumar");
    h.reactor.drain();

    // 2. The first timer fires at 1200ms but was superseded.
    tokio::time::sleep(Duration::from_millis(700)).await;
    h.reactor.drain();
    let session = h.reactor.controller.session().expect("active");
    assert_eq!(session.step(), Step::Name);
    assert!(session.is_processing());

    // 3. Quiet period after the last transcript elapses.
    tokio::time::sleep(Duration::from_millis(600)).await;
    h.reactor.drain();
    let session = h.reactor.controller.session().expect("active");
    assert_eq!(session.draft().name, "Ramesh Kumar");
    assert_eq!(session.step(), Step::Village);
}

#[tokio::test(start_paused = true)]
async fn test_stop_kills_pending_commit_timer() {
    let mut h = harness(PlaybackMode::Instant, true);
    h.reactor.start().expect("start");
    h.reactor.drain();
    h.input.say("Ramesh Kumar");
    h.reactor.drain();

    h.reactor.stop();
    h.reactor.start().expect("restart");
    let outcomes = settle(&mut h.reactor).await;

    assert!(outcomes.is_empty());
    let session = h.reactor.controller.session().expect("active");
    assert_eq!(session.step(), Step::Name);
    assert!(session.draft().name.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_playback_failure_does_not_block_flow() {
    let mut h = harness(PlaybackMode::Failing, true);

    h.reactor.start().expect("start");
    h.reactor.drain();

    assert!(h.input.is_capturing());
    assert_eq!(
        h.reactor.controller.telemetry.snapshot().playback_failures,
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_serves_commands() {
    let mut h = harness(PlaybackMode::Instant, true);
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    cmd_tx.send(Command::Start).await.expect("send");
    cmd_tx.send(Command::Stop).await.expect("send");
    drop(cmd_tx);

    let mut outcomes = Vec::new();
    h.reactor.run(cmd_rx, |o| outcomes.push(o.clone())).await;

    assert_eq!(outcomes, vec![Outcome::Stopped]);
    assert!(!h.arbiter.is_held());
}

#[tokio::test(start_paused = true)]
async fn test_run_reports_every_replaced_session() {
    let mut h = harness(PlaybackMode::Instant, true);
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    cmd_tx.send(Command::Start).await.expect("send");
    cmd_tx.send(Command::Start).await.expect("send");
    drop(cmd_tx);

    let mut outcomes = Vec::new();
    h.reactor.run(cmd_rx, |o| outcomes.push(o.clone())).await;

    assert_eq!(outcomes, vec![Outcome::Stopped, Outcome::Stopped]);
    assert_eq!(
        h.reactor.controller.telemetry.snapshot().outcomes.stopped,
        2
    );
    assert!(!h.arbiter.is_held());
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_replaces_session() {
    let mut h = harness(PlaybackMode::Manual, true);
    let first = h.reactor.start().expect("start");
    assert_eq!(first.replaced, None);

    let second = h.reactor.start().expect("restart");

    assert_eq!(second.replaced, Some(Outcome::Stopped));
    assert_ne!(second.session, first.session);
    assert_eq!(h.output.cancels(), 1);
    assert!(h.arbiter.is_held());

    // Only the new session's prompt opens the capture.
    let late = Event::PromptFinished {
        utterance: UtteranceId {
            session: first.session,
            ordinal: 0,
        },
    };
    assert_eq!(h.reactor.dispatch(late), None);
    assert!(!h.input.is_capturing());
    assert!(h.output.finish_pending());
    h.reactor.drain();
    assert!(h.input.is_capturing());
}

#[tokio::test(start_paused = true)]
async fn test_flush_waits_for_closing_announcement() {
    let mut h = harness(PlaybackMode::Manual, true);
    h.reactor.start().expect("start");

    let mut outcomes = Vec::new();
    for text in ["Ramesh Kumar", "Alwar", "fever", "yes"] {
        h.reactor.drain();
        assert!(h.output.finish_pending(), "prompt for {:?} should be playing", text);
        h.reactor.drain();
        assert!(h.input.say(text));
        outcomes.extend(settle(&mut h.reactor).await);
    }
    assert!(matches!(outcomes.as_slice(), [Outcome::Submitted(_)]));
    assert!(h.output.is_playing(), "ticket announcement still playing");

    let flush = h.reactor.flush_output();
    tokio::pin!(flush);
    tokio::select! {
        _ = &mut flush => panic!("flush returned before the announcement ended"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }

    assert!(h.output.finish_pending());
    flush.await;
    assert!(!h.output.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_losing_speech_input_stops_session() {
    let mut h = harness(PlaybackMode::Instant, true);
    h.reactor.start().expect("start");
    h.reactor.drain();
    assert!(h.input.is_capturing());

    // Silence re-prompts, but the capture cannot reopen.
    h.input.set_available(false);
    assert!(h.input.go_silent());
    let outcomes = h.reactor.drain();

    assert_eq!(outcomes, vec![Outcome::Stopped]);
    assert!(!h.reactor.controller.is_active());
    assert!(!h.arbiter.is_held());
}
