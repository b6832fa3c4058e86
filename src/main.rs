use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use gramqueue::config::SpeechBackend;
use gramqueue::kernel::lease::CapabilityArbiter;
use gramqueue::kernel::state::Outcome;
use gramqueue::queue::{format_wait, RandomAssignment};
use gramqueue::speech::console::ConsoleSpeech;
use gramqueue::speech::say::SaySpeech;
use gramqueue::speech::stdin::StdinTranscripts;
use gramqueue::speech::SpeechOutput;
use gramqueue::{DialogueController, FlowConfig, Reactor};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = FlowConfig::default();
    tracing::info!(?config, "Voice queue booting");

    let output: Box<dyn SpeechOutput> = match config.speech {
        SpeechBackend::Console => Box::new(ConsoleSpeech::new()),
        SpeechBackend::Say => Box::new(SaySpeech::default()),
    };
    let input = Box::new(StdinTranscripts::spawn());
    let assigner = RandomAssignment::new(Box::new(StdRng::from_entropy()), &config);
    let controller = DialogueController::new(
        config,
        CapabilityArbiter::new(),
        Box::new(assigner),
        Box::new(StdRng::from_entropy()),
    );
    let mut reactor = Reactor::new(controller, output, input);

    println!("Type your answers and press Enter. Ctrl+C stops.");

    let outcome = tokio::select! {
        outcome = reactor.run_session() => outcome?,
        _ = tokio::signal::ctrl_c() => reactor.stop().unwrap_or(Outcome::Stopped),
    };
    // Let the closing announcement finish before the runtime shuts down.
    reactor.flush_output().await;

    if let Outcome::Submitted(submission) = &outcome {
        println!(
            "Queue number {} (wait {})",
            submission.ticket.queue_number,
            format_wait(submission.ticket.wait_minutes)
        );
    }
    println!("{}", serde_json::to_string(&outcome)?);

    let telemetry = reactor.controller.telemetry.snapshot();
    tracing::info!("Telemetry: {}", serde_json::to_string(&telemetry)?);
    Ok(())
}
