use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::controller::DialogueController;
use super::event::{Command, Event, SessionId};
use super::scheduler::SideEffect;
use super::state::Outcome;
use crate::error::DialogueError;
use crate::speech::{PromptSink, SpeechInput, SpeechOutput, TranscriptSink};

/// A session that [`Reactor::start`] brought up.
#[derive(Debug, Clone, PartialEq)]
pub struct Started {
    pub session: SessionId,
    /// Outcome of the session this start replaced, if one was running.
    pub replaced: Option<Outcome>,
}

/// Async driver around [`DialogueController`].
///
/// Owns the speech adapters and the event channel they report on, and runs
/// debounce timers. Each session gets a [`CancellationToken`]; every timer
/// spawned for it dies when the session ends.
pub struct Reactor {
    pub controller: DialogueController,
    output: Box<dyn SpeechOutput>,
    input: Box<dyn SpeechInput>,
    tx: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    session_scope: Option<CancellationToken>,
}

impl Reactor {
    pub fn new(
        controller: DialogueController,
        output: Box<dyn SpeechOutput>,
        input: Box<dyn SpeechInput>,
    ) -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();
        Self {
            controller,
            output,
            input,
            tx,
            receiver,
            session_scope: None,
        }
    }

    /// Sender adapters may use to inject events directly.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Starts a fresh session, stopping any running one first.
    pub fn start(&mut self) -> Result<Started, DialogueError> {
        let effects = self.controller.start(self.input.is_available())?;
        // Runs the replaced session's Finished, which closes its scope.
        let replaced = self.execute(effects);
        self.session_scope = Some(CancellationToken::new());
        let session = self
            .controller
            .session()
            .map(|s| s.id)
            .ok_or(DialogueError::CapabilityUnavailable)?;
        Ok(Started { session, replaced })
    }

    /// Stops the running session. Returns `None` when nothing was running.
    pub fn stop(&mut self) -> Option<Outcome> {
        let effects = self.controller.stop();
        self.execute(effects)
    }

    /// Feeds one event through the controller and executes the result.
    pub fn dispatch(&mut self, event: Event) -> Option<Outcome> {
        let effects = self.controller.handle(event);
        self.execute(effects)
    }

    /// Waits until Speech Output has rendered its current utterance.
    pub async fn flush_output(&mut self) {
        if let Some(playback) = self.output.take_playback() {
            if let Err(e) = playback.await {
                warn!("Playback task failed: {}", e);
            }
        }
    }

    /// Waits for the next adapter or timer event and processes it.
    pub async fn next(&mut self) -> Option<Outcome> {
        // The reactor holds a sender, so the channel never closes.
        let event = self.receiver.recv().await?;
        self.dispatch(event)
    }

    /// Drains events that are already queued without waiting.
    pub fn drain(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            outcomes.extend(self.dispatch(event));
        }
        outcomes
    }

    /// Runs one session from start to termination.
    pub async fn run_session(&mut self) -> Result<Outcome, DialogueError> {
        self.start()?;
        loop {
            if let Some(outcome) = self.next().await {
                return Ok(outcome);
            }
        }
    }

    /// Serves `Start`/`Stop` commands until the command channel closes.
    pub async fn run<F>(&mut self, mut commands: mpsc::Receiver<Command>, mut on_outcome: F)
    where
        F: FnMut(&Outcome),
    {
        info!("Voice reactor running");
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let outcome = match command {
                        Some(Command::Start) => match self.start() {
                            Ok(started) => started.replaced,
                            Err(e) => {
                                warn!("Start rejected: {}", e);
                                None
                            }
                        },
                        Some(Command::Stop) => self.stop(),
                        None => break,
                    };
                    if let Some(outcome) = outcome {
                        on_outcome(&outcome);
                    }
                }
                Some(event) = self.receiver.recv() => {
                    if let Some(outcome) = self.dispatch(event) {
                        on_outcome(&outcome);
                    }
                }
            }
        }
        if let Some(outcome) = self.stop() {
            on_outcome(&outcome);
        }
        info!("Voice reactor stopped");
    }

    fn execute(&mut self, effects: Vec<SideEffect>) -> Option<Outcome> {
        let mut finished = None;
        let mut input_lost = false;
        for effect in effects {
            match effect {
                SideEffect::Speak {
                    utterance,
                    text,
                    expects_answer,
                } => {
                    let sink = expects_answer.then(|| PromptSink::new(utterance, self.tx.clone()));
                    self.output.speak(&text, sink);
                }
                SideEffect::StartCapture {
                    session,
                    continuous,
                } => {
                    if !self.input.is_available() {
                        warn!(session = %session, "Speech input went away; stopping session");
                        input_lost = true;
                        continue;
                    }
                    let sink = TranscriptSink::new(session, self.tx.clone());
                    self.input.start_capture(continuous, sink);
                }
                SideEffect::StopCapture => self.input.stop_capture(),
                SideEffect::CancelSpeech => self.output.cancel(),
                SideEffect::ScheduleCommit {
                    session,
                    generation,
                    after,
                } => {
                    let Some(scope) = &self.session_scope else {
                        continue;
                    };
                    let token = scope.child_token();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = token.cancelled() => {}
                            _ = tokio::time::sleep(after) => {
                                let _ = tx.send(Event::CommitDue { session, generation });
                            }
                        }
                    });
                }
                SideEffect::Finished { session, outcome } => {
                    if let Some(scope) = self.session_scope.take() {
                        scope.cancel();
                    }
                    info!(session = %session, outcome = ?outcome.kind(), "Session finished");
                    finished = Some(outcome);
                }
            }
        }
        if input_lost && finished.is_none() {
            let effects = self.controller.stop();
            finished = self.execute(effects);
        }
        finished
    }
}
