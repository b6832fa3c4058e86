//! In-memory speech adapters with inspection handles, for tests and demos.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{PromptSink, SpeechInput, SpeechOutput, TranscriptSink};

fn lock<T>(inner: &Mutex<T>) -> MutexGuard<'_, T> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// How [`MockSpeechOutput`] completes utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Reports `finished` as soon as `speak` is called.
    Instant,
    /// Reports `failed` as soon as `speak` is called.
    Failing,
    /// Holds every utterance until [`MockSpeechOutput::finish_pending`].
    Manual,
}

#[derive(Debug)]
struct OutputLog {
    mode: PlaybackMode,
    spoken: Vec<String>,
    cancels: usize,
    pending: Option<PromptSink>,
    /// Set while a held utterance is still "playing".
    playing: Option<oneshot::Sender<()>>,
    playback: Option<oneshot::Receiver<()>>,
}

/// Records every utterance. Clones share the same log.
#[derive(Debug, Clone)]
pub struct MockSpeechOutput {
    inner: Arc<Mutex<OutputLog>>,
}

impl MockSpeechOutput {
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OutputLog {
                mode,
                spoken: Vec::new(),
                cancels: 0,
                pending: None,
                playing: None,
                playback: None,
            })),
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        lock(&self.inner).spoken.clone()
    }

    pub fn cancels(&self) -> usize {
        lock(&self.inner).cancels
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.inner).pending.is_some()
    }

    pub fn is_playing(&self) -> bool {
        lock(&self.inner).playing.is_some()
    }

    /// Completes the held utterance, if any.
    pub fn finish_pending(&self) -> bool {
        let (sink, playing) = {
            let mut log = lock(&self.inner);
            (log.pending.take(), log.playing.take())
        };
        let held = sink.is_some() || playing.is_some();
        if let Some(playing) = playing {
            let _ = playing.send(());
        }
        if let Some(sink) = sink {
            sink.finished();
        }
        held
    }
}

impl SpeechOutput for MockSpeechOutput {
    fn speak(&mut self, text: &str, sink: Option<PromptSink>) {
        let mut log = lock(&self.inner);
        log.spoken.push(text.to_string());
        // A new utterance replaces the held one; its sink never reports.
        log.pending = None;
        log.playing = None;
        log.playback = None;
        if log.mode == PlaybackMode::Manual {
            let (playing, playback) = oneshot::channel();
            log.playing = Some(playing);
            log.playback = Some(playback);
        }
        let Some(sink) = sink else { return };
        match log.mode {
            PlaybackMode::Instant => sink.finished(),
            PlaybackMode::Failing => sink.failed("mock playback failure"),
            PlaybackMode::Manual => log.pending = Some(sink),
        }
    }

    fn cancel(&mut self) {
        let mut log = lock(&self.inner);
        log.cancels += 1;
        log.pending = None;
        log.playing = None;
        log.playback = None;
    }

    fn take_playback(&mut self) -> Option<JoinHandle<()>> {
        let playback = lock(&self.inner).playback.take()?;
        Some(tokio::spawn(async move {
            let _ = playback.await;
        }))
    }
}

#[derive(Debug, Default)]
struct InputLog {
    available: bool,
    starts: usize,
    stops: usize,
    sink: Option<TranscriptSink>,
}

/// Speech Input driven by the test through [`MockSpeechInput::say`].
#[derive(Debug, Clone)]
pub struct MockSpeechInput {
    inner: Arc<Mutex<InputLog>>,
}

impl MockSpeechInput {
    pub fn new(available: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InputLog {
                available,
                ..InputLog::default()
            })),
        }
    }

    /// Simulates the recognizer going away (or coming back).
    pub fn set_available(&self, available: bool) {
        lock(&self.inner).available = available;
    }

    pub fn starts(&self) -> usize {
        lock(&self.inner).starts
    }

    pub fn stops(&self) -> usize {
        lock(&self.inner).stops
    }

    pub fn is_capturing(&self) -> bool {
        lock(&self.inner).sink.is_some()
    }

    /// Delivers a final transcript. Returns false when nothing is capturing.
    pub fn say(&self, text: &str) -> bool {
        self.deliver(text, true)
    }

    pub fn say_interim(&self, text: &str) -> bool {
        self.deliver(text, false)
    }

    /// Ends the running capture without a transcript.
    pub fn go_silent(&self) -> bool {
        match lock(&self.inner).sink.take() {
            Some(sink) => {
                sink.ended();
                true
            }
            None => false,
        }
    }

    fn deliver(&self, text: &str, is_final: bool) -> bool {
        match &lock(&self.inner).sink {
            Some(sink) => {
                sink.transcript(text, is_final);
                true
            }
            None => false,
        }
    }
}

impl SpeechInput for MockSpeechInput {
    fn is_available(&self) -> bool {
        lock(&self.inner).available
    }

    fn start_capture(&mut self, _continuous: bool, sink: TranscriptSink) {
        let mut log = lock(&self.inner);
        log.starts += 1;
        log.sink = Some(sink);
    }

    fn stop_capture(&mut self) {
        let mut log = lock(&self.inner);
        log.stops += 1;
        log.sink = None;
    }
}
