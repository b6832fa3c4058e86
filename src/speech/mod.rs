//! Speech Output / Speech Input seams.
//!
//! Adapters never call into the controller. They report back through
//! session-scoped sinks that post [`Event`]s onto the reactor channel, so a
//! late callback from an old session is just a stale event.

pub mod console;
pub mod mock;
pub mod say;
pub mod stdin;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::kernel::event::{Event, SessionId, UtteranceId};

/// Text-to-speech. At most one utterance is in flight; a new `speak`
/// replaces the current one.
pub trait SpeechOutput: Send {
    /// Starts rendering `text`. When `sink` is given, exactly one of
    /// `finished` / `failed` must eventually be reported on it.
    fn speak(&mut self, text: &str, sink: Option<PromptSink>);

    fn cancel(&mut self);

    /// Hands out the task rendering the current utterance, so a caller can
    /// wait for it before shutting down. `None` when nothing is playing.
    fn take_playback(&mut self) -> Option<JoinHandle<()>> {
        None
    }
}

/// Speech-to-text with a live transcript.
pub trait SpeechInput: Send {
    fn is_available(&self) -> bool;

    /// Single-shot captures stop after the first final transcript.
    fn start_capture(&mut self, continuous: bool, sink: TranscriptSink);

    fn stop_capture(&mut self);
}

/// Reports completion of one utterance.
#[derive(Debug, Clone)]
pub struct PromptSink {
    utterance: UtteranceId,
    tx: mpsc::UnboundedSender<Event>,
}

impl PromptSink {
    pub fn new(utterance: UtteranceId, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { utterance, tx }
    }

    pub fn utterance(&self) -> UtteranceId {
        self.utterance
    }

    pub fn finished(&self) {
        let _ = self.tx.send(Event::PromptFinished {
            utterance: self.utterance,
        });
    }

    pub fn failed(&self, reason: impl Into<String>) {
        let _ = self.tx.send(Event::PromptFailed {
            utterance: self.utterance,
            reason: reason.into(),
        });
    }
}

/// Delivers transcripts for one session's capture.
#[derive(Debug, Clone)]
pub struct TranscriptSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<Event>,
}

impl TranscriptSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn transcript(&self, text: &str, is_final: bool) {
        let _ = self.tx.send(Event::Transcript {
            session: self.session,
            text: text.to_string(),
            is_final,
        });
    }

    /// Capture stopped without a usable transcript.
    pub fn ended(&self) {
        let _ = self.tx.send(Event::CaptureEnded {
            session: self.session,
        });
    }
}
