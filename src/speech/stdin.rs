use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

use super::{SpeechInput, TranscriptSink};

#[derive(Debug, Default)]
struct Capture {
    sink: Option<TranscriptSink>,
    continuous: bool,
    /// The reader hit end of input. Every later capture ends at once.
    closed: bool,
}

fn lock(capture: &Mutex<Capture>) -> MutexGuard<'_, Capture> {
    capture.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Typed lines stand in for recognised speech. Lines read while no capture
/// is running are dropped.
#[derive(Debug, Clone)]
pub struct StdinTranscripts {
    capture: Arc<Mutex<Capture>>,
}

impl StdinTranscripts {
    /// Spawns the stdin reader task. Must be called inside a tokio runtime.
    pub fn spawn() -> Self {
        Self::from_reader(tokio::io::stdin())
    }

    /// Reads transcripts line by line from `reader` instead of stdin.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let capture = Arc::new(Mutex::new(Capture::default()));
        let shared = Arc::clone(&capture);

        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let mut guard = lock(&shared);
                let Some(sink) = guard.sink.clone() else {
                    debug!("Input line dropped: not capturing");
                    continue;
                };
                sink.transcript(line.trim(), true);
                if !guard.continuous {
                    guard.sink = None;
                }
            }
            debug!("Transcript input closed");
            let mut guard = lock(&shared);
            guard.closed = true;
            if let Some(sink) = guard.sink.take() {
                sink.ended();
            }
        });

        Self { capture }
    }
}

impl SpeechInput for StdinTranscripts {
    fn is_available(&self) -> bool {
        !lock(&self.capture).closed
    }

    fn start_capture(&mut self, continuous: bool, sink: TranscriptSink) {
        let mut guard = lock(&self.capture);
        if guard.closed {
            sink.ended();
            return;
        }
        guard.sink = Some(sink);
        guard.continuous = continuous;
    }

    fn stop_capture(&mut self) {
        lock(&self.capture).sink = None;
    }
}
