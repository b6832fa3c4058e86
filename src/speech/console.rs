use tracing::info;

use super::{PromptSink, SpeechOutput};

/// Prints prompts instead of speaking them. Completes immediately.
#[derive(Debug, Default)]
pub struct ConsoleSpeech;

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechOutput for ConsoleSpeech {
    fn speak(&mut self, text: &str, sink: Option<PromptSink>) {
        info!("Speaking {} chars", text.len());
        println!("[SPEAKER] {}", text);
        if let Some(sink) = sink {
            sink.finished();
        }
    }

    fn cancel(&mut self) {}
}
