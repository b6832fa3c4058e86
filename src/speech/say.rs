use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{PromptSink, SpeechOutput};

#[derive(Debug)]
struct Playback {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Speaks through the platform `say` command. One child process at a time;
/// a new utterance kills the previous one.
#[derive(Debug)]
pub struct SaySpeech {
    program: String,
    current: Option<Playback>,
}

impl Default for SaySpeech {
    fn default() -> Self {
        Self::new("say")
    }
}

impl SaySpeech {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            current: None,
        }
    }
}

impl SpeechOutput for SaySpeech {
    fn speak(&mut self, text: &str, sink: Option<PromptSink>) {
        self.cancel();

        let mut child = match Command::new(&self.program)
            .arg(text)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn '{}': {}", self.program, e);
                if let Some(sink) = sink {
                    sink.failed(e.to_string());
                }
                return;
            }
        };

        let (stop, mut stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    let Some(sink) = sink else { return };
                    match status {
                        Ok(status) if status.success() => sink.finished(),
                        Ok(status) => sink.failed(format!("exited with {}", status)),
                        Err(e) => sink.failed(e.to_string()),
                    }
                }
                // Err: the sender went to take_playback; keep playing.
                Ok(()) = &mut stop_rx => {
                    debug!("Utterance cancelled");
                    let _ = child.kill().await;
                }
            }
        });
        self.current = Some(Playback { stop, task });
    }

    fn cancel(&mut self) {
        if let Some(playback) = self.current.take() {
            let _ = playback.stop.send(());
        }
    }

    fn take_playback(&mut self) -> Option<JoinHandle<()>> {
        self.current.take().map(|playback| playback.task)
    }
}
