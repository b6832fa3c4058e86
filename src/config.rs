use std::time::Duration;

/// Which Speech Output adapter the binary wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackend {
    /// Prompts are logged and printed, completion is immediate.
    Console,
    /// Prompts are spoken through the platform `say` command.
    Say,
}

/// Runtime configuration for the voice flow and the mock queue.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Quiet period after the last transcript before it is committed.
    pub debounce: Duration,
    pub minutes_per_patient: u32,
    /// Highest queue number the mock assignment hands out.
    pub max_position: u32,
    pub speech: SpeechBackend,
    pub telemetry_capacity: usize,
}

pub const DEFAULT_DEBOUNCE_MS: u64 = 1_200;
pub const DEFAULT_MINUTES_PER_PATIENT: u32 = 15;
pub const DEFAULT_MAX_POSITION: u32 = 20;
pub const DEFAULT_TELEMETRY_CAPACITY: usize = 10_000;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .and_then(|v| v.trim().parse::<T>().ok())
}

impl Default for FlowConfig {
    fn default() -> Self {
        let speech = match std::env::var("GRAMQUEUE_SPEECH")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            Ok("say") => SpeechBackend::Say,
            _ => SpeechBackend::Console,
        };

        Self {
            debounce: Duration::from_millis(
                env_parse("GRAMQUEUE_DEBOUNCE_MS").unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            minutes_per_patient: env_parse("GRAMQUEUE_MINUTES_PER_PATIENT")
                .unwrap_or(DEFAULT_MINUTES_PER_PATIENT),
            // Zero would make the position range empty.
            max_position: env_parse("GRAMQUEUE_MAX_POSITION")
                .filter(|v: &u32| *v > 0)
                .unwrap_or(DEFAULT_MAX_POSITION),
            speech,
            telemetry_capacity: env_parse("GRAMQUEUE_TELEMETRY_CAPACITY")
                .unwrap_or(DEFAULT_TELEMETRY_CAPACITY),
        }
    }
}

impl FlowConfig {
    /// Fixed defaults, ignoring the environment. Used by tests.
    pub fn fixed() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            minutes_per_patient: DEFAULT_MINUTES_PER_PATIENT,
            max_position: DEFAULT_MAX_POSITION,
            speech: SpeechBackend::Console,
            telemetry_capacity: DEFAULT_TELEMETRY_CAPACITY,
        }
    }
}
