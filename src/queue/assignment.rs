use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registration::Registration;
use crate::config::FlowConfig;

/// Position and estimated wait handed back for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTicket {
    /// Always >= 1.
    pub queue_number: u32,
    pub wait_minutes: u32,
}

/// Converts a completed registration into a queue position.
pub trait QueueAssignment: Send {
    fn assign(&mut self, registration: &Registration) -> QueueTicket;
}

/// Mock assignment: uniform random position, fixed minutes per patient ahead.
pub struct RandomAssignment {
    rng: Box<dyn RngCore + Send>,
    max_position: u32,
    minutes_per_patient: u32,
}

impl RandomAssignment {
    pub fn new(rng: Box<dyn RngCore + Send>, config: &FlowConfig) -> Self {
        Self {
            rng,
            max_position: config.max_position.max(1),
            minutes_per_patient: config.minutes_per_patient,
        }
    }
}

impl QueueAssignment for RandomAssignment {
    fn assign(&mut self, registration: &Registration) -> QueueTicket {
        let queue_number = self.rng.gen_range(1..=self.max_position);
        let ticket = QueueTicket {
            queue_number,
            wait_minutes: queue_number.saturating_mul(self.minutes_per_patient),
        };
        debug!(registration = %registration.id, queue_number, "Assigned queue position");
        ticket
    }
}

/// `H:MM`, as shown on the confirmation card.
pub fn format_wait(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}
