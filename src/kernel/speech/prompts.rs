use crate::kernel::state::Step;
use crate::queue::QueueTicket;

/// Spoken once per step, in step order.
const STEP_PROMPTS: [&str; 4] = [
    "Welcome to the clinic queue. Please say your full name.",
    "Which village are you coming from?",
    "What is the reason for your visit? You may stay silent to skip.",
    "Shall I add you to the queue? Please say yes or no.",
];

const CANCELLED: &str = "Your registration has been cancelled. Thank you.";
const RESTART: &str = "Some details were missing. Let us start again.";

/// Closing messages spoken after a step prompt is no longer needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    Joined(QueueTicket),
    Cancelled,
    Restart,
}

pub struct PromptTable;

impl PromptTable {
    pub fn prompt(step: Step) -> &'static str {
        STEP_PROMPTS[step.index()]
    }

    pub fn announcement(announcement: Announcement) -> String {
        match announcement {
            Announcement::Joined(ticket) => {
                let hours = ticket.wait_minutes / 60;
                let minutes = ticket.wait_minutes % 60;
                format!(
                    "You have joined the queue. Your queue number is {}. \
                     Estimated wait time is {} hours and {} minutes.",
                    ticket.queue_number, hours, minutes
                )
            }
            Announcement::Cancelled => CANCELLED.to_string(),
            Announcement::Restart => RESTART.to_string(),
        }
    }
}
