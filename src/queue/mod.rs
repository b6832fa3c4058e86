pub mod assignment;
pub mod registration;
pub mod sms;

pub use assignment::{format_wait, QueueAssignment, QueueTicket, RandomAssignment};
pub use registration::{synthetic_mobile, Registration};
pub use sms::parse_join_sms;
