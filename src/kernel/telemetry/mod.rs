//! Dialogue lifecycle telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side layer. The controller never reads it back
//! when deciding anything.
//!
//! # PRIVACY INVARIANT
//! Events never carry what the patient said. Only session ids, step names
//! and outcome kinds are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
