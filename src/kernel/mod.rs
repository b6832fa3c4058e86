pub mod controller;
pub mod debounce;
pub mod event;
pub mod intent;
pub mod lease;
pub mod reactor;
pub mod scheduler;
pub mod speech;
pub mod state;
pub mod telemetry;
