pub mod arbitrator;
pub mod types;
