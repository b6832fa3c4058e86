pub mod config;
pub mod error;
pub mod kernel;
pub mod queue;
pub mod speech;

pub use config::FlowConfig;
pub use error::DialogueError;
pub use kernel::controller::DialogueController;
pub use kernel::reactor::Reactor;
