//! Worker services and configuration.

mod config;
mod resize;
mod state;

pub use config::{DEFAULT_MAX_CONCURRENT_JOBS, WorkerConfig};
pub use resize::AvatarProcessor;
pub use state::WorkerState;
