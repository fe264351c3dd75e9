//! Service configuration and application state.

mod config;
mod error;
mod state;

pub use config::{AuthConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use state::ServiceState;
