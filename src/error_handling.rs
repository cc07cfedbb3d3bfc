pub mod types;

pub use types::{BackendError, ConfigError, LogError};
