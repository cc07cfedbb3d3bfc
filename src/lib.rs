pub mod backends;
pub mod configuration;
pub mod decoding;
pub mod diagnostics;
pub mod error_handling;
pub mod login_log;
pub mod records;
pub mod render;
pub mod report;

pub use backends::{select_backend, BackendKind};
pub use configuration::Config;
pub use records::{LoginEvent, SessionRecord};
pub use report::{Aggregator, Report, Viewer};
