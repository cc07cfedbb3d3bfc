use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Errors raised while talking to a session substrate.
///
/// Every variant degrades to an empty session list at the façade boundary;
/// none of them is fatal to the overall report.
#[derive(Debug)]
pub enum BackendError {
    DriverUnavailable(String),
    ConnectionFailed(String),
    AuthFailed(String),
    QueryFailed(String),
    BadDsn(String),
    NoDsn,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::DriverUnavailable(e) => write!(f, "Backend driver unavailable: {}", e),
            BackendError::ConnectionFailed(e) => write!(f, "Backend connection failed: {}", e),
            BackendError::AuthFailed(e) => write!(f, "Backend authentication failed: {}", e),
            BackendError::QueryFailed(e) => write!(f, "Backend query failed: {}", e),
            BackendError::BadDsn(e) => write!(f, "Bad connection string: {}", e),
            BackendError::NoDsn => write!(f, "No connection string available"),
        }
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug)]
pub enum LogError {
    Unreadable(PathBuf),
    ReadFailed(std::io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Unreadable(p) => write!(f, "Login log not readable: {}", p.display()),
            LogError::ReadFailed(e) => write!(f, "Login log read failed: {}", e),
        }
    }
}

impl std::error::Error for LogError {}
