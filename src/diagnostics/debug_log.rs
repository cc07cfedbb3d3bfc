use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use log::debug;

/// Append-only, best-effort diagnostic sink.
///
/// Mirrors decode attempts, backend parameters and scan summaries into
/// `<log_dir>/vigie-debug.log`. Gated by the debug flag except for advisory
/// lines (backend chosen, substrate unavailable), which are always written.
/// Writing never fails and never blocks the report: IO errors are swallowed.
#[derive(Clone)]
pub struct DebugSink {
    file: Option<PathBuf>,
    enabled: bool,
}

impl DebugSink {
    pub fn new(log_dir: Option<PathBuf>, enabled: bool) -> Self {
        let file = log_dir.map(|dir| dir.join("vigie-debug.log"));
        Self { file, enabled }
    }

    /// A sink that only feeds the `log` facade, never a file.
    pub fn disabled() -> Self {
        Self {
            file: None,
            enabled: false,
        }
    }

    /// Debug-gated line.
    pub fn note(&self, message: &str, context: serde_json::Value) {
        if self.enabled {
            self.write_line(message, &context);
        }
        debug!("{} {}", message, context);
    }

    /// Always-on advisory line, regardless of the debug flag.
    pub fn advise(&self, message: &str, context: serde_json::Value) {
        self.write_line(message, &context);
        debug!("{} {}", message, context);
    }

    fn write_line(&self, message: &str, context: &serde_json::Value) {
        let Some(path) = &self.file else {
            return;
        };

        let mut line = format!("{} {}", Utc::now().format("%Y-%m-%d %H:%M:%S"), message);
        if !context.is_null() {
            line.push(' ');
            line.push_str(&context.to_string());
        }
        line.push('\n');

        // Best effort only.
        let _ = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
    }
}
