use std::path::Path;

use crate::error_handling::types::LogError;
use crate::login_log::parser::parse_login_line;
use crate::records::types::LoginEvent;

/// Only the newest lines of the file are considered; older ones are
/// discarded, not the recent ones.
pub const LOG_TAIL_LINES: usize = 200;

/// Read the login log tail and parse each line independently.
///
/// Blank and unparseable lines are skipped silently; a malformed line never
/// aborts processing of the rest. An unreadable file is an error the façade
/// degrades to an empty section.
pub fn read_login_events(path: &Path) -> Result<Vec<LoginEvent>, LogError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LogError::Unreadable(path.to_path_buf())
        } else {
            LogError::ReadFailed(e)
        }
    })?;

    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let tail = if lines.len() > LOG_TAIL_LINES {
        &lines[lines.len() - LOG_TAIL_LINES..]
    } else {
        &lines[..]
    };

    Ok(tail.iter().filter_map(|line| parse_login_line(line)).collect())
}
