use crate::records::types::{LoginEvent, SessionRecord};

/// Who is looking at the report. Supplied by the host: the engine does not
/// compute access policy, it only applies the self-view restriction.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub is_admin: bool,
    pub self_view_allowed: bool,
    /// The viewer's own resolved login name, if any.
    pub login: Option<String>,
}

impl Viewer {
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            self_view_allowed: false,
            login: None,
        }
    }

    pub fn self_view(login: &str) -> Self {
        Self {
            is_admin: false,
            self_view_allowed: true,
            login: Some(login.to_string()),
        }
    }

    /// Whether this viewer may see the report at all.
    pub fn may_view(&self) -> bool {
        self.is_admin || self.self_view_allowed
    }

    /// Whether the self-view filter applies.
    pub fn restricted(&self) -> bool {
        !self.is_admin && self.self_view_allowed
    }
}

/// Keep only sessions provably belonging to `login` (case-insensitive).
/// Records with no resolvable username are dropped: they cannot be shown to
/// belong to the viewer.
pub fn filter_sessions_for(login: &str, sessions: Vec<SessionRecord>) -> Vec<SessionRecord> {
    if login.is_empty() {
        return Vec::new();
    }
    sessions
        .into_iter()
        .filter(|s| !s.username.is_empty() && s.username.eq_ignore_ascii_case(login))
        .collect()
}

/// Same policy for login events.
pub fn filter_logins_for(login: &str, events: Vec<LoginEvent>) -> Vec<LoginEvent> {
    if login.is_empty() {
        return Vec::new();
    }
    events
        .into_iter()
        .filter(|e| !e.user.is_empty() && e.user.eq_ignore_ascii_case(login))
        .collect()
}
