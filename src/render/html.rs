//! HTML rendering of a finished report.
//!
//! Plumbing around the core: it only consumes the normalized record lists
//! and never fails. Sections that scanned empty (or whose substrate was
//! unavailable) render an explicit empty state instead of an error page.

use crate::records::types::{LoginEvent, SessionRecord};
use crate::report::facade::Report;

pub fn render_report(report: &Report) -> String {
    let mut html = String::from("<div id=\"vigie-report\">\n");
    html.push_str("<h1>Sessions &amp; login activity</h1>\n");

    html.push_str("<div class=\"section vigie-section-sessions\">\n");
    html.push_str("<h2 class=\"section-title\">Active sessions</h2>\n");
    html.push_str(&render_sessions_table(&report.sessions));
    html.push_str("</div>\n");

    html.push_str("<div class=\"section vigie-section-logins\">\n");
    html.push_str("<h2 class=\"section-title\">Recent logins</h2>\n");
    html.push_str(&render_logins_table(&report.logins));
    html.push_str("</div>\n");

    html.push_str("</div>\n");
    html
}

pub fn render_sessions_table(sessions: &[SessionRecord]) -> String {
    if sessions.is_empty() {
        return String::from("<div class=\"vigie-empty\">No sessions found</div>\n");
    }

    let mut h = String::from("<table class=\"vigie-table vigie-sessions\">\n");
    h.push_str("<thead><tr><th>Last activity</th><th>User</th><th>IP</th><th>Host</th><th>User agent</th></tr></thead>\n<tbody>\n");

    for row in sessions {
        // Prefer the resolved username, fall back to a UID label.
        let user_label = if !row.username.is_empty() {
            row.username.clone()
        } else if let Some(uid) = row.user_id {
            format!("UID {}", uid)
        } else {
            String::new()
        };

        h.push_str("<tr>");
        h.push_str(&format!("<td>{}</td>", escape(&row.last_activity)));
        h.push_str(&format!("<td>{}</td>", escape(&user_label)));
        h.push_str(&format!("<td>{}</td>", escape(&row.ip)));
        h.push_str(&format!("<td>{}</td>", escape(&row.storage_host)));
        h.push_str(&format!(
            "<td class=\"vigie-agent\">{}</td>",
            escape(&row.user_agent)
        ));
        h.push_str("</tr>\n");
    }

    h.push_str("</tbody></table>\n");
    h
}

pub fn render_logins_table(events: &[LoginEvent]) -> String {
    if events.is_empty() {
        return String::from("<div class=\"vigie-empty\">No login events found</div>\n");
    }

    let mut h = String::from("<table class=\"vigie-table vigie-logins\">\n");
    h.push_str("<thead><tr><th>When</th><th>User</th><th>IP</th><th>Device</th><th>Result</th></tr></thead>\n<tbody>\n");

    for row in events {
        let (class, label) = if row.success {
            ("result-ok", "OK")
        } else {
            ("result-fail", "Failed")
        };

        h.push_str("<tr>");
        h.push_str(&format!("<td>{}</td>", escape(&row.timestamp)));
        h.push_str(&format!("<td>{}</td>", escape(&row.user)));
        h.push_str(&format!("<td>{}</td>", escape(&row.ip)));
        h.push_str(&format!(
            "<td class=\"vigie-device\">{}</td>",
            escape(&row.device)
        ));
        h.push_str(&format!(
            "<td class=\"vigie-result {}\">{}</td>",
            class, label
        ));
        h.push_str("</tr>\n");
    }

    h.push_str("</tbody></table>\n");
    h
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
