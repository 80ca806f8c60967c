//! Mail message assembly.

use chrono::{DateTime, FixedOffset, Local};
use std::fmt::Write as _;

/// One report mail, addressed to one recipient group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub date: DateTime<FixedOffset>,
    pub body: String,
}

impl MailMessage {
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            date: Local::now().into(),
            body: body.into(),
        }
    }

    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = date;
        self
    }

    /// Headers, a blank line, then the body, with `\n` line endings.
    pub fn format(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        // Writing into a String never fails.
        let _ = writeln!(out, "From: {}", header_value(&self.from));
        let _ = writeln!(out, "Subject: {}", header_value(&self.subject));
        let _ = writeln!(out, "To: {}", header_value(&self.to.join(", ")));
        let _ = writeln!(out, "Date: {}", self.date.to_rfc2822());
        out.push('\n');
        out.push_str(&self.body);
        if !self.body.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Header values stay on one line: CR and LF become spaces.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
