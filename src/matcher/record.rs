//! Records the engine routes, and the log record shipped with the crate.

use crate::error::{Result, TagmailError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Anything the routing engine can match and render.
///
/// The engine only queries tag membership and asks for the report text; it
/// never mutates a record.
///
/// # Example
/// ```rust
/// use tagmail::{Record, Result};
///
/// struct Change {
///     tags: Vec<&'static str>,
///     summary: String,
/// }
///
/// impl Record for Change {
///     fn is_tagged(&self, tag: &str) -> bool {
///         self.tags.iter().any(|t| *t == tag)
///     }
///
///     fn render(&self) -> Result<String> {
///         Ok(self.summary.clone())
///     }
/// }
/// ```
pub trait Record {
    /// Exact, case-sensitive tag membership.
    fn is_tagged(&self, tag: &str) -> bool;

    /// Text of this record as it appears in a report body.
    fn render(&self) -> Result<String>;
}

impl<R: Record + ?Sized> Record for &R {
    fn is_tagged(&self, tag: &str) -> bool {
        (**self).is_tagged(tag)
    }

    fn render(&self) -> Result<String> {
        (**self).render()
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn is_tagged(&self, tag: &str) -> bool {
        (**self).is_tagged(tag)
    }

    fn render(&self) -> Result<String> {
        (**self).render()
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn is_tagged(&self, tag: &str) -> bool {
        (**self).is_tagged(tag)
    }

    fn render(&self) -> Result<String> {
        (**self).render()
    }
}

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Err,
    Alert,
    Emerg,
    Crit,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Err => "err",
            LogLevel::Alert => "alert",
            LogLevel::Emerg => "emerg",
            LogLevel::Crit => "crit",
        };
        f.write_str(name)
    }
}

/// One log line from a configuration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub source: String,
    #[serde(default = "Utc::now")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            source: String::new(),
            time: Utc::now(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl Record for LogRecord {
    fn is_tagged(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// `<time> <source> (<level>): <message>`; the source is left out when empty.
    fn render(&self) -> Result<String> {
        if self.message.trim().is_empty() {
            return Err(TagmailError::RenderError(format!(
                "log record at {} has no message",
                self.time.to_rfc3339()
            )));
        }

        let time = self.time.format("%Y-%m-%d %H:%M:%S %z");
        if self.source.is_empty() {
            Ok(format!("{time} ({}): {}", self.level, self.message))
        } else {
            Ok(format!(
                "{time} {} ({}): {}",
                self.source, self.level, self.message
            ))
        }
    }
}
