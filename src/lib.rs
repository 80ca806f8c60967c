//! # Tagmail
//!
//! Routes the log records of a configuration run to recipient groups by tag.
//!
//! A tagmap is a list of rules of the form `recipients: tags`. Each rule
//! selects the records carrying at least one of its positive tags (or every
//! record, for the `all` wildcard) and none of its `!negated` tags. Every rule
//! that selects something produces one [`RoutedGroup`]: the rule's recipients
//! and the rendered records, one per line.
//!
//! ## Quick Start
//!
//! ### Routing
//!
//! ```rust
//! use tagmail::{route, LogLevel, LogRecord, TagmapCompiler};
//!
//! let rules = TagmapCompiler::new().compile(
//!     "# who gets what\n\
//!      ops@example.com: all, !noisy\n\
//!      web@example.com, lead@example.com: nginx\n",
//! )?;
//!
//! let logs = vec![
//!     LogRecord::new(LogLevel::Notice, "nginx restarted").with_tag("nginx"),
//!     LogRecord::new(LogLevel::Debug, "cache warm").with_tag("noisy"),
//! ];
//!
//! let groups = route(&rules, &logs)?;
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[1].recipients, vec!["web@example.com", "lead@example.com"]);
//! # Ok::<(), tagmail::TagmailError>(())
//! ```
//!
//! ### Processing a report
//!
//! ```rust,no_run
//! use tagmail::{Report, ReportProcessor, TagmailConfig};
//!
//! let config = TagmailConfig::from_file("/etc/puppet/tagmail.yaml")?;
//! let processor = ReportProcessor::new(config);
//!
//! let report = Report::from_file("/var/lib/puppet/reports/last_run_report.yaml")?;
//! let outcome = processor.process(&report)?;
//! println!("{outcome:?}");
//! # Ok::<(), tagmail::TagmailError>(())
//! ```
//!
//! ### Custom records
//!
//! Anything implementing [`Record`] can be routed:
//!
//! ```rust
//! use tagmail::{parse, route, Record, Result};
//!
//! struct Event {
//!     tags: Vec<String>,
//!     text: String,
//! }
//!
//! impl Record for Event {
//!     fn is_tagged(&self, tag: &str) -> bool {
//!         self.tags.iter().any(|t| t == tag)
//!     }
//!
//!     fn render(&self) -> Result<String> {
//!         Ok(self.text.clone())
//!     }
//! }
//!
//! let rules = parse("dba@example.com: mysql")?;
//! let events = vec![Event { tags: vec!["mysql".into()], text: "schema migrated".into() }];
//! let groups = route(&rules, &events)?;
//! assert_eq!(groups[0].body, "schema migrated");
//! # Ok::<(), tagmail::TagmailError>(())
//! ```

pub mod compiler;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ir;
pub mod matcher;
pub mod processor;
pub mod render;
pub mod report;

// Tagmap compilation
pub use compiler::{parse, TagmapCompiler};

// Routing
pub use engine::{route, RoutingEngine};
pub use render::render;

// Configuration
pub use config::{DeliveryConfig, EngineConfig, ParallelConfig, TagmailConfig};

// Core types and errors
pub use error::{Result, TagmailError};
pub use ir::{RoutedGroup, Rule, RuleSet, Tag, TagExpression, WILDCARD_TAG};

// Records
pub use matcher::{LogLevel, LogRecord, Record};

// Reports and delivery
pub use dispatch::{DetachedDispatcher, Dispatch, MailMessage, Mailer, Transport};
pub use processor::{ProcessOutcome, ReportProcessor};
pub use report::{Report, ResourceMetrics};
