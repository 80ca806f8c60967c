//! Tag matching over records.
//!
//! ## Core Components
//!
//! - [`Record`] - The capability contract: tag membership plus rendering
//! - [`LogRecord`] - Log line from a configuration run, as deserialized from a report
//! - [`filters`] - Candidate and exclusion predicates behind [`TagExpression::matches`]
//!
//! [`TagExpression::matches`]: crate::ir::TagExpression::matches

pub mod filters;
pub mod record;

pub use filters::{is_candidate, is_excluded};
pub use record::{LogLevel, LogRecord, Record};
