//! Routing engine.
//!
//! `RoutingEngine` evaluates each rule of a [`RuleSet`] against a record
//! collection and produces one [`RoutedGroup`] per rule that matched at least
//! one record.
//!
//! # Ordering
//!
//! Groups come out in rule order. Inside a group, records keep the order of
//! the input slice. A record matching several rules is rendered into each of
//! their bodies.
//!
//! # Examples
//!
//! ```rust
//! use tagmail::{LogLevel, LogRecord, RoutingEngine, TagmapCompiler};
//!
//! let rules = TagmapCompiler::new().compile("a@x: build, !flaky")?;
//! let records = vec![
//!     LogRecord::new(LogLevel::Notice, "built").with_tag("build"),
//!     LogRecord::new(LogLevel::Notice, "retried").with_tags(["build", "flaky"]),
//!     LogRecord::new(LogLevel::Notice, "shipped").with_tag("deploy"),
//! ];
//!
//! let groups = RoutingEngine::new().route(&rules, &records)?;
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].recipients, vec!["a@x"]);
//! assert!(groups[0].body.ends_with("built"));
//! # Ok::<(), tagmail::TagmailError>(())
//! ```

use crate::config::EngineConfig;
use crate::error::Result;
use crate::ir::{RoutedGroup, Rule, RuleSet};
use crate::matcher::Record;
use crate::render::render;
use rayon::prelude::*;
use tracing::{debug, info};

/// Stateless evaluator from (rules, records) to routed groups.
#[derive(Debug, Clone, Default)]
pub struct RoutingEngine {
    config: EngineConfig,
}

impl RoutingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Route `records` through every rule of `rules`.
    ///
    /// Rules with no matching record produce no group; an info-level
    /// `No messages to report to ...` notice is logged for each of them, in rule
    /// order.
    ///
    /// # Errors
    /// The first record that fails to render aborts the pass. No groups are
    /// returned in that case.
    pub fn route<R>(&self, rules: &RuleSet, records: &[R]) -> Result<Vec<RoutedGroup>>
    where
        R: Record + Sync,
    {
        let bodies: Vec<Option<String>> = if self.config.use_parallel(rules.len()) {
            debug!(rules = rules.len(), records = records.len(), "routing in parallel");
            rules
                .rules
                .par_iter()
                .map(|rule| evaluate_rule(rule, records))
                .collect::<Result<_>>()?
        } else {
            rules
                .iter()
                .map(|rule| evaluate_rule(rule, records))
                .collect::<Result<_>>()?
        };

        let mut groups = Vec::new();
        for (rule, body) in rules.iter().zip(bodies) {
            match body {
                Some(body) => groups.push(RoutedGroup::new(rule.recipients.clone(), body)),
                None => info!(
                    recipients = %rule.recipient_list(),
                    line = rule.line,
                    "No messages to report to {}",
                    rule.recipient_list()
                ),
            }
        }

        debug!(groups = groups.len(), "routing pass complete");
        Ok(groups)
    }
}

/// Rendered body for one rule, or `None` when nothing matched.
fn evaluate_rule<R: Record>(rule: &Rule, records: &[R]) -> Result<Option<String>> {
    let matched = rule.expression.select(records);
    if matched.is_empty() {
        return Ok(None);
    }
    render(matched.as_slice()).map(Some)
}

/// Route with a default engine.
pub fn route<R: Record + Sync>(rules: &RuleSet, records: &[R]) -> Result<Vec<RoutedGroup>> {
    RoutingEngine::new().route(rules, records)
}
