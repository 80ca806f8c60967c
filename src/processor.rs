//! End-of-run report processing.
//!
//! Glues the pieces together for one report: check the tagmap exists, skip
//! runs that changed nothing, compile the tagmap, route the report's logs and
//! hand the groups to a [`Dispatch`] implementation.

use crate::compiler::TagmapCompiler;
use crate::config::TagmailConfig;
use crate::dispatch::{DetachedDispatcher, Dispatch};
use crate::engine::RoutingEngine;
use crate::error::Result;
use crate::report::Report;
use tracing::{info, warn};

/// What happened to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    MissingTagmap,
    NoChanges,
    NothingMatched,
    Dispatched { groups: usize },
}

pub struct ReportProcessor<D = DetachedDispatcher> {
    config: TagmailConfig,
    compiler: TagmapCompiler,
    engine: RoutingEngine,
    dispatcher: D,
}

impl ReportProcessor<DetachedDispatcher> {
    /// Processor that mails reports from a detached worker thread.
    pub fn new(config: TagmailConfig) -> Self {
        let dispatcher = DetachedDispatcher::new(config.delivery.clone());
        Self::with_dispatcher(config, dispatcher)
    }
}

impl<D: Dispatch> ReportProcessor<D> {
    pub fn with_dispatcher(config: TagmailConfig, dispatcher: D) -> Self {
        let engine = RoutingEngine::with_config(config.engine.clone());
        Self {
            config,
            compiler: TagmapCompiler::new(),
            engine,
            dispatcher,
        }
    }

    pub fn config(&self) -> &TagmailConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Process one report.
    ///
    /// # Errors
    /// A malformed tagmap, an unreadable tagmap or a record that fails to
    /// render aborts processing before anything is dispatched.
    pub fn process(&self, report: &Report) -> Result<ProcessOutcome> {
        let tagmap = &self.config.tagmap;
        if !tagmap.exists() {
            warn!(
                tagmap = %tagmap.display(),
                "Cannot send tagmail report; no tagmap file {}",
                tagmap.display()
            );
            return Ok(ProcessOutcome::MissingTagmap);
        }

        if !report.has_changes() {
            info!(host = %report.host, "Not sending tagmail report; no changes");
            return Ok(ProcessOutcome::NoChanges);
        }

        let rules = self.compiler.compile_file(tagmap)?;
        let groups = self.engine.route(&rules, &report.logs)?;
        if groups.is_empty() {
            return Ok(ProcessOutcome::NothingMatched);
        }

        let count = groups.len();
        self.dispatcher.dispatch(&report.host, groups)?;
        Ok(ProcessOutcome::Dispatched { groups: count })
    }
}
