//! Tagmap compiler.
//!
//! This module turns tagmap text into an ordered [`RuleSet`]. One non-blank,
//! non-comment line yields one [`Rule`]:
//!
//! ```text
//! # who: what
//! ops@example.com, oncall@example.com: all, !noisy
//! release@example.com: build, deploy
//! ```
//!
//! Any malformed line rejects the whole tagmap; a partial rule set is never
//! returned.
//!
//! # Examples
//!
//! ```rust
//! use tagmail::TagmapCompiler;
//!
//! let compiler = TagmapCompiler::new();
//! let rules = compiler.compile("a@x: build, !flaky\n")?;
//! assert_eq!(rules.len(), 1);
//! assert_eq!(rules.rules[0].expression.negative, vec!["flaky"]);
//! # Ok::<(), tagmail::TagmailError>(())
//! ```

pub mod parser;

use crate::error::Result;
use crate::ir::{Rule, RuleSet};
use parser::LineKind;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Compiles tagmap text into rules.
#[derive(Debug, Clone, Default)]
pub struct TagmapCompiler;

impl TagmapCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile tagmap text, preserving line order.
    ///
    /// # Errors
    /// Returns [`TagmailError::MalformedRule`](crate::TagmailError::MalformedRule)
    /// for the first line that cannot be split into recipients and tags, has an
    /// invalid tag, or has no positive tag.
    pub fn compile(&self, text: &str) -> Result<RuleSet> {
        let mut rules = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let (recipients, tags) = match parser::classify_line(line, line_no)? {
                LineKind::Blank | LineKind::Comment => continue,
                LineKind::Rule { recipients, tags } => (recipients, tags),
            };

            let recipients = parser::split_recipients(recipients, line_no, line)?;
            let tokens = parser::tokenize_tags(tags, line_no, line)?;
            let expression = parser::build_expression(tokens, line_no, line)?;

            rules.push(Rule::new(recipients, expression, line_no));
        }

        debug!(rules = rules.len(), "compiled tagmap");
        Ok(RuleSet::from_rules(rules))
    }

    /// Read and compile a tagmap file.
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<RuleSet> {
        let text = fs::read_to_string(path.as_ref())?;
        self.compile(&text)
    }
}

/// Compile tagmap text with a default compiler.
pub fn parse(text: &str) -> Result<RuleSet> {
    TagmapCompiler::new().compile(text)
}
