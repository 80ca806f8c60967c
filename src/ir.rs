//! Core data structures shared by the compiler, the matching engine and
//! the delivery adapter.

use std::fmt;

pub type Tag = String;

/// Reserved positive token that matches every record.
pub const WILDCARD_TAG: &str = "all";

/// Marker that turns a tag token into a negative predicate.
pub const NEGATION_MARKER: char = '!';

/// Positive and negative tag predicates of a single rule.
///
/// `positive` is never empty for expressions produced by the compiler. When it
/// holds [`WILDCARD_TAG`] every record is a candidate; the wildcard is never
/// compared against a record's tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TagExpression {
    pub positive: Vec<Tag>,
    pub negative: Vec<Tag>,
}

impl TagExpression {
    pub fn new(positive: Vec<Tag>, negative: Vec<Tag>) -> Self {
        Self { positive, negative }
    }

    pub fn is_wildcard(&self) -> bool {
        self.positive.iter().any(|tag| tag == WILDCARD_TAG)
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.positive {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(tag)?;
        }
        for tag in &self.negative {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{NEGATION_MARKER}{tag}")?;
        }
        Ok(())
    }
}

/// One line of a tagmap: who gets notified, and about what.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub recipients: Vec<String>,
    pub expression: TagExpression,
    /// 1-based line in the source text.
    pub line: usize,
}

impl Rule {
    pub fn new(recipients: Vec<String>, expression: TagExpression, line: usize) -> Self {
        Self {
            recipients,
            expression,
            line,
        }
    }

    pub fn recipient_list(&self) -> String {
        self.recipients.join(",")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.recipients.join(", "), self.expression)
    }
}

/// Ordered rules compiled from one tagmap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Rendered report body addressed to one rule's recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedGroup {
    pub recipients: Vec<String>,
    pub body: String,
}

impl RoutedGroup {
    pub fn new(recipients: Vec<String>, body: String) -> Self {
        Self { recipients, body }
    }
}
