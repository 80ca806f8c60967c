//! Tagmap line tokenization.
//!
//! A rule line has the shape `<recipients>: <tags>`. This module splits a line
//! into its two halves and tokenizes the tag half into positive, negative and
//! wildcard tokens. Assembling tokens into a [`TagExpression`] happens here too;
//! the compiler only drives the line loop.

use crate::error::{Result, TagmailError};
use crate::ir::{Tag, TagExpression, NEGATION_MARKER, WILDCARD_TAG};
use once_cell::sync::Lazy;
use regex::Regex;

const COMMENT_MARKER: char = '#';
const RULE_SEPARATOR: char = ':';

static TAG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!?[-\w.]+$").expect("tag token pattern compiles"));

/// Tokens in the tag half of a rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Tag(Tag),
    Negated(Tag),
    Wildcard,
}

/// What a raw line turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    Comment,
    Rule {
        recipients: &'a str,
        tags: &'a str,
    },
}

/// Drop a trailing `# ...` comment. The marker only counts at the start of
/// the text or after whitespace.
fn strip_comment(text: &str) -> &str {
    let mut prev_is_space = true;
    for (idx, c) in text.char_indices() {
        if c == COMMENT_MARKER && prev_is_space {
            return &text[..idx];
        }
        prev_is_space = c.is_whitespace();
    }
    text
}

/// Classify a line and split rule lines at the first `:`.
///
/// The comment is removed before splitting, so a `:` inside it never acts as
/// the separator.
pub(crate) fn classify_line(line: &str, line_no: usize) -> Result<LineKind<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }
    if trimmed.starts_with(COMMENT_MARKER) {
        return Ok(LineKind::Comment);
    }

    let (recipients, tags) = strip_comment(trimmed)
        .split_once(RULE_SEPARATOR)
        .ok_or_else(|| {
            TagmailError::malformed(line_no, line, "missing ':' between recipients and tags")
        })?;

    Ok(LineKind::Rule {
        recipients: recipients.trim(),
        tags: tags.trim(),
    })
}

/// Split a recipient list on commas and whitespace.
pub(crate) fn split_recipients(recipients: &str, line_no: usize, line: &str) -> Result<Vec<String>> {
    let list: Vec<String> = recipients
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect();

    if list.is_empty() {
        return Err(TagmailError::malformed(line_no, line, "no recipients"));
    }

    Ok(list)
}

/// Tokenize a comma-separated tag list.
pub(crate) fn tokenize_tags(tags: &str, line_no: usize, line: &str) -> Result<Vec<Token>> {
    if tags.is_empty() {
        return Err(TagmailError::malformed(line_no, line, "empty tag list"));
    }

    let mut tokens = Vec::new();
    for raw in tags.split(',') {
        let token = raw.trim();
        if !TAG_TOKEN.is_match(token) {
            return Err(TagmailError::malformed(
                line_no,
                line,
                format!("invalid tag {token:?}"),
            ));
        }

        match token.strip_prefix(NEGATION_MARKER) {
            Some(WILDCARD_TAG) => {
                return Err(TagmailError::malformed(
                    line_no,
                    line,
                    format!("the wildcard '{WILDCARD_TAG}' cannot be negated"),
                ));
            }
            Some(negated) => tokens.push(Token::Negated(negated.to_string())),
            None if token == WILDCARD_TAG => tokens.push(Token::Wildcard),
            None => tokens.push(Token::Tag(token.to_string())),
        }
    }

    Ok(tokens)
}

/// Build an expression from tokens, collapsing duplicates.
pub(crate) fn build_expression(tokens: Vec<Token>, line_no: usize, line: &str) -> Result<TagExpression> {
    let mut positive: Vec<Tag> = Vec::new();
    let mut negative: Vec<Tag> = Vec::new();

    for token in tokens {
        let (target, tag) = match token {
            Token::Tag(tag) => (&mut positive, tag),
            Token::Wildcard => (&mut positive, WILDCARD_TAG.to_string()),
            Token::Negated(tag) => (&mut negative, tag),
        };
        if !target.contains(&tag) {
            target.push(tag);
        }
    }

    if positive.is_empty() {
        return Err(TagmailError::malformed(line_no, line, "no positive tags"));
    }

    Ok(TagExpression::new(positive, negative))
}
