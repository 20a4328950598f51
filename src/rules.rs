//! Ordered first-match-wins rule evaluation over compiled patterns.

use crate::patterns::HYPOTHETICAL_MARKERS;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Extra condition a raw regex match must satisfy before a rule fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    None,
    /// Reject a match whose leading boundary follows "when", "if" or "until".
    NotHypothetical,
}

/// One compiled rule: a named pattern that yields `label` when it fires.
#[derive(Debug)]
pub struct Rule<L> {
    name: &'static str,
    label: L,
    regex: Regex,
    guard: Guard,
}

impl<L: Copy> Rule<L> {
    pub fn new(name: &'static str, label: L, pattern: &str, guard: Guard) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("compile rule `{name}`"))?;
        Ok(Self { name, label, regex, guard })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> L {
        self.label
    }

    /// First span in `text` that satisfies both the pattern and the guard.
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        let mut pos = 0;
        while pos <= text.len() {
            let m = self.regex.find_at(text, pos)?;
            if self.guard_allows(text, m.start()) {
                return Some(m.range());
            }
            // Retry one char further on so overlapping candidates are not lost.
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }

    fn guard_allows(&self, text: &str, start: usize) -> bool {
        match self.guard {
            Guard::None => true,
            Guard::NotHypothetical => !preceded_by_hypothetical(&text[..start]),
        }
    }
}

fn preceded_by_hypothetical(before: &str) -> bool {
    let word_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map_or(before.len(), |(i, _)| i);
    let word = &before[word_start..];
    HYPOTHETICAL_MARKERS.iter().any(|m| word.eq_ignore_ascii_case(m))
}

/// The rule that fired, with the span it matched in the searched text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMatch<L> {
    pub rule: &'static str,
    pub label: L,
    pub span: Range<usize>,
    pub text: String,
}

/// Rules in priority order.
#[derive(Debug)]
pub struct RuleSet<L> {
    rules: Vec<Rule<L>>,
}

impl<L: Copy> RuleSet<L> {
    pub fn new(rules: Vec<Rule<L>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule<L>] {
        &self.rules
    }

    /// Try each rule in order and stop at the first that fires.
    pub fn first_match(&self, text: &str) -> Option<RuleMatch<L>> {
        self.rules.iter().find_map(|rule| {
            let span = rule.find(text)?;
            tracing::trace!(rule = rule.name, start = span.start, end = span.end, "rule fired");
            Some(RuleMatch {
                rule: rule.name,
                label: rule.label,
                text: text[span.clone()].to_string(),
                span,
            })
        })
    }
}
