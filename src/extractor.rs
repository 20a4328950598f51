//! Demographic pattern matcher: self-reported gender and age from free text.
//!
//! Gender and age are determined independently by two ordered rule cascades.
//! Absence of a match is a normal result (`None`), never an error.

use crate::patterns::{
    age_phrase_rule, age_shorthand_rule, leading_shorthand_rule, self_noun_phrase_rule,
    self_shorthand_rule, Code,
};
use crate::rules::{Guard, Rule, RuleMatch, RuleSet};
use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of statement an age was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgeCue {
    /// "i am 30 years old"
    Phrase,
    /// "i'm 23f", "(25m)"
    Shorthand,
}

#[derive(Clone, Copy, Debug)]
pub struct ExtractOptions {
    /// Drop double-quoted passages before matching (reported speech).
    pub strip_quotes: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { strip_quotes: true }
    }
}

/// Both determinations for one text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub gender: Option<Gender>,
    pub age: Option<String>,
}

impl Demographics {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.age.is_none()
    }
}

/// Compiled rule cascades. Immutable once built; share by reference.
#[derive(Debug)]
pub struct DemographicsExtractor {
    gender_rules: RuleSet<Gender>,
    age_rules: RuleSet<AgeCue>,
    quoted: Regex,
    spaces: Regex,
    digits: Regex,
    opts: ExtractOptions,
}

static SHARED: OnceLock<DemographicsExtractor> = OnceLock::new();

impl DemographicsExtractor {
    pub fn new() -> Result<Self> {
        Self::with_options(ExtractOptions::default())
    }

    pub fn with_options(opts: ExtractOptions) -> Result<Self> {
        let gender_rules = RuleSet::new(vec![
            Rule::new(
                "male_noun_phrase",
                Gender::Male,
                &self_noun_phrase_rule(Code::Male),
                Guard::None,
            )?,
            Rule::new(
                "male_shorthand",
                Gender::Male,
                &self_shorthand_rule(Code::Male),
                Guard::None,
            )?,
            Rule::new(
                "male_leading_shorthand",
                Gender::Male,
                &leading_shorthand_rule(Code::Male),
                Guard::None,
            )?,
            Rule::new(
                "female_noun_phrase",
                Gender::Female,
                &self_noun_phrase_rule(Code::Female),
                Guard::None,
            )?,
            Rule::new(
                "female_shorthand",
                Gender::Female,
                &self_shorthand_rule(Code::Female),
                Guard::None,
            )?,
            Rule::new(
                "female_leading_shorthand",
                Gender::Female,
                &leading_shorthand_rule(Code::Female),
                Guard::None,
            )?,
        ]);
        let age_rules = RuleSet::new(vec![
            Rule::new("age_phrase", AgeCue::Phrase, &age_phrase_rule(), Guard::NotHypothetical)?,
            Rule::new("age_shorthand", AgeCue::Shorthand, &age_shorthand_rule(), Guard::None)?,
            Rule::new(
                "age_leading_shorthand",
                AgeCue::Shorthand,
                &leading_shorthand_rule(Code::Either),
                Guard::None,
            )?,
        ]);
        Ok(Self {
            gender_rules,
            age_rules,
            quoted: Regex::new(r#""[^"]+"|“[^”]+”"#)?,
            spaces: Regex::new(r" {2,}")?,
            digits: Regex::new(r"\d+")?,
            opts,
        })
    }

    /// Process-wide extractor with default options, compiled on first use.
    pub fn shared() -> &'static DemographicsExtractor {
        SHARED.get_or_init(|| {
            // The rule sources are fixed at compile time; failing here is a bug in `patterns`.
            DemographicsExtractor::new().expect("built-in demographic patterns must compile")
        })
    }

    pub fn options(&self) -> ExtractOptions {
        self.opts
    }

    /// Remove double-quoted passages, then collapse the leftover runs of spaces.
    pub fn strip_quotes<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.quoted.replace_all(text, "") {
            Cow::Borrowed(_) => self.spaces.replace_all(text, " "),
            Cow::Owned(s) => Cow::Owned(self.spaces.replace_all(&s, " ").into_owned()),
        }
    }

    fn prepare<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.opts.strip_quotes { self.strip_quotes(text) } else { Cow::Borrowed(text) }
    }

    pub fn determine_gender(&self, text: &str) -> Option<Gender> {
        self.return_gender_match(text).map(|m| m.label)
    }

    pub fn determine_age(&self, text: &str) -> Option<String> {
        self.return_age_match(text).and_then(|m| self.age_from_match(&m))
    }

    /// The gender rule that fired; its span refers to the prepared text.
    pub fn return_gender_match(&self, text: &str) -> Option<RuleMatch<Gender>> {
        self.gender_rules.first_match(&self.prepare(text))
    }

    /// The age rule that fired; its span refers to the prepared text.
    pub fn return_age_match(&self, text: &str) -> Option<RuleMatch<AgeCue>> {
        self.age_rules.first_match(&self.prepare(text))
    }

    /// Runs both cascades over one prepared copy of `text`.
    pub fn extract(&self, text: &str) -> Demographics {
        let prepared = self.prepare(text);
        let gender = self.gender_rules.first_match(&prepared).map(|m| m.label);
        let age = self
            .age_rules
            .first_match(&prepared)
            .and_then(|m| self.age_from_match(&m));
        Demographics { gender, age }
    }

    /// First digit run inside the matched text. For shorthand with stray digits
    /// nearby this can pick the wrong number; callers rely on this behaviour.
    fn age_from_match(&self, m: &RuleMatch<AgeCue>) -> Option<String> {
        self.digits.find(&m.text).map(|d| d.as_str().to_string())
    }
}
