// src/config/model.rs

use std::fmt;

use serde::Deserialize;

use crate::watch::patterns::RuleMatcher;

/// A rule record exactly as it appears in the YAML document.
///
/// ```yaml
/// - name: build
///   match: ["src/**/*.go", "!**/*_test.go"]
///   run: ["go build ./..."]
///
/// - name: server
///   delegate: ["./bin/server"]
///   run: ["go build -o bin/server ./cmd/server"]
/// ```
///
/// Only `name` is mandatory at the syntax level; everything else defaults
/// to an empty list and is checked by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    #[serde(default)]
    pub name: String,

    /// Glob patterns; a leading `!` marks an exclusion.
    #[serde(default, rename = "match")]
    pub patterns: Vec<String>,

    /// Commands executed (in order) at startup and whenever the rule is dirty.
    #[serde(default)]
    pub run: Vec<String>,

    /// Long-lived commands supervised in watch mode.
    #[serde(default)]
    pub delegate: Vec<String>,
}

/// Top-level document: an ordered sequence of rules.
pub type RawConfigFile = Vec<RawRule>;

/// A validated rule with its glob patterns compiled.
///
/// Rules are built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Rule {
    name: String,
    patterns: Vec<String>,
    run: Vec<String>,
    delegate: Vec<String>,
    matcher: RuleMatcher,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("run", &self.run)
            .field("delegate", &self.delegate)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// Construct a rule from parts that have already been validated.
    pub(crate) fn new_unchecked(raw: RawRule, matcher: RuleMatcher) -> Self {
        Self {
            name: raw.name,
            patterns: raw.patterns,
            run: raw.run,
            delegate: raw.delegate,
            matcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `match` patterns as written, including `!` prefixes.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn run_commands(&self) -> &[String] {
        &self.run
    }

    pub fn delegate_commands(&self) -> &[String] {
        &self.delegate
    }

    pub fn is_delegate(&self) -> bool {
        !self.delegate.is_empty()
    }

    /// Whether this rule takes part in dirty-set computation.
    ///
    /// Delegate rules never do, even when they also declare patterns.
    pub fn is_reactive(&self) -> bool {
        !self.is_delegate() && !self.patterns.is_empty()
    }

    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    /// True if this reactive rule is interested in `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.is_reactive() && self.matcher.matches(path)
    }
}

/// The validated, compiled rule list in declaration order.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    rules: Vec<Rule>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name() == name)
    }
}
