// src/watch/patterns.rs

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{DeriveError, Result};

/// Prefix that turns a `match` entry into an exclusion.
pub const EXCLUDE_PREFIX: char = '!';

/// Compiled include/exclude glob sets for a single rule.
///
/// Patterns are evaluated against paths relative to the watched root with
/// `/` separators, e.g. `"src/a/b.go"`. `*` stays inside one path segment,
/// `**` crosses segments.
#[derive(Clone)]
pub struct RuleMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl fmt::Debug for RuleMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleMatcher")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude.len())
            .finish()
    }
}

impl RuleMatcher {
    /// Compile the `match` list of rule `rule`.
    ///
    /// Entries starting with `!` go to the exclude set with the `!` stripped;
    /// every other entry goes to the include set.
    pub fn compile<S: AsRef<str>>(rule: &str, patterns: &[S]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_prefix(EXCLUDE_PREFIX) {
                Some(rest) => exclude.add(compile_glob(rule, rest)?),
                None => include.add(compile_glob(rule, pattern)?),
            };
        }

        Ok(Self {
            include: build_set(rule, include)?,
            exclude: build_set(rule, exclude)?,
        })
    }

    /// A path matches when some include glob accepts it and no exclude
    /// glob does.
    pub fn matches(&self, path: &str) -> bool {
        self.include.is_match(path) && !self.exclude.is_match(path)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.is_match(path)
    }

    pub fn include_count(&self) -> usize {
        self.include.len()
    }

    pub fn exclude_count(&self) -> usize {
        self.exclude.len()
    }
}

fn compile_glob(rule: &str, pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| DeriveError::GlobError {
            rule: rule.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

fn build_set(rule: &str, builder: GlobSetBuilder) -> Result<GlobSet> {
    builder.build().map_err(|source| DeriveError::GlobError {
        rule: rule.to_string(),
        pattern: String::new(),
        source,
    })
}
