// src/engine/core.rs

//! Pure dirty-set computation.
//!
//! No Tokio, no processes: given the rule list and a coalesced batch of
//! changed paths, decide which rules must run.

use crate::config::Rule;

/// Rules whose patterns are satisfied by at least one changed path, in
/// declaration order.
#[derive(Debug, Default)]
pub struct DirtySet<'r> {
    rules: Vec<&'r Rule>,
}

impl<'r> DirtySet<'r> {
    /// Compute the dirty set for `files`.
    ///
    /// Delegate rules are skipped outright, even if they declare patterns.
    pub fn compute<S: AsRef<str>>(rules: &'r [Rule], files: &[S]) -> Self {
        let rules = rules
            .iter()
            .filter(|rule| rule.is_reactive())
            .filter(|rule| files.iter().any(|file| rule.matches(file.as_ref())))
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'r Rule> + '_ {
        self.rules.iter().copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name().to_string()).collect()
    }
}
