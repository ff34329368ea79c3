// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, RawRule, Rule};
use crate::errors::{DeriveError, Result};
use crate::watch::patterns::{RuleMatcher, EXCLUDE_PREFIX};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DeriveError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let rules = raw
            .into_iter()
            .map(|rule| {
                let matcher = RuleMatcher::compile(&rule.name, &rule.patterns)?;
                Ok(Rule::new_unchecked(rule, matcher))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigFile::new_unchecked(rules))
    }
}

/// Check every rule before anything is compiled or executed.
pub fn validate_config(rules: &[RawRule]) -> Result<()> {
    for (index, rule) in rules.iter().enumerate() {
        validate_rule(index, rule)?;
    }
    Ok(())
}

fn validate_rule(index: usize, rule: &RawRule) -> Result<()> {
    if rule.name.trim().is_empty() {
        return Err(DeriveError::ConfigError(format!(
            "rule #{} is missing a name",
            index + 1
        )));
    }

    if rule.patterns.is_empty() && rule.delegate.is_empty() {
        return Err(DeriveError::ConfigError(format!(
            "rule '{}' has neither `match` patterns nor `delegate` commands",
            rule.name
        )));
    }

    if rule.run.is_empty() {
        return Err(DeriveError::ConfigError(format!(
            "rule '{}' is missing `run` commands",
            rule.name
        )));
    }

    for pattern in &rule.patterns {
        let body = pattern.strip_prefix(EXCLUDE_PREFIX).unwrap_or(pattern);
        if body.is_empty() {
            return Err(DeriveError::ConfigError(format!(
                "rule '{}' has an empty `match` pattern",
                rule.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, patterns: &[&str], run: &[&str], delegate: &[&str]) -> RawRule {
        RawRule {
            name: name.to_string(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            run: run.iter().map(|s| s.to_string()).collect(),
            delegate: delegate.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn accepts_reactive_and_delegate_rules() {
        let raw = vec![
            rule("build", &["*.go"], &["go build"], &[]),
            rule("server", &[], &["go build -o server"], &["./server"]),
        ];
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert_eq!(cfg.len(), 2);
        assert!(cfg.rule("build").unwrap().is_reactive());
        assert!(cfg.rule("server").unwrap().is_delegate());
    }

    #[test]
    fn rejects_blank_name() {
        let err = validate_config(&[rule("  ", &["*.go"], &["true"], &[])]).unwrap_err();
        assert!(err.to_string().contains("missing a name"));
    }

    #[test]
    fn rejects_bare_exclusion_marker() {
        let err = validate_config(&[rule("a", &["!"], &["true"], &[])]).unwrap_err();
        assert!(err.to_string().contains("empty `match` pattern"));
    }

    #[test]
    fn empty_rule_list_is_valid() {
        let cfg = ConfigFile::try_from(Vec::new()).unwrap();
        assert!(cfg.is_empty());
    }
}
