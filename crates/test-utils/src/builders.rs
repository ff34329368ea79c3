#![allow(dead_code)]

use derive::config::{ConfigFile, RawConfigFile, RawRule};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    rules: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: RawRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.rules
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.rules).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawRule`.
pub struct RuleBuilder {
    rule: RawRule,
}

impl RuleBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            rule: RawRule {
                name: name.to_string(),
                ..RawRule::default()
            },
        }
    }

    pub fn matches(mut self, pattern: &str) -> Self {
        self.rule.patterns.push(pattern.to_string());
        self
    }

    pub fn run(mut self, cmd: &str) -> Self {
        self.rule.run.push(cmd.to_string());
        self
    }

    pub fn delegate(mut self, cmd: &str) -> Self {
        self.rule.delegate.push(cmd.to_string());
        self
    }

    pub fn build(self) -> RawRule {
        self.rule
    }
}
