#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

pub use derive_test_utils::builders::{ConfigFileBuilder, RuleBuilder};
pub use derive_test_utils::{init_tracing, with_timeout};

/// Write `yaml` to a temporary rule file.
pub fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{yaml}").unwrap();
    file.flush().unwrap();
    file
}

/// Shell-quote a path for use inside a `sh -c` command.
pub fn quoted(path: &Path) -> String {
    format!("'{}'", path.display())
}
