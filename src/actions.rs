//! GitHub Actions integration: workflow step outputs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("GITHUB_OUTPUT environment variable not set")]
    MissingPath,

    #[error("Failed to write workflow output: {0}")]
    Write(#[from] std::io::Error),
}

/// Append a `name=value` line to the CI-provided output file, the handoff
/// mechanism between workflow job steps. Failures are logged by callers and
/// never abort the run.
pub fn set_output(name: &str, value: &str) -> Result<(), OutputError> {
    let path = std::env::var("GITHUB_OUTPUT").map_err(|_| OutputError::MissingPath)?;
    append_output(Path::new(&path), name, value)
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<(), OutputError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{name}={value}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_output_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        append_output(&path, "can_fix", "true").unwrap();
        append_output(&path, "fix_type", "simple").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "can_fix=true\nfix_type=simple\n");
    }

    #[test]
    fn test_append_output_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh");
        append_output(&path, "issue_number", "42").unwrap();
        assert!(path.exists());
    }
}
