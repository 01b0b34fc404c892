//! `.env` File Store
//!
//! Reads and updates the local `KEY=value` configuration file. The
//! validator never touches this directly; callers build an [`EnvSnapshot`]
//! once and pass it in.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::EnvSnapshot;

/// A `.env` file on disk
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Parse the file into key/value pairs. A missing file reads as empty.
    pub fn read(&self) -> Result<EnvSnapshot> {
        if !self.exists() {
            debug!(path = %self.path.display(), "No .env file, using process environment only");
            return Ok(EnvSnapshot::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        Ok(parse(&contents))
    }

    /// Process environment overlaid with the file's values (file wins)
    pub fn snapshot(&self) -> Result<EnvSnapshot> {
        self.snapshot_over(std::env::vars())
    }

    /// Overlay the file onto an explicit base environment
    pub fn snapshot_over(
        &self,
        base: impl IntoIterator<Item = (String, String)>,
    ) -> Result<EnvSnapshot> {
        let mut snapshot: EnvSnapshot = base.into_iter().collect();
        let from_file = self.read()?;
        debug!(
            path = %self.path.display(),
            keys = from_file.len(),
            "Loaded .env file"
        );
        snapshot.extend(from_file);
        Ok(snapshot)
    }

    /// Set `key` to `value`, replacing the first matching line or appending
    pub fn update(&self, key: &str, value: &str) -> Result<()> {
        let contents = if self.exists() {
            fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read {}", self.path.display()))?
        } else {
            String::new()
        };

        let mut lines: Vec<String> = contents.lines().map(String::from).collect();
        let replacement = format!("{}={}", key, value);

        match lines
            .iter()
            .position(|line| parse_line(line).is_some_and(|(k, _)| k == key))
        {
            Some(index) => lines[index] = replacement,
            None => lines.push(replacement),
        }

        let mut output = lines.join("\n");
        output.push('\n');

        fs::write(&self.path, output)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        info!(key = %key, path = %self.path.display(), "Updated .env entry");
        Ok(())
    }
}

/// Parse `.env` text; later duplicates overwrite earlier ones
pub fn parse(contents: &str) -> EnvSnapshot {
    contents
        .lines()
        .filter_map(parse_line)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, unquote(value.trim())))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let env = parse(
            "# GCP settings\n\nGCP_PROJECT_ID=soc-prod\n  # indented comment\nexport GCP_LOCATION=us-central1\n",
        );
        assert_eq!(env.len(), 2);
        assert_eq!(env["GCP_PROJECT_ID"], "soc-prod");
        assert_eq!(env["GCP_LOCATION"], "us-central1");
    }

    #[test]
    fn test_parse_quotes_and_equals_in_value() {
        let env = parse("SOAR_URL=\"https://acme.example:443\"\nTOKEN='a=b=c'\nEMPTY=\n");
        assert_eq!(env["SOAR_URL"], "https://acme.example:443");
        assert_eq!(env["TOKEN"], "a=b=c");
        assert_eq!(env["EMPTY"], "");
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = EnvFile::new(dir.path().join(".env"));
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "GCP_PROJECT_ID=from-file\n").unwrap();

        let base = vec![
            ("GCP_PROJECT_ID".to_string(), "from-process".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let snapshot = EnvFile::new(&path).snapshot_over(base).unwrap();

        assert_eq!(snapshot["GCP_PROJECT_ID"], "from-file");
        assert_eq!(snapshot["HOME"], "/root");
    }

    #[test]
    fn test_update_replaces_first_match_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# AGENTSPACE_AGENT_ID=commented\nAGENTSPACE_AGENT_ID=old\nOTHER=1\nAGENTSPACE_AGENT_ID=dup\n",
        )
        .unwrap();

        EnvFile::new(&path).update("AGENTSPACE_AGENT_ID", "agent-42").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "# AGENTSPACE_AGENT_ID=commented\nAGENTSPACE_AGENT_ID=agent-42\nOTHER=1\nAGENTSPACE_AGENT_ID=dup\n"
        );
    }

    #[test]
    fn test_update_appends_and_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let file = EnvFile::new(&path);

        file.update("OAUTH_AUTH_ID", "auth-1a2b3c4d").unwrap();
        file.update("GCP_LOCATION", "us-central1").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "OAUTH_AUTH_ID=auth-1a2b3c4d\nGCP_LOCATION=us-central1\n"
        );
        assert_eq!(file.read().unwrap()["OAUTH_AUTH_ID"], "auth-1a2b3c4d");
    }
}
