//! `.env.<environment>` loading
//!
//! Entries are collected into an explicit map that the orchestrator hands to
//! each subprocess. The process environment is left untouched.
//!
//! Values are literal: everything after the first `=` is kept as written.
//! There is no quote stripping and no `$VAR` expansion.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::error::BuildError;

/// Key/value pairs loaded from an environment file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    path: PathBuf,
    vars: BTreeMap<String, String>,
}

impl EnvConfig {
    /// Load an env file. A missing file is a `MissingConfig` error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BuildError::missing_config(path).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let vars = parse_env_lines(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse `KEY=value` lines. Blank lines and `#` comments are skipped.
fn parse_env_lines(content: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: expected KEY=value", index + 1);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("line {}: empty key", index + 1);
        }
        vars.insert(key.to_string(), value.trim().to_string());
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_key_value_lines() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env.uat");
        std::fs::write(
            &path,
            "APP_ID=com.redone.uat\nAPI_URL=https://uat.api.example.com\n\n# comment\nSOCKET_URL=wss://uat.ws.example.com\n",
        )
        .unwrap();

        let env = EnvConfig::load(&path).unwrap();
        assert_eq!(env.len(), 3);
        assert_eq!(env.get("APP_ID"), Some("com.redone.uat"));
        assert_eq!(env.get("API_URL"), Some("https://uat.api.example.com"));
        assert_eq!(env.get("SOCKET_URL"), Some("wss://uat.ws.example.com"));
        assert_eq!(env.path(), path.as_path());
    }

    #[test]
    fn test_load_does_not_touch_process_env() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env.dev");
        std::fs::write(&path, "REDONE_ENV_FILE_TEST_KEY=1\n").unwrap();

        let env = EnvConfig::load(&path).unwrap();
        assert_eq!(env.get("REDONE_ENV_FILE_TEST_KEY"), Some("1"));
        assert!(std::env::var("REDONE_ENV_FILE_TEST_KEY").is_err());
    }

    #[test]
    fn test_missing_file_is_missing_config() {
        let temp = tempfile::tempdir().unwrap();
        let err = EnvConfig::load(&temp.path().join(".env.prod")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_iter_is_sorted() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env.dev");
        std::fs::write(&path, "B=2\nA=1\n").unwrap();

        let env = EnvConfig::load(&path).unwrap();
        let keys: Vec<_> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn test_values_are_literal() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env.dev");
        std::fs::write(
            &path,
            "SECRET=ab$cd\nAPI_URL=https://x.example.com/$HOME/v1\nQUOTED=\"a b\"\nTOKEN=x=y\n",
        )
        .unwrap();

        let env = EnvConfig::load(&path).unwrap();
        assert_eq!(env.get("SECRET"), Some("ab$cd"));
        assert_eq!(env.get("API_URL"), Some("https://x.example.com/$HOME/v1"));
        assert_eq!(env.get("QUOTED"), Some("\"a b\""));
        assert_eq!(env.get("TOKEN"), Some("x=y"));
    }

    #[test]
    fn test_line_without_assignment_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".env.uat");
        std::fs::write(&path, "APP_ID=com.redone.uat\nnot an assignment\n").unwrap();

        let err = EnvConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
