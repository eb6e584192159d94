use crate::{RuleInvError, RuleInvResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration for classification and preprocessing
///
/// Passed explicitly to the engine and the orchestrator. Every field has a
/// default so a JSON config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emit per-phase progress and timing at info level
    pub debug: bool,

    pub wordlist_path: WordlistPath,

    /// Directory holding forward-enumeration outputs and the cache fingerprint
    pub preprocess_path: PathBuf,

    /// Recognize class-based primitives (`s?vX`, `@?d`, ...) during classification
    pub enable_regex: bool,

    /// Abort the run on the first executor failure instead of collecting it
    pub strict: bool,

    pub executor: ExecutorConfig,
}

/// Wordlist location plus the prefix the forward executor prepends to each word
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WordlistPath {
    pub name: PathBuf,
    pub prefix: Option<String>,
}

/// External cracking engine used for forward enumeration
///
/// `args` may contain `{rule_file}` (path of a file holding the rule) and
/// `{rule}` (raw rule text); both are substituted per job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            program: "hashcat".to_string(),
            args: vec![
                "--stdout".to_string(),
                "-r".to_string(),
                "{rule_file}".to_string(),
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            wordlist_path: WordlistPath::default(),
            preprocess_path: PathBuf::from("preprocess"),
            enable_regex: false,
            strict: false,
            executor: ExecutorConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> RuleInvResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| RuleInvError::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> RuleInvResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| RuleInvError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Wordlist prefix as bytes, empty when unset
    pub fn prefix_bytes(&self) -> &[u8] {
        self.wordlist_path
            .prefix
            .as_deref()
            .map(str::as_bytes)
            .unwrap_or_default()
    }

    /// Check the fields the preprocessing pipeline depends on
    pub fn validate_for_preprocess(&self) -> RuleInvResult<()> {
        if self.wordlist_path.name.as_os_str().is_empty() {
            return Err(RuleInvError::Config(
                "wordlist_path.name must be set for preprocessing".to_string(),
            ));
        }
        if self.preprocess_path.as_os_str().is_empty() {
            return Err(RuleInvError::Config(
                "preprocess_path must not be empty".to_string(),
            ));
        }
        if self.executor.program.trim().is_empty() {
            return Err(RuleInvError::Config(
                "executor.program must name a cracking engine".to_string(),
            ));
        }
        Ok(())
    }
}
