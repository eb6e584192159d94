//! Content fingerprint gating forward-data generation
//!
//! The fingerprint covers the wordlist bytes, the executor prefix, the
//! regex flag, the cracking engine command line and the normalized rule
//! list. A stored fingerprint equal to the current one means every per-rule
//! file under the preprocess directory is still valid.

use crate::config::{Config, ExecutorConfig};
use crate::rule::{normalized_rule_list, ManglingRule};
use crate::{RuleInvError, RuleInvResult};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the stored fingerprint inside the preprocess directory
pub const HASH_FILE: &str = "hash";

const DOMAIN: &str = "ruleinv preprocess v1";

/// Everything besides the wordlist bytes that shapes the forward data
#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub prefix: &'a [u8],
    pub enable_regex: bool,
    pub executor: &'a ExecutorConfig,
    pub rules: &'a [ManglingRule],
}

impl<'a> RunInputs<'a> {
    pub fn from_config(config: &'a Config, rules: &'a [ManglingRule]) -> Self {
        Self {
            prefix: config.prefix_bytes(),
            enable_regex: config.enable_regex,
            executor: &config.executor,
            rules,
        }
    }
}

/// blake3 digest of a run's inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Hash the wordlist file together with the run's other inputs
    pub fn compute(wordlist: &Path, inputs: &RunInputs<'_>) -> RuleInvResult<Self> {
        let mut file = File::open(wordlist).map_err(|e| RuleInvError::io(wordlist, e))?;
        Self::from_reader(&mut file, inputs).map_err(|e| RuleInvError::io(wordlist, e))
    }

    /// Same as [`Fingerprint::compute`] with the wordlist given as a reader
    pub fn from_reader<R: Read>(wordlist: &mut R, inputs: &RunInputs<'_>) -> io::Result<Self> {
        let mut hasher = blake3::Hasher::new_derive_key(DOMAIN);
        let wordlist_len = io::copy(wordlist, &mut hasher)?;
        // Length-prefix each section so the boundaries are unambiguous.
        hasher.update(&wordlist_len.to_le_bytes());
        update_section(&mut hasher, inputs.prefix);
        hasher.update(&[inputs.enable_regex as u8]);
        update_section(&mut hasher, inputs.executor.program.as_bytes());
        hasher.update(&(inputs.executor.args.len() as u64).to_le_bytes());
        for arg in &inputs.executor.args {
            update_section(&mut hasher, arg.as_bytes());
        }
        update_section(&mut hasher, normalized_rule_list(inputs.rules).as_bytes());
        Ok(Self(hasher.finalize()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// Parse the 64-digit hex form, surrounding whitespace allowed
    pub fn from_hex(text: &str) -> Option<Self> {
        blake3::Hash::from_hex(text.trim()).ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

fn update_section(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Location of the stored fingerprint for a preprocess directory
pub fn hash_path(preprocess_dir: &Path) -> PathBuf {
    preprocess_dir.join(HASH_FILE)
}

/// Read the stored fingerprint
///
/// `Ok(None)` when no hash file exists; `CacheCorruption` when one exists
/// but does not hold a fingerprint.
pub fn load_stored(preprocess_dir: &Path) -> RuleInvResult<Option<Fingerprint>> {
    let path = hash_path(preprocess_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(RuleInvError::CacheCorruption(format!(
                "{} is not valid UTF-8",
                path.display()
            )))
        }
        Err(e) => return Err(RuleInvError::io(path, e)),
    };
    Fingerprint::from_hex(&text).map(Some).ok_or_else(|| {
        RuleInvError::CacheCorruption(format!(
            "{} does not contain a 64-digit hex fingerprint",
            path.display()
        ))
    })
}

/// Whether the stored fingerprint matches `current`
///
/// A corrupt hash file is logged and counts as a miss.
pub fn is_fresh(preprocess_dir: &Path, current: &Fingerprint) -> RuleInvResult<bool> {
    match load_stored(preprocess_dir) {
        Ok(stored) => Ok(stored.as_ref() == Some(current)),
        Err(RuleInvError::CacheCorruption(message)) => {
            warn!(%message, "ignoring corrupt cache fingerprint");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Write the fingerprint, creating the directory if needed
pub fn store(preprocess_dir: &Path, fingerprint: &Fingerprint) -> RuleInvResult<()> {
    fs::create_dir_all(preprocess_dir).map_err(|e| RuleInvError::io(preprocess_dir, e))?;
    let path = hash_path(preprocess_dir);
    fs::write(&path, format!("{}\n", fingerprint)).map_err(|e| RuleInvError::io(path, e))
}

/// Remove a stored fingerprint so the next run regenerates everything
pub fn invalidate(preprocess_dir: &Path) -> RuleInvResult<()> {
    let path = hash_path(preprocess_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RuleInvError::io(path, e)),
    }
}
