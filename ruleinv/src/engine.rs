use crate::executor::{ForwardExecutor, ProcessExecutor};
use crate::parser::parse_rules_lenient_from;
use crate::pipeline::{PreprocessReport, Preprocessor, RuleSummary};
use crate::rule::ManglingRule;
use crate::trie::{FrozenTrie, TrieBuilder};
use crate::{Config, RuleInvError, RuleInvResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// The rule analysis engine
///
/// Collects rules from one or more sources into a single indexed list and
/// runs classification and preprocessing over it.
#[derive(Default)]
pub struct Engine {
    config: Config,
    rules: Vec<ManglingRule>,
    sources: HashMap<String, String>,
    next_index: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Add every rule of `content`, or none if a line fails to parse
    ///
    /// Returns the number of rules added. Indices continue from the rules
    /// already loaded.
    pub fn add_rules(&mut self, content: &str, source: &str) -> RuleInvResult<usize> {
        let (rules, mut errors) = parse_rules_lenient_from(content, source, self.next_index);
        match errors.len() {
            0 => {}
            1 => return Err(errors.remove(0)),
            _ => return Err(RuleInvError::MultipleErrors(errors)),
        }
        Ok(self.accept(rules, 0, content, source))
    }

    /// Add the valid rules of `content` and return the parse errors
    ///
    /// A failed line still consumes an index, so later rules keep their
    /// positions.
    pub fn add_rules_lenient(&mut self, content: &str, source: &str) -> Vec<RuleInvError> {
        let (rules, errors) = parse_rules_lenient_from(content, source, self.next_index);
        self.accept(rules, errors.len(), content, source);
        errors
    }

    /// Read a rule file and add its rules strictly
    pub fn add_rule_file(&mut self, path: &Path) -> RuleInvResult<usize> {
        let bytes = fs::read(path).map_err(|e| RuleInvError::io(path, e))?;
        let content = String::from_utf8_lossy(&bytes);
        self.add_rules(&content, &path.to_string_lossy())
    }

    fn accept(
        &mut self,
        rules: Vec<ManglingRule>,
        failed: usize,
        content: &str,
        source: &str,
    ) -> usize {
        let added = rules.len();
        self.next_index += added + failed;
        self.rules.extend(rules);
        self.sources.insert(source.to_string(), content.to_string());
        added
    }

    pub fn rules(&self) -> &[ManglingRule] {
        &self.rules
    }

    pub fn get_rule(&self, index: usize) -> Option<&ManglingRule> {
        self.rules.iter().find(|r| r.index == index)
    }

    pub fn get_source(&self, source: &str) -> Option<&str> {
        self.sources.get(source).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.sources.clear();
        self.next_index = 0;
    }

    /// Annotate the loaded rules with dependency and feasibility
    ///
    /// Returns the per-rule classification errors; the other rules are
    /// classified regardless.
    pub fn classify(&mut self) -> RuleInvResult<Vec<RuleInvError>> {
        Preprocessor::new(&self.config).prepare(&mut self.rules)
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules.iter().map(RuleSummary::from_rule).collect()
    }

    /// Run the full pipeline with a caller-supplied executor
    pub fn preprocess_with<E: ForwardExecutor + ?Sized>(
        &mut self,
        executor: &E,
    ) -> RuleInvResult<PreprocessReport> {
        Preprocessor::new(&self.config).run(&mut self.rules, executor)
    }

    /// Run the full pipeline with the configured cracking engine
    pub fn preprocess(&mut self) -> RuleInvResult<PreprocessReport> {
        let executor = ProcessExecutor::new(self.config.executor.clone());
        self.preprocess_with(&executor)
    }

    /// Build and freeze a trie over the configured wordlist
    pub fn build_trie(&self) -> RuleInvResult<FrozenTrie> {
        let path = self.config.wordlist_path.name.as_path();
        if path.as_os_str().is_empty() {
            return Err(RuleInvError::Config(
                "wordlist_path.name must be set to build a trie".to_string(),
            ));
        }
        Ok(TrieBuilder::from_wordlist(path)?.into_frozen())
    }
}
