//! Preprocessing pipeline
//!
//! Phases run strictly in order:
//! 1. dependency enrichment
//! 2. special countability
//! 3. feasibility classification
//! 4. special-case refinement
//!
//! then the cache gate, and finally forward-data generation for the rules
//! that cannot be inverted or counted symbolically.

use crate::analysis::{annotate_dependencies, apply_special_countability, DependencyOrigin};
use crate::cache::{self, Fingerprint, RunInputs};
use crate::classifier::classify_all;
use crate::config::Config;
use crate::executor::{ForwardExecutor, ForwardJob};
use crate::feasibility::{Feasibility, Invertibility, Special};
use crate::refiner::refine_special;
use crate::rule::ManglingRule;
use crate::{RuleInvError, RuleInvResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What forward-data generation does for one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardAction {
    /// Invertible and countable: fully handled symbolically
    Nothing,
    /// Invertible but not countable: only the output count is generated
    CountOnly,
    /// Not invertible: outputs and count are generated
    OutputsAndCount,
    /// Classification failed, the rule is left out of the run
    Skipped,
}

impl ForwardAction {
    pub fn for_feasibility(feasibility: Option<&Feasibility>) -> Self {
        match feasibility {
            None => ForwardAction::Skipped,
            Some(f) if !f.is_invertible() => ForwardAction::OutputsAndCount,
            Some(f) if f.is_countable() => ForwardAction::Nothing,
            Some(_) => ForwardAction::CountOnly,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ForwardAction::Nothing => "none",
            ForwardAction::CountOnly => "count",
            ForwardAction::OutputsAndCount => "outputs+count",
            ForwardAction::Skipped => "skipped",
        }
    }
}

/// Per-rule files of a preprocess directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePaths {
    pub outputs: Option<PathBuf>,
    pub count: PathBuf,
}

impl RulePaths {
    /// `count/rule<i>.txt` for count-only rules, `rule<i>.txt` plus
    /// `rule<i>.count` for full enumeration
    pub fn for_action(dir: &Path, index: usize, action: ForwardAction) -> Option<Self> {
        match action {
            ForwardAction::CountOnly => Some(Self {
                outputs: None,
                count: dir.join("count").join(format!("rule{}.txt", index)),
            }),
            ForwardAction::OutputsAndCount => Some(Self {
                outputs: Some(dir.join(format!("rule{}.txt", index))),
                count: dir.join(format!("rule{}.count", index)),
            }),
            ForwardAction::Nothing | ForwardAction::Skipped => None,
        }
    }
}

/// Classification result of one rule, as reported to users
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub index: usize,
    pub raw: String,
    pub normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invertibility: Option<Invertibility>,
    pub countable: bool,
    pub special: Special,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_idx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<DependencyOrigin>,
    pub action: ForwardAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_count: Option<u64>,
}

impl RuleSummary {
    pub fn from_rule(rule: &ManglingRule) -> Self {
        let feasibility = rule.feasibility.as_ref();
        Self {
            index: rule.index,
            raw: rule.raw.clone(),
            normalized: rule.normalized(),
            invertibility: feasibility.map(Feasibility::invertibility),
            countable: feasibility.is_some_and(Feasibility::is_countable),
            special: feasibility.map(Feasibility::special).unwrap_or_default(),
            special_idx: feasibility.and_then(Feasibility::special_idx),
            dependency: rule.dependency.as_ref().map(|d| d.origin.clone()),
            action: ForwardAction::for_feasibility(feasibility),
            forward_count: None,
        }
    }
}

/// A per-rule error collected during a run
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
    pub message: String,
}

impl From<&RuleInvError> for RuleFailure {
    fn from(error: &RuleInvError) -> Self {
        Self {
            rule_index: error.rule_index(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a preprocessing run
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessReport {
    pub rules: Vec<RuleSummary>,
    pub failures: Vec<RuleFailure>,
    pub fingerprint: String,
    /// The stored fingerprint matched and forward generation was skipped
    pub cache_hit: bool,
    /// Executor calls made (zero on a cache hit)
    pub forward_jobs: usize,
}

impl PreprocessReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count_action(&self, action: ForwardAction) -> usize {
        self.rules.iter().filter(|r| r.action == action).count()
    }
}

/// Runs the preprocessing phases over a rule list
pub struct Preprocessor<'c> {
    config: &'c Config,
}

impl<'c> Preprocessor<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Phases 1 to 4: annotate every rule with dependency and feasibility
    ///
    /// Rules whose classification fails keep an empty feasibility slot and
    /// contribute one error to the returned list. Only a broken feasibility
    /// invariant aborts.
    pub fn prepare(&self, rules: &mut [ManglingRule]) -> RuleInvResult<Vec<RuleInvError>> {
        let started = Instant::now();
        annotate_dependencies(rules);
        self.phase_done("dependency enrichment", started);

        let started = Instant::now();
        apply_special_countability(rules);
        self.phase_done("special countability", started);

        let started = Instant::now();
        let errors = classify_all(rules, self.config.enable_regex);
        for error in &errors {
            warn!(%error, "rule not classified");
        }
        self.phase_done("feasibility", started);

        let started = Instant::now();
        refine_special(rules)?;
        for rule in rules.iter() {
            if let Some(feasibility) = &rule.feasibility {
                feasibility.check_invariants(rule.len())?;
            }
        }
        self.phase_done("special invertibility", started);

        Ok(errors)
    }

    /// The full pipeline: phases 1 to 4, the cache gate, then forward-data
    /// generation through `executor`
    ///
    /// Executor failures are collected per rule unless `strict` is set, in
    /// which case the first one aborts the run. The fingerprint is stored
    /// only when every forward job succeeded.
    pub fn run<E: ForwardExecutor + ?Sized>(
        &self,
        rules: &mut [ManglingRule],
        executor: &E,
    ) -> RuleInvResult<PreprocessReport> {
        self.config.validate_for_preprocess()?;
        let run_started = Instant::now();

        let classification_errors = self.prepare(rules)?;
        let mut failures: Vec<RuleFailure> =
            classification_errors.iter().map(RuleFailure::from).collect();
        let mut summaries: Vec<RuleSummary> = rules.iter().map(RuleSummary::from_rule).collect();

        let dir = self.config.preprocess_path.as_path();
        let wordlist = self.config.wordlist_path.name.as_path();
        let fingerprint =
            Fingerprint::compute(wordlist, &RunInputs::from_config(self.config, rules))?;

        if cache::is_fresh(dir, &fingerprint)? {
            info!(%fingerprint, "preprocess cache is up to date, skipping forward generation");
            return Ok(PreprocessReport {
                rules: summaries,
                failures,
                fingerprint: fingerprint.to_hex(),
                cache_hit: true,
                forward_jobs: 0,
            });
        }
        // Drop the old fingerprint first so an interrupted run is never
        // mistaken for a complete one.
        cache::invalidate(dir)?;

        let started = Instant::now();
        let mut forward_jobs = 0;
        let mut executor_failed = false;
        for (rule, summary) in rules.iter().zip(summaries.iter_mut()) {
            let Some(paths) = RulePaths::for_action(dir, rule.index, summary.action) else {
                continue;
            };
            let job = ForwardJob {
                rule_index: rule.index,
                rule: &rule.raw,
                wordlist,
                prefix: self.config.wordlist_path.prefix.as_deref(),
            };
            forward_jobs += 1;
            let result = match &paths.outputs {
                Some(outputs) => executor.outputs_and_count(&job, outputs, &paths.count),
                None => executor.count_only(&job, &paths.count),
            };
            match result {
                Ok(count) => {
                    debug!(
                        rule = rule.index,
                        action = summary.action.name(),
                        count,
                        "forward data generated"
                    );
                    summary.forward_count = Some(count);
                }
                Err(error) if self.config.strict => return Err(error),
                Err(error) => {
                    warn!(%error, "forward execution failed");
                    executor_failed = true;
                    failures.push(RuleFailure::from(&error));
                }
            }
        }
        self.phase_done("forward-data generation", started);

        if executor_failed {
            warn!("forward generation incomplete, cache fingerprint not written");
        } else {
            cache::store(dir, &fingerprint)?;
        }

        if self.config.debug {
            info!(
                rules = rules.len(),
                forward_jobs,
                failures = failures.len(),
                elapsed_ms = run_started.elapsed().as_millis() as u64,
                "preprocessing finished"
            );
        }

        Ok(PreprocessReport {
            rules: summaries,
            failures,
            fingerprint: fingerprint.to_hex(),
            cache_hit: false,
            forward_jobs,
        })
    }

    fn phase_done(&self, phase: &str, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if self.config.debug {
            info!(phase, elapsed_ms, "phase finished");
        } else {
            debug!(phase, elapsed_ms, "phase finished");
        }
    }
}
