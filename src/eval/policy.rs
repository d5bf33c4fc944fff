//! Per-program policy: rule tables, classification, and the final
//! allow/block call for one invocation.

use std::collections::HashSet;

use crate::config::ProgramConfig;
use crate::eval::dry_run::{self, DryRunState};
use crate::eval::verb::{self, FlagTable, VerbPath};
use crate::eval::{Decision, Verdict};

/// What the rule tables say about a resolved verb path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    ReadOnly,
    Mutating,
    /// Not in either table. An unrecognized verb cannot be proven safe,
    /// so it blocks like a mutation.
    Unknown,
}

/// The compiled rule bundle for one governed program.
///
/// Two-word table entries are stored space-joined ("rollout status");
/// their first words form the prefix-verb set that makes the resolver
/// read a second verb token.
pub struct ProgramPolicy {
    name: String,
    read_only: HashSet<String>,
    mutating: HashSet<String>,
    prefix_verbs: HashSet<String>,
    flags: FlagTable,
    dry_run_flag: String,
    remediation: String,
    bootstrap_patterns: Vec<String>,
    bootstrap_remediation: String,
}

impl ProgramPolicy {
    pub fn from_config(name: &str, config: &ProgramConfig) -> Self {
        let read_only: HashSet<String> = config.read_only.iter().cloned().collect();
        let mutating: HashSet<String> = config.mutating.iter().cloned().collect();

        let mut prefix_verbs = HashSet::new();
        for entry in read_only.iter().chain(mutating.iter()) {
            if let Some((first, _)) = entry.split_once(' ') {
                prefix_verbs.insert(first.to_string());
            }
        }

        Self {
            name: name.to_string(),
            read_only,
            mutating,
            prefix_verbs,
            flags: FlagTable::new(&config.value_flags, &config.boolean_flags),
            dry_run_flag: config.dry_run_flag.clone(),
            remediation: config.remediation.clone(),
            bootstrap_patterns: config.bootstrap_patterns.clone(),
            bootstrap_remediation: config.bootstrap_remediation.clone(),
        }
    }

    /// Find the verb path of a tokenized invocation of this program.
    pub fn resolve(&self, words: &[String]) -> Option<VerbPath> {
        verb::resolve(words, &self.flags, &self.prefix_verbs)
    }

    /// Look up a verb path in the rule tables: exact two-token entry
    /// first, then the single-token entry for its first word.
    pub fn classify(&self, verb: Option<&VerbPath>) -> Classification {
        let Some(verb) = verb else {
            return Classification::Unknown;
        };
        if verb.second.is_some() {
            let key = verb.to_string();
            if self.read_only.contains(&key) {
                return Classification::ReadOnly;
            }
            if self.mutating.contains(&key) {
                return Classification::Mutating;
            }
        }
        if self.read_only.contains(&verb.first) {
            return Classification::ReadOnly;
        }
        if self.mutating.contains(&verb.first) {
            return Classification::Mutating;
        }
        Classification::Unknown
    }

    /// Whether any token places the invocation inside the GitOps engine's
    /// own scope (its namespaces, its CRDs, paths to its manifests). Such
    /// blocks report the bootstrap remediation: the engine cannot sync
    /// itself.
    fn bootstrap_scoped(&self, words: &[String]) -> bool {
        words.iter().skip(1).any(|w| {
            self.bootstrap_patterns
                .iter()
                .any(|p| !p.is_empty() && w.contains(p.as_str()))
        })
    }

    /// Full pipeline for one invocation: resolve, classify, check the
    /// dry-run override, decide.
    pub fn evaluate(&self, words: &[String]) -> Verdict {
        let verb = self.resolve(words);
        let classification = self.classify(verb.as_ref());
        let state = dry_run::detect(words, &self.dry_run_flag);
        let bootstrap = self.bootstrap_scoped(words);
        self.decide(verb.as_ref(), classification, state, bootstrap)
    }

    fn decide(
        &self,
        verb: Option<&VerbPath>,
        classification: Classification,
        dry_run: DryRunState,
        bootstrap: bool,
    ) -> Verdict {
        let verb_text = verb.map(|v| v.to_string()).unwrap_or_else(|| "?".into());

        if classification == Classification::ReadOnly {
            return Verdict {
                decision: Decision::Allow,
                reason: format!("read-only {} {verb_text}", self.name),
            };
        }

        // Mutating and Unknown alike pass when the command only simulates
        if let Some(mode) = dry_run.override_mode() {
            return Verdict {
                decision: Decision::Allow,
                reason: format!(
                    "{} {verb_text} with {}={}",
                    self.name,
                    self.dry_run_flag,
                    mode.as_str()
                ),
            };
        }

        let remediation = if bootstrap && !self.bootstrap_remediation.is_empty() {
            &self.bootstrap_remediation
        } else {
            &self.remediation
        };

        match classification {
            Classification::Mutating => Verdict {
                decision: Decision::Block,
                reason: format!("mutating {} {verb_text}; {remediation}", self.name),
            },
            _ => {
                let detail = match verb {
                    Some(v) => format!("ungoverned {} verb {v}", self.name),
                    None => format!("no {} verb found", self.name),
                };
                Verdict {
                    decision: Decision::Block,
                    reason: format!("{detail}, treated as unsafe by default; {remediation}"),
                }
            }
        }
    }
}
