pub mod decision;
pub mod dry_run;
pub mod policy;
pub mod verb;

pub use decision::{Decision, Verdict};
pub use dry_run::{DryRunMode, DryRunState};
pub use policy::{Classification, ProgramPolicy};
pub use verb::{FlagTable, VerbPath};

use std::collections::HashMap;

use crate::config::Config;
use crate::parse;

/// The gate: one [`ProgramPolicy`] per governed program, keyed by the
/// program name a command's first token must match exactly.
pub struct PolicyGate {
    programs: HashMap<String, ProgramPolicy>,
}

impl PolicyGate {
    /// Build the gate from configuration.
    pub fn from_config(config: &Config) -> Self {
        let programs = config
            .programs
            .iter()
            .map(|(name, program)| (name.clone(), ProgramPolicy::from_config(name, program)))
            .collect();
        Self { programs }
    }

    /// Evaluate a single (non-compound) command segment.
    ///
    /// A segment whose first token is not a governed program passes
    /// unconditionally; the gate only has an opinion about programs it
    /// governs.
    pub fn evaluate_single(&self, command: &str) -> Verdict {
        let words = parse::tokenize(command);
        let Some(first) = words.first() else {
            return Verdict {
                decision: Decision::Allow,
                reason: "empty".into(),
            };
        };
        match self.programs.get(first.as_str()) {
            Some(policy) => policy.evaluate(&words),
            None => Verdict {
                decision: Decision::Allow,
                reason: format!("not a governed program: {first}"),
            },
        }
    }

    /// Evaluate a full command string, splitting compound expressions and
    /// taking the worst decision across segments.
    pub fn evaluate(&self, command: &str) -> Verdict {
        let line = parse::split_compound_command(command);
        if line.segments.len() <= 1 {
            return self.evaluate_single(command);
        }

        let mut worst = Decision::Allow;
        let mut reasons = Vec::new();

        for segment in &line.segments {
            let result = self.evaluate_single(segment);
            let label: String = segment.trim().chars().take(60).collect();
            reasons.push(format!(
                "  [{label}] -> {}: {}",
                result.decision.label(),
                result.reason
            ));
            if result.decision > worst {
                worst = result.decision;
            }
        }

        let mut unique_ops: Vec<&str> = line.operators.iter().map(|o| o.as_str()).collect();
        unique_ops.sort();
        unique_ops.dedup();

        Verdict {
            decision: worst,
            reason: format!(
                "compound command ({}):\n{}",
                unique_ops.join(", "),
                reasons.join("\n")
            ),
        }
    }
}
