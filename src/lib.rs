//! gitops-gate: a PreToolUse hook that holds kubectl to a GitOps workflow.
//!
//! The gate reads a hook request from stdin, parses the Bash command it
//! carries, and decides whether that command may run. Read-only verbs of a
//! governed program pass; anything that would mutate cluster state is
//! blocked unless it carries an effective `--dry-run=client|server`.
//! Compound commands (`&&`, `;`, pipes, `&`, newlines) are split and each
//! segment judged on its own, worst decision wins. Verbs the rule tables
//! do not list block by default: an unrecognized verb cannot be proven
//! safe.
//!
//! The process contract is two exit codes: 0 allows the command, 2 blocks
//! it with a one-line diagnostic on stderr.
//!
//! # Architecture
//!
//! - **[`parse`]** — compound-command splitting and shlex tokenization.
//! - **[`eval`]** — verb resolution, rule tables, dry-run override, decision.
//! - **[`hook`]** — decoding the PreToolUse request from stdin.
//! - **[`config`]** — embedded defaults + user overlay merge.
//! - **[`logging`]** — opt-in decision log under `~/.local/share/gitops-gate`.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Evaluation engine: gate registry, verb resolution, rule tables, decision.
pub mod eval;
/// Hook request decoding.
pub mod hook;
/// Opt-in file-based decision logging.
pub mod logging;
/// Shell command splitting and tokenization.
pub mod parse;

use eval::Verdict;

/// Build the gate from default config and evaluate a command string.
///
/// This is the main entry point for tests and simple usage. The hook
/// binary builds the gate from [`config::Config::load`] so user overlays
/// apply.
pub fn evaluate(command: &str) -> Verdict {
    let config = config::Config::default_config();
    let gate = eval::PolicyGate::from_config(&config);
    gate.evaluate(command)
}
