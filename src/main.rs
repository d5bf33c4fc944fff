//! gitops-gate: PreToolUse hook holding kubectl commands to a GitOps
//! workflow.
//!
//! Reads a hook request JSON from stdin and exits 0 (allow) or 2 (block).
//! On block, one diagnostic line goes to stderr. No other exit code is
//! ever produced; undecodable input follows the configured fail-open
//! policy.
//!
//! Also usable from a terminal:
//!   gitops-gate --explain <command>   print the verdict for a command
//!   gitops-gate --dump-config         print the merged config as TOML

use std::io::Read;
use std::process::ExitCode;

use gitops_gate::config::Config;
use gitops_gate::eval::{Decision, PolicyGate};
use gitops_gate::hook::{self, Screened};
use gitops_gate::logging;

fn main() -> ExitCode {
    let config = Config::load();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(|s| s.as_str()) {
        Some("--dump-config") => return dump_config(&config),
        Some("--explain") => return explain(&config, &args[1..]),
        _ => {}
    }

    logging::init(config.settings.decision_log);

    let mut input = String::new();
    let screened = match std::io::stdin().read_to_string(&mut input) {
        Ok(_) => hook::screen(&input),
        Err(e) => Screened::Undecodable(e.to_string()),
    };

    let (command, verdict) = match screened {
        Screened::Command(command) => {
            let gate = PolicyGate::from_config(&config);
            let verdict = gate.evaluate(&command);
            (command, verdict)
        }
        // Not a shell command: nothing to judge
        Screened::NotBash => return ExitCode::SUCCESS,
        Screened::Undecodable(err) => (
            "<undecodable>".to_string(),
            hook::undecodable_verdict(&err, config.settings.fail_open),
        ),
    };

    logging::log_decision(&command, &verdict);

    if verdict.decision == Decision::Block {
        eprintln!("gitops-gate: {}", verdict.reason.replace('\n', "; "));
    }
    ExitCode::from(verdict.decision.exit_code())
}

/// Evaluate a command given on the command line and print the verdict.
/// Exits with the same code the hook path would use, so it is scriptable.
fn explain(config: &Config, rest: &[String]) -> ExitCode {
    let command = rest.join(" ");
    if command.trim().is_empty() {
        eprintln!("usage: gitops-gate --explain <command>");
        return ExitCode::from(2);
    }
    let gate = PolicyGate::from_config(config);
    let verdict = gate.evaluate(&command);
    println!("{}: {}", verdict.decision.label(), verdict.reason);
    ExitCode::from(verdict.decision.exit_code())
}

/// Print the merged effective configuration as TOML.
fn dump_config(config: &Config) -> ExitCode {
    match toml::to_string_pretty(config) {
        Ok(rendered) => {
            print!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("gitops-gate: cannot render config: {e}");
            ExitCode::from(2)
        }
    }
}
