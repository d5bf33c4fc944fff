use std::fs::OpenOptions;
use std::path::Path;

use log::LevelFilter;
use simplelog::WriteLogger;

use crate::eval::Verdict;

/// Install the decision logger when `settings.decision_log` is enabled.
///
/// Appends to ~/.local/share/gitops-gate/decisions.log through the `log`
/// facade. Best-effort: any failure leaves logging uninstalled and the
/// gate runs without it. Never touches stdout or stderr.
pub fn init(enabled: bool) {
    if !enabled {
        return;
    }
    let Some(home) = std::env::var_os("HOME") else {
        return;
    };
    let dir = Path::new(&home).join(".local/share/gitops-gate");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("decisions.log"))
    else {
        return;
    };
    let _ = WriteLogger::init(LevelFilter::Info, simplelog::Config::default(), file);
}

/// Record one decision line. A no-op unless [`init`] installed the logger.
pub fn log_decision(command: &str, verdict: &Verdict) {
    // Compact multi-line compound reasons to a single record
    let reason = verdict.reason.replace('\n', "; ");
    let cmd: String = command.chars().take(200).collect();
    log::info!("{} {cmd} ({reason})", verdict.decision.as_str());
}
