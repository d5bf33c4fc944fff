//! Dry-run detection: a mutating verb is permitted when the invocation
//! carries an effective `--dry-run=client|server`.

/// Value carried by the dry-run flag. `none` is the tool's own spelling
/// for "dry run disabled"; unrecognized values are folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunMode {
    Client,
    Server,
    None,
}

impl DryRunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DryRunMode::Client => "client",
            DryRunMode::Server => "server",
            DryRunMode::None => "none",
        }
    }

    fn from_value(raw: &str) -> Self {
        match raw {
            "client" => DryRunMode::Client,
            "server" => DryRunMode::Server,
            _ => DryRunMode::None,
        }
    }
}

/// Outcome of scanning an invocation for its dry-run flag.
/// `mode: None` means the flag was absent altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DryRunState {
    pub mode: Option<DryRunMode>,
}

impl DryRunState {
    /// The mode in force when it downgrades a mutation to a simulation.
    pub fn override_mode(&self) -> Option<DryRunMode> {
        match self.mode {
            Some(m @ (DryRunMode::Client | DryRunMode::Server)) => Some(m),
            _ => None,
        }
    }
}

/// Scan a tokenized invocation for `flag`, in both the `--dry-run=mode`
/// and the two-token `--dry-run mode` forms.
///
/// The last occurrence wins, matching how the governed tools parse
/// repeated flags. A value token never attaches across another flag.
/// The scan stops at a bare `--`: tokens after the end-of-flags marker
/// belong to a wrapped command, not to this invocation.
pub fn detect(words: &[String], flag: &str) -> DryRunState {
    let mut state = DryRunState::default();
    if flag.is_empty() || words.is_empty() {
        return state;
    }
    let prefix = format!("{flag}=");

    let mut i = 1;
    while i < words.len() {
        let w = words[i].as_str();
        if w == "--" {
            break;
        }
        if let Some(value) = w.strip_prefix(&prefix) {
            state.mode = Some(DryRunMode::from_value(value));
            i += 1;
            continue;
        }
        if w == flag {
            match words.get(i + 1).map(|s| s.as_str()) {
                Some(next) if !next.starts_with('-') => {
                    state.mode = Some(DryRunMode::from_value(next));
                    i += 2;
                }
                // Bare flag: present but without an effective mode
                _ => {
                    state.mode = Some(DryRunMode::None);
                    i += 1;
                }
            }
            continue;
        }
        i += 1;
    }
    state
}
