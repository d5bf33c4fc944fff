use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// Governed programs keyed by the exact name a command's first token
    /// must match.
    #[serde(default)]
    pub programs: BTreeMap<String, ProgramConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Allow the command when the hook input cannot be decoded.
    pub fail_open: bool,
    /// Append decisions to ~/.local/share/gitops-gate/decisions.log.
    pub decision_log: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_open: true,
            decision_log: false,
        }
    }
}

/// Rule data for one governed program. Two-word verb entries are written
/// space-joined, e.g. "rollout status".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProgramConfig {
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub mutating: Vec<String>,
    #[serde(default)]
    pub value_flags: Vec<String>,
    #[serde(default)]
    pub boolean_flags: Vec<String>,
    /// Flag whose client/server value downgrades a mutation to allowed.
    /// Empty disables the override for this program.
    #[serde(default)]
    pub dry_run_flag: String,
    /// Appended to block messages.
    #[serde(default)]
    pub remediation: String,
    /// Token substrings marking an invocation as targeting the GitOps
    /// engine itself (its namespaces, its CRDs). Blocks matching one
    /// report `bootstrap_remediation` instead of `remediation`.
    #[serde(default)]
    pub bootstrap_patterns: Vec<String>,
    /// Appended to bootstrap-scoped block messages. Empty falls back to
    /// `remediation`.
    #[serde(default)]
    pub bootstrap_remediation: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    programs: BTreeMap<String, ProgramOverlay>,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    fail_open: Option<bool>,
    decision_log: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ProgramOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    read_only: Vec<String>,
    #[serde(default)]
    mutating: Vec<String>,
    #[serde(default)]
    value_flags: Vec<String>,
    #[serde(default)]
    boolean_flags: Vec<String>,
    dry_run_flag: Option<String>,
    remediation: Option<String>,
    #[serde(default)]
    bootstrap_patterns: Vec<String>,
    bootstrap_remediation: Option<String>,
    #[serde(default)]
    remove_read_only: Vec<String>,
    #[serde(default)]
    remove_mutating: Vec<String>,
    #[serde(default)]
    remove_value_flags: Vec<String>,
    #[serde(default)]
    remove_boolean_flags: Vec<String>,
    #[serde(default)]
    remove_bootstrap_patterns: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces the default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/gitops-gate/config.toml (if exists)
    ///
    /// User config merges with defaults: lists extend, scalars override.
    /// Set `replace = true` in a program section to replace its lists, and
    /// `remove_<field>` lists to subtract items. A [programs.<name>]
    /// section whose name is not in the defaults adds a new governed
    /// program.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load the user overlay from ~/.config/gitops-gate/config.toml.
    /// A parse error is reported and the overlay ignored; the gate must
    /// keep working on defaults.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = std::path::Path::new(&home).join(".config/gitops-gate/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("gitops-gate: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.settings.fail_open {
            self.settings.fail_open = v;
        }
        if let Some(v) = overlay.settings.decision_log {
            self.settings.decision_log = v;
        }

        for (name, p) in overlay.programs {
            let base = self.programs.entry(name).or_default();
            merge_list(&mut base.read_only, p.read_only, &p.remove_read_only, p.replace);
            merge_list(&mut base.mutating, p.mutating, &p.remove_mutating, p.replace);
            merge_list(
                &mut base.value_flags,
                p.value_flags,
                &p.remove_value_flags,
                p.replace,
            );
            merge_list(
                &mut base.boolean_flags,
                p.boolean_flags,
                &p.remove_boolean_flags,
                p.replace,
            );
            merge_list(
                &mut base.bootstrap_patterns,
                p.bootstrap_patterns,
                &p.remove_bootstrap_patterns,
                p.replace,
            );
            if let Some(v) = p.dry_run_flag {
                base.dry_run_flag = v;
            }
            if let Some(v) = p.remediation {
                base.remediation = v;
            }
            if let Some(v) = p.bootstrap_remediation {
                base.bootstrap_remediation = v;
            }
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        let kubectl = &config.programs["kubectl"];
        assert!(!kubectl.read_only.is_empty());
        assert!(!kubectl.mutating.is_empty());
        assert!(!kubectl.value_flags.is_empty());
        assert_eq!(kubectl.dry_run_flag, "--dry-run");
        assert!(!kubectl.remediation.is_empty());
    }

    #[test]
    fn default_has_expected_verbs() {
        let config = Config::default_config();
        let kubectl = &config.programs["kubectl"];
        assert!(kubectl.read_only.contains(&"get".to_string()));
        assert!(kubectl.read_only.contains(&"rollout status".to_string()));
        assert!(kubectl.mutating.contains(&"apply".to_string()));
        assert!(kubectl.mutating.contains(&"rollout restart".to_string()));
        assert!(kubectl.mutating.contains(&"set image".to_string()));
    }

    #[test]
    fn default_settings() {
        let config = Config::default_config();
        assert!(config.settings.fail_open);
        assert!(!config.settings.decision_log);
    }

    #[test]
    fn default_bootstrap_scope() {
        let config = Config::default_config();
        let kubectl = &config.programs["kubectl"];
        assert!(kubectl.bootstrap_patterns.contains(&"argocd".to_string()));
        assert!(kubectl.bootstrap_patterns.contains(&"argoproj.io".to_string()));
        assert!(!kubectl.bootstrap_remediation.is_empty());
    }

    #[test]
    fn kubectl_is_the_only_default_program() {
        let config = Config::default_config();
        assert_eq!(config.programs.len(), 1);
        assert!(config.programs.contains_key("kubectl"));
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_extends_read_only() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            read_only = ["kustomize"]
        "#,
        );
        let kubectl = &config.programs["kubectl"];
        assert!(kubectl.read_only.contains(&"get".to_string()));
        assert!(kubectl.read_only.contains(&"kustomize".to_string()));
    }

    #[test]
    fn overlay_removes_entries() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            remove_mutating = ["exec", "cp"]
        "#,
        );
        let kubectl = &config.programs["kubectl"];
        assert!(!kubectl.mutating.contains(&"exec".to_string()));
        assert!(!kubectl.mutating.contains(&"cp".to_string()));
        assert!(kubectl.mutating.contains(&"apply".to_string()));
    }

    #[test]
    fn overlay_replace_mode() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            replace = true
            read_only = ["get"]
            mutating = ["apply", "delete"]
        "#,
        );
        let kubectl = &config.programs["kubectl"];
        assert_eq!(kubectl.read_only, vec!["get"]);
        assert_eq!(kubectl.mutating, vec!["apply", "delete"]);
        // Unlisted lists are replaced with nothing
        assert!(kubectl.value_flags.is_empty());
        // Scalars not in the overlay keep their defaults
        assert_eq!(kubectl.dry_run_flag, "--dry-run");
    }

    #[test]
    fn overlay_adds_a_new_program() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.helm]
            read_only = ["list", "status", "get"]
            mutating = ["install", "upgrade", "uninstall", "rollback"]
            dry_run_flag = "--dry-run"
            remediation = "helm changes go through the release pipeline"
        "#,
        );
        assert!(config.programs.contains_key("helm"));
        let helm = &config.programs["helm"];
        assert!(helm.mutating.contains(&"install".to_string()));
        // kubectl untouched
        assert!(config.programs["kubectl"].read_only.contains(&"get".to_string()));
    }

    #[test]
    fn overlay_scalar_overrides() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            fail_open = false
            decision_log = true

            [programs.kubectl]
            remediation = "open a change ticket"
        "#,
        );
        assert!(!config.settings.fail_open);
        assert!(config.settings.decision_log);
        assert_eq!(config.programs["kubectl"].remediation, "open a change ticket");
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            read_only = ["get"]
        "#,
        );
        let count = config.programs["kubectl"]
            .read_only
            .iter()
            .filter(|s| *s == "get")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn overlay_bootstrap_fields() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            bootstrap_patterns = ["fluxcd", "flux-system"]
            bootstrap_remediation = "Flux cannot reconcile itself"
        "#,
        );
        let kubectl = &config.programs["kubectl"];
        assert!(kubectl.bootstrap_patterns.contains(&"argocd".to_string()));
        assert!(kubectl.bootstrap_patterns.contains(&"fluxcd".to_string()));
        assert_eq!(kubectl.bootstrap_remediation, "Flux cannot reconcile itself");
    }

    #[test]
    fn overlay_move_verb_between_tables() {
        let mut config = Config::default_config();
        // Treat port-forward as read-only in a relaxed deployment
        config.apply_overlay_str(
            r#"
            [programs.kubectl]
            remove_mutating = ["port-forward"]
            read_only = ["port-forward"]
        "#,
        );
        let kubectl = &config.programs["kubectl"];
        assert!(!kubectl.mutating.contains(&"port-forward".to_string()));
        assert!(kubectl.read_only.contains(&"port-forward".to_string()));
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert!(config.settings.fail_open);
        assert_eq!(
            config.programs["kubectl"].read_only.len(),
            original.programs["kubectl"].read_only.len()
        );
    }
}
