//! Verb resolution: find the operation a governed invocation names,
//! walking past global flags and their values.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// The operation word(s) of an invocation, e.g. `get` or `rollout restart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbPath {
    pub first: String,
    pub second: Option<String>,
}

impl VerbPath {
    pub fn single(first: &str) -> Self {
        Self {
            first: first.to_string(),
            second: None,
        }
    }

    pub fn pair(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: Some(second.to_string()),
        }
    }
}

impl fmt::Display for VerbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.second {
            Some(second) => write!(f, "{} {second}", self.first),
            None => write!(f, "{}", self.first),
        }
    }
}

/// Flag arity table for one program family: `true` entries take their value
/// in the following token, `false` entries never do. Flags absent from the
/// table fall back to the peek heuristic in [`FlagTable::consumes_next`].
#[derive(Debug, Default)]
pub struct FlagTable {
    arity: HashMap<String, bool>,
}

impl FlagTable {
    pub fn new(value_flags: &[String], boolean_flags: &[String]) -> Self {
        let mut arity = HashMap::new();
        for flag in value_flags {
            arity.insert(flag.clone(), true);
        }
        // On a conflict the boolean entry wins; refusing to swallow the
        // next token can only misresolve toward a block.
        for flag in boolean_flags {
            arity.insert(flag.clone(), false);
        }
        Self { arity }
    }

    /// Whether the flag consumes the following token as its value.
    ///
    /// Declared boolean flags never do. Declared value flags and unknown
    /// flags pair with the next token unless it also looks like a flag;
    /// a flag never swallows another flag.
    pub fn consumes_next(&self, flag: &str, next: Option<&str>) -> bool {
        match self.arity.get(flag) {
            Some(false) => false,
            _ => matches!(next, Some(n) if !n.starts_with('-')),
        }
    }
}

/// Resolve the verb path of a tokenized invocation. `words[0]` is the
/// program name; the walk starts after it.
///
/// Single-token flags with an embedded `=` are self-contained. Other flags
/// consume tokens per [`FlagTable::consumes_next`]. A bare `--` ends flag
/// parsing, so the token after it is taken verbatim. When the first verb
/// token is in `prefix_verbs`, the next word (found by the same walk)
/// completes a two-token path.
///
/// Returns `None` when no verb token exists, e.g. `kubectl --help`.
pub fn resolve(
    words: &[String],
    flags: &FlagTable,
    prefix_verbs: &HashSet<String>,
) -> Option<VerbPath> {
    if words.is_empty() {
        return None;
    }
    let (first, rest) = next_word(&words[1..], flags)?;
    if prefix_verbs.contains(first)
        && let Some((second, _)) = next_word(rest, flags)
    {
        return Some(VerbPath::pair(first, second));
    }
    Some(VerbPath::single(first))
}

/// First non-flag token in `words`, plus the tokens after it.
fn next_word<'a>(words: &'a [String], flags: &FlagTable) -> Option<(&'a str, &'a [String])> {
    let mut i = 0;
    while i < words.len() {
        let w = words[i].as_str();
        if w == "--" {
            let rest = &words[i + 1..];
            return rest.first().map(|first| (first.as_str(), &rest[1..]));
        }
        if !w.starts_with('-') {
            return Some((w, &words[i + 1..]));
        }
        if w.contains('=') {
            i += 1;
            continue;
        }
        if flags.consumes_next(w, words.get(i + 1).map(|s| s.as_str())) {
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FlagTable {
        FlagTable::new(
            &["-n".into(), "--namespace".into(), "--context".into()],
            &["--insecure-skip-tls-verify".into()],
        )
    }

    fn prefixes() -> HashSet<String> {
        ["rollout", "set", "config", "auth"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn resolve_str(command: &str) -> Option<String> {
        let words: Vec<String> = command.split_whitespace().map(String::from).collect();
        resolve(&words, &table(), &prefixes()).map(|v| v.to_string())
    }

    #[test]
    fn verb_right_after_program() {
        assert_eq!(resolve_str("kubectl get pods"), Some("get".into()));
    }

    #[test]
    fn flag_with_embedded_value_skipped() {
        assert_eq!(
            resolve_str("kubectl --namespace=default delete pod nginx"),
            Some("delete".into())
        );
    }

    #[test]
    fn short_flag_with_separate_value_skipped() {
        assert_eq!(resolve_str("kubectl -n default get pods"), Some("get".into()));
    }

    #[test]
    fn declared_boolean_flag_keeps_verb() {
        assert_eq!(
            resolve_str("kubectl --insecure-skip-tls-verify get pods"),
            Some("get".into())
        );
    }

    #[test]
    fn unknown_flag_peeks_value() {
        // --foo is unknown; the non-flag token after it reads as its value
        assert_eq!(resolve_str("kubectl --foo bar get pods"), Some("get".into()));
    }

    #[test]
    fn unknown_flag_never_swallows_a_flag() {
        assert_eq!(
            resolve_str("kubectl --foo --namespace=x get pods"),
            Some("get".into())
        );
    }

    #[test]
    fn double_dash_ends_flag_parsing() {
        assert_eq!(resolve_str("kubectl -n x -- get pods"), Some("get".into()));
    }

    #[test]
    fn two_token_path_for_prefix_verbs() {
        assert_eq!(
            resolve_str("kubectl rollout restart deploy/foo"),
            Some("rollout restart".into())
        );
        assert_eq!(
            resolve_str("kubectl auth can-i create pods"),
            Some("auth can-i".into())
        );
    }

    #[test]
    fn flags_between_verb_tokens_skipped() {
        assert_eq!(
            resolve_str("kubectl rollout -n prod status deploy/foo"),
            Some("rollout status".into())
        );
    }

    #[test]
    fn prefix_verb_alone_resolves_single() {
        assert_eq!(resolve_str("kubectl rollout"), Some("rollout".into()));
    }

    #[test]
    fn no_verb_found() {
        assert_eq!(resolve_str("kubectl --help"), None);
        assert_eq!(resolve_str("kubectl"), None);
        assert_eq!(resolve_str("kubectl -n default"), None);
    }

    #[test]
    fn scale_with_trailing_flags() {
        assert_eq!(
            resolve_str("kubectl -n prod scale deployment api --replicas=3"),
            Some("scale".into())
        );
    }
}
