//! Decoding the PreToolUse request the host agent writes to stdin.

use serde::Deserialize;

use crate::eval::{Decision, Verdict};

/// Incoming hook payload. Fields the gate does not use are ignored.
#[derive(Debug, Deserialize)]
pub struct HookRequest {
    pub tool_name: Option<String>,
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Deserialize)]
pub struct ToolInput {
    pub command: Option<String>,
}

/// What stdin asked of the gate.
#[derive(Debug, PartialEq, Eq)]
pub enum Screened {
    /// A Bash invocation carrying a command to judge.
    Command(String),
    /// Some other tool, or no command at all. The gate takes no position.
    NotBash,
    /// stdin was not a decodable hook request. The adapter maps this to
    /// the configured fail-open/fail-closed policy.
    Undecodable(String),
}

/// Decode a raw stdin payload into a screening outcome.
pub fn screen(input: &str) -> Screened {
    let request: HookRequest = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => return Screened::Undecodable(e.to_string()),
    };
    if request.tool_name.as_deref() != Some("Bash") {
        return Screened::NotBash;
    }
    let command = request
        .tool_input
        .and_then(|t| t.command)
        .unwrap_or_default();
    if command.trim().is_empty() {
        return Screened::NotBash;
    }
    Screened::Command(command)
}

/// Verdict for stdin that did not decode into a hook request.
/// `fail_open` picks the polarity: open lets the command run, closed
/// blocks it with a diagnostic naming the decode failure.
pub fn undecodable_verdict(err: &str, fail_open: bool) -> Verdict {
    if fail_open {
        Verdict {
            decision: Decision::Allow,
            reason: format!("undecodable hook input, failing open: {err}"),
        }
    } else {
        Verdict {
            decision: Decision::Block,
            reason: format!("undecodable hook input, failing closed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_request_yields_command() {
        let input = r#"{"tool_name":"Bash","tool_input":{"command":"kubectl get pods"}}"#;
        assert_eq!(screen(input), Screened::Command("kubectl get pods".into()));
    }

    #[test]
    fn other_tool_is_not_bash() {
        let input = r#"{"tool_name":"Edit","tool_input":{"file_path":"/tmp/x"}}"#;
        assert_eq!(screen(input), Screened::NotBash);
    }

    #[test]
    fn missing_tool_name_is_not_bash() {
        assert_eq!(screen(r#"{"tool_input":{"command":"ls"}}"#), Screened::NotBash);
    }

    #[test]
    fn missing_command_is_not_bash() {
        assert_eq!(screen(r#"{"tool_name":"Bash"}"#), Screened::NotBash);
        assert_eq!(
            screen(r#"{"tool_name":"Bash","tool_input":{}}"#),
            Screened::NotBash
        );
    }

    #[test]
    fn blank_command_is_not_bash() {
        let input = r#"{"tool_name":"Bash","tool_input":{"command":"   "}}"#;
        assert_eq!(screen(input), Screened::NotBash);
    }

    #[test]
    fn garbage_is_undecodable() {
        assert!(matches!(screen("not json"), Screened::Undecodable(_)));
        assert!(matches!(screen(""), Screened::Undecodable(_)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let input = r#"{"tool_name":"Bash","session_id":"abc","cwd":"/tmp",
                        "tool_input":{"command":"kubectl version","timeout":5}}"#;
        assert_eq!(screen(input), Screened::Command("kubectl version".into()));
    }

    #[test]
    fn undecodable_input_fails_open_by_default_policy() {
        let Screened::Undecodable(err) = screen("not json") else {
            panic!("expected undecodable input");
        };
        let verdict = undecodable_verdict(&err, true);
        assert_eq!(verdict.decision, Decision::Allow);
        assert_eq!(verdict.decision.exit_code(), 0);
    }

    #[test]
    fn undecodable_input_fails_closed_when_configured() {
        let Screened::Undecodable(err) = screen("{truncated") else {
            panic!("expected undecodable input");
        };
        let verdict = undecodable_verdict(&err, false);
        assert_eq!(verdict.decision, Decision::Block);
        assert_eq!(verdict.decision.exit_code(), 2);
        assert!(verdict.reason.contains("failing closed"), "{}", verdict.reason);
        assert!(verdict.reason.contains(&err), "{}", verdict.reason);
    }
}
