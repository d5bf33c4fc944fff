//! Types produced by the shell splitter and consumed by the eval layer.

/// Shell operator separating consecutive command segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
    /// `;`: run next unconditionally (unquoted newlines count too)
    Semi,
    /// `|`: pipe stdout
    Pipe,
    /// `|&`: pipe stdout+stderr
    PipeErr,
    /// `&`: run previous in background, continue
    Background,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Semi => ";",
            Operator::Pipe => "|",
            Operator::PipeErr => "|&",
            Operator::Background => "&",
        }
    }
}

/// A command string decomposed at shell operators.
///
/// For a simple command like `kubectl get pods`, there is one segment and
/// no operators. For `a && b | c`, three segments and two operators.
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub segments: Vec<String>,
    pub operators: Vec<Operator>,
}
