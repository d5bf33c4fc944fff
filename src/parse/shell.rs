use super::types::{CommandLine, Operator};

/// Split a command at shell operators (&&, ||, ;, |, |&, &, newline),
/// respecting single/double quotes and backslash escapes.
///
/// `&>` redirections and fd duplications like `2>&1` are not separators.
/// Unquoted newlines separate commands the same way `;` does.
pub fn split_compound_command(command: &str) -> CommandLine {
    let mut segments = Vec::new();
    let mut operators = Vec::new();
    let mut buf = String::new();

    let chars: Vec<char> = command.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    while i < len {
        let c = chars[i];

        if esc {
            buf.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            buf.push(c);
            i += 1;
            continue;
        }
        if sq || dq {
            buf.push(c);
            i += 1;
            continue;
        }

        // Two-char operators
        if i + 1 < len {
            let next = chars[i + 1];
            let op = match (c, next) {
                ('&', '&') => Some(Operator::And),
                ('|', '|') => Some(Operator::Or),
                ('|', '&') => Some(Operator::PipeErr),
                _ => None,
            };
            if let Some(op) = op {
                segments.push(buf.trim().to_string());
                operators.push(op);
                buf.clear();
                i += 2;
                continue;
            }
            // &> redirects both streams to a file, not a separator
            if c == '&' && next == '>' {
                buf.push(c);
                i += 1;
                continue;
            }
        }

        // Single-char operators
        let op = match c {
            '|' => Some(Operator::Pipe),
            ';' | '\n' => Some(Operator::Semi),
            // & backgrounds the command so far, unless it follows > (2>&1)
            '&' if !buf.ends_with('>') => Some(Operator::Background),
            _ => None,
        };
        if let Some(op) = op {
            segments.push(buf.trim().to_string());
            operators.push(op);
            buf.clear();
            i += 1;
            continue;
        }

        buf.push(c);
        i += 1;
    }

    let tail = buf.trim().to_string();
    if !tail.is_empty() {
        segments.push(tail);
    }

    // Filter empties (consecutive separators, leading/trailing operators)
    segments.retain(|p| !p.is_empty());

    CommandLine {
        segments,
        operators,
    }
}
