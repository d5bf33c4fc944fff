/// Tokenize a command segment into words using shlex (POSIX word splitting).
///
/// shlex rejects input with an unterminated quote or a trailing escape.
/// Such commands still need a decision, so a recovery pass splits what it
/// can and keeps the dangling remainder as the final word.
pub fn tokenize(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| tokenize_lossy(command))
}

/// Word splitting for input shlex rejects. Quotes are stripped, and an
/// unterminated quote swallows the rest of the string into its word.
fn tokenize_lossy(command: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut buf = String::new();
    let mut in_word = false;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    for c in command.chars() {
        if esc {
            buf.push(c);
            in_word = true;
            esc = false;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            in_word = true;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            in_word = true;
            continue;
        }
        if c.is_whitespace() && !sq && !dq {
            if in_word {
                words.push(std::mem::take(&mut buf));
                in_word = false;
            }
            continue;
        }
        buf.push(c);
        in_word = true;
    }
    if in_word {
        words.push(buf);
    }
    words
}
