//! Argument tokenizer — split message text after the command word into
//! argument tokens, honoring double-quoted spans.

/// Tokenize the argument portion of `text`.
///
/// `text` is the full input including the command word; everything up to
/// the first whitespace is skipped. Runs of whitespace separate tokens
/// except inside a double-quoted span, where whitespace is kept literally.
/// An unterminated quote flushes whatever it accumulated. Tokens that trim
/// to nothing are dropped. Pure function; never fails.
pub fn tokenize(text: &str) -> Vec<String> {
    let rest = match text.find(char::is_whitespace) {
        Some(idx) => text[idx..].trim(),
        None => return Vec::new(),
    };
    if rest.is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in rest.chars() {
        if ch == '"' {
            if in_quotes {
                flush(&mut current, &mut args);
            }
            in_quotes = !in_quotes;
        } else if ch.is_whitespace() && !in_quotes {
            flush(&mut current, &mut args);
        } else {
            current.push(ch);
        }
    }
    flush(&mut current, &mut args);
    args
}

fn flush(current: &mut String, args: &mut Vec<String>) {
    let token = current.trim();
    if !token.is_empty() {
        args.push(token.to_string());
    }
    current.clear();
}
