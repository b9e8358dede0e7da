//! Terminal output sanitization
//!
//! Titles and message bodies come straight from the Cursor store and may contain escape
//! sequences. Everything the CLI prints in plain-text mode goes through
//! [`sanitize_for_terminal`] or [`sanitize_inline`] first. JSON output is left as is,
//! since serde_json escapes control characters itself.

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Remove ANSI CSI/OSC sequences and control characters, keeping tabs and line breaks
///
/// ```
/// use cursor_history_explorer::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m text"), "Red text");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.peek() {
                // CSI: ESC [ params final-letter
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... terminated by BEL or ESC \
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Sanitize and fold onto one line, for table cells and titles
pub fn sanitize_inline(text: &str) -> String {
    sanitize_for_terminal(text).split_whitespace().collect::<Vec<_>>().join(" ")
}
