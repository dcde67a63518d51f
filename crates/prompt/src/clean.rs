//! Unicode cleanup for text sent to the generation provider.

/// Replace separator and typographic characters with plain equivalents.
///
/// Search snippets frequently carry U+2028/U+2029 separators and curly
/// quotes copied from web pages.
pub fn clean_unicode_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2028}' => cleaned.push('\n'),
            '\u{2029}' => cleaned.push_str("\n\n"),
            '\u{2018}' | '\u{2019}' => cleaned.push('\''),
            '\u{201c}' | '\u{201d}' => cleaned.push('"'),
            '\u{202f}' => cleaned.push(' '),
            other => cleaned.push(other),
        }
    }
    cleaned
}
