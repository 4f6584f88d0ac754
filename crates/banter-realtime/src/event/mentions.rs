//! @-mention extraction from message content.

/// Extracts mentioned usernames from a message body.
///
/// A mention is `@` followed by one or more word characters (ASCII
/// letters, digits, underscore). The `@` may appear anywhere in the
/// text, including mid-word, matching how the web client highlights
/// mentions. Duplicates are collapsed, first occurrence order kept.
pub fn extract_mentions(content: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    let bytes = content.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'@' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && is_word_byte(bytes[end]) {
                end += 1;
            }
            if end > start {
                // Safe to slice: the word range is pure ASCII.
                let name = &content[start..end];
                if !mentions.iter().any(|m| m == name) {
                    mentions.push(name.to_string());
                }
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }

    mentions
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
