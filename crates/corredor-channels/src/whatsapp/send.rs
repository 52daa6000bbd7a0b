//! Outbound message helpers.

/// Split a message into chunks no longer than `max` bytes, preferring
/// newline boundaries, then spaces, then a hard char-boundary cut.
pub(super) fn split_message(text: &str, max: usize) -> Vec<&str> {
    if text.len() <= max {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max {
        let window = &rest[..floor_char_boundary(rest, max)];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(window.len());

        chunks.push(rest[..cut].trim_end());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

/// Largest index `<= max` that lies on a char boundary.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
