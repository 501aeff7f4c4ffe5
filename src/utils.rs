use ratatui::text::Text;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Visual lines of `text` at `max_width`, as (trimmed text, start char, end char).
/// Mirrors ratatui's `Wrap { trim: true }` closely enough for cursor placement.
fn simulate_wrapped_lines(text: &str, max_width: usize) -> Vec<(String, usize, usize)> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;
    let mut start = 0;
    let mut char_count = 0;

    for (idx, ch) in text.chars().enumerate() {
        char_count = idx + 1;
        if ch == '\n' {
            lines.push((current.trim_end().to_string(), start, idx));
            current.clear();
            width = 0;
            start = idx + 1;
            continue;
        }
        let w = ch.width().unwrap_or(1);
        if width + w > max_width && width > 0 {
            lines.push((current.trim_end().to_string(), start, idx));
            current = ch.to_string();
            width = w;
            start = idx;
        } else {
            current.push(ch);
            width += w;
        }
    }

    if !current.is_empty() || text.ends_with('\n') {
        lines.push((current.trim_end().to_string(), start, char_count));
    }
    lines
}

/// (line, column) of a character-indexed cursor once `text` is wrapped at `max_width`.
pub fn calculate_wrapped_cursor_position(
    text: &str,
    cursor_index: usize,
    max_width: usize,
) -> (usize, usize) {
    if text.is_empty() || cursor_index == 0 || max_width == 0 {
        return (0, 0);
    }

    let wrapped = simulate_wrapped_lines(text, max_width);
    for (line_idx, (_, start, end)) in wrapped.iter().enumerate() {
        if cursor_index >= *start && cursor_index <= *end {
            return (line_idx, cursor_index - start);
        }
    }

    match wrapped.last() {
        Some((last, _, _)) => (wrapped.len() - 1, last.chars().count()),
        None => (0, 0),
    }
}

/// Rows `text` occupies when wrapped to `width` columns.
pub fn estimate_text_height(text: &Text, width: usize) -> usize {
    if width == 0 {
        return text.lines.len();
    }
    text.lines
        .iter()
        .map(|line| {
            let w: usize = line.spans.iter().map(|s| s.content.width()).sum();
            w.div_ceil(width).max(1)
        })
        .sum()
}

pub fn calculate_max_scroll(content_height: usize, visible_height: usize) -> u16 {
    content_height
        .saturating_sub(visible_height)
        .min(u16::MAX as usize) as u16
}
