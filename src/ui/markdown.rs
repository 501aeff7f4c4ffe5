use crate::ui::theme::Palette;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[.)]\s+(.*)$").expect("valid numbered-list regex"));
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(?P<bold>.+?)\*\*|\*(?P<italic>[^*\s][^*]*)\*|`(?P<code>[^`]+)`")
        .expect("valid inline regex")
});

/// Render tutor replies and problem statements as styled lines.
///
/// Understands `#`..`###` headings, `-`/`*`/numbered list items, fenced code
/// and inline **bold**, *italic* and `code`. Everything else is plain text.
pub fn render_markdown(content: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        match line.trim_start().strip_prefix("```") {
            Some(lang) => render_fence(lang.trim(), &mut lines, palette, &mut out),
            None => out.push(render_line(line, palette)),
        }
    }
    out
}

fn render_fence<'a>(
    lang: &str,
    lines: &mut impl Iterator<Item = &'a str>,
    palette: &Palette,
    out: &mut Vec<Line<'static>>,
) {
    if !lang.is_empty() {
        out.push(Line::from(Span::styled(
            format!("[{}]", lang),
            palette.muted().add_modifier(Modifier::ITALIC),
        )));
    }
    let style = Style::default().fg(palette.code);
    // An unclosed fence runs to the end of the text.
    for body in lines.take_while(|l| !l.trim_start().starts_with("```")) {
        out.push(Line::from(Span::styled(format!("  {}", body), style)));
    }
}

fn render_line(line: &str, palette: &Palette) -> Line<'static> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::from("");
    }

    let level = trimmed.bytes().take_while(|&b| b == b'#').count();
    if (1..=3).contains(&level) {
        if let Some(title) = trimmed[level..].strip_prefix(' ') {
            return Line::from(Span::styled(
                title.trim().to_string(),
                palette.heading().add_modifier(Modifier::UNDERLINED),
            ));
        }
    }

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return list_item("  • ".to_string(), item, palette);
    }
    if let Some(caps) = NUMBERED_RE.captures(trimmed) {
        let item = caps.get(2).map_or("", |m| m.as_str());
        return list_item(format!("  {}. ", &caps[1]), item, palette);
    }

    Line::from(inline_spans(line, palette))
}

fn list_item(marker: String, item: &str, palette: &Palette) -> Line<'static> {
    let mut spans = vec![Span::styled(marker, Style::default().fg(palette.accent))];
    spans.extend(inline_spans(item, palette));
    Line::from(spans)
}

fn inline_spans(text: &str, palette: &Palette) -> Vec<Span<'static>> {
    let plain = palette.text();
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (body, style) = if let Some(m) = caps.name("bold") {
            (m, plain.add_modifier(Modifier::BOLD))
        } else if let Some(m) = caps.name("italic") {
            (m, plain.add_modifier(Modifier::ITALIC))
        } else if let Some(m) = caps.name("code") {
            (m, Style::default().fg(palette.code))
        } else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::styled(text[last..whole.start()].to_string(), plain));
        }
        spans.push(Span::styled(body.as_str().to_string(), style));
        last = whole.end();
    }

    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[last..].to_string(), plain));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;

    fn dark() -> Palette {
        Palette::for_theme(Theme::Dark)
    }

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_plain_and_blank_lines() {
        let result = render_markdown("Line 1\n\nLine 2", &dark());
        assert_eq!(text_of(&result), vec!["Line 1", "", "Line 2"]);
    }

    #[test]
    fn test_inline_styles() {
        let palette = dark();
        let result = render_markdown("Use **two pointers** and *sort* the `vector`", &palette);
        let spans = &result[0].spans;
        assert_eq!(spans.len(), 6);
        assert_eq!(spans[0].content, "Use ");
        assert_eq!(spans[1].content, "two pointers");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[3].style.add_modifier.contains(Modifier::ITALIC));
        assert_eq!(spans[5].content, "vector");
        assert_eq!(spans[5].style.fg, Some(palette.code));
    }

    #[test]
    fn test_multiplication_is_not_italic() {
        let result = render_markdown("a * b * c", &dark());
        assert_eq!(result[0].spans.len(), 1);
        assert_eq!(result[0].to_string(), "a * b * c");
    }

    #[test]
    fn test_headings_and_lists() {
        let palette = dark();
        let result = render_markdown("## Approach\n- **Hash** map\n2) Scan once\n####### no", &palette);
        let text = text_of(&result);
        assert_eq!(text[0], "Approach");
        assert_eq!(result[0].spans[0].style.fg, Some(palette.accent));
        assert_eq!(text[1], "  • Hash map");
        assert!(result[1].spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text[2], "  2. Scan once");
        assert_eq!(text[3], "####### no");
    }

    #[test]
    fn test_fenced_code_block_is_verbatim() {
        let palette = dark();
        let content = "Try this:\n```cpp\nint x = a * b * c;\n```\nDone";
        let result = render_markdown(content, &palette);
        assert_eq!(
            text_of(&result),
            vec!["Try this:", "[cpp]", "  int x = a * b * c;", "Done"]
        );
        assert_eq!(result[2].spans.len(), 1);
        assert_eq!(result[2].spans[0].style.fg, Some(palette.code));
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let result = render_markdown("```\n**not bold**", &dark());
        assert_eq!(text_of(&result), vec!["  **not bold**"]);
    }

    #[test]
    fn test_themes_style_markdown_differently() {
        let content = "# Title\nplain `code`\n```\nbody\n```";
        let dark_lines = render_markdown(content, &Palette::for_theme(Theme::Dark));
        let light_lines = render_markdown(content, &Palette::for_theme(Theme::Light));

        assert_eq!(text_of(&dark_lines), text_of(&light_lines));
        for (d, l) in dark_lines.iter().zip(&light_lines) {
            let dark_styles: Vec<Style> = d.spans.iter().map(|s| s.style).collect();
            let light_styles: Vec<Style> = l.spans.iter().map(|s| s.style).collect();
            assert_ne!(dark_styles, light_styles);
        }
    }
}
