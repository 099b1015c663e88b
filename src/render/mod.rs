//! Widgets for a `LessonView`: terminal text and a single HTML page

pub mod html;
pub mod text;

/// A run of prose with its inline markup resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Strong(&'a str),
    Code(&'a str),
}

/// Split prose on `**strong**` and `` `code` `` markers.
/// An unterminated marker is kept as plain text.
pub fn spans(text: &str) -> Vec<Span<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let strong = rest.find("**");
        let code = rest.find('`');
        let (start, marker) = match (strong, code) {
            (Some(s), Some(c)) if c < s => (c, "`"),
            (Some(s), _) => (s, "**"),
            (None, Some(c)) => (c, "`"),
            (None, None) => {
                out.push(Span::Plain(rest));
                break;
            }
        };

        let inner_start = start + marker.len();
        let Some(len) = rest[inner_start..].find(marker) else {
            out.push(Span::Plain(rest));
            break;
        };

        if start > 0 {
            out.push(Span::Plain(&rest[..start]));
        }
        let inner = &rest[inner_start..inner_start + len];
        out.push(if marker == "`" {
            Span::Code(inner)
        } else {
            Span::Strong(inner)
        });
        rest = &rest[inner_start + len + marker.len()..];
    }

    out
}

/// Bar length for `value` when `max` fills `width` cells; non-zero values get at least one cell
pub fn bar_len(value: i64, max: i64, width: usize) -> usize {
    if value <= 0 || max <= 0 {
        return 0;
    }
    let scaled = (value as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}
