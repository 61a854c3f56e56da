use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, FontSet};
use crate::template::{PRIMARY_COLOR, TEXT_COLOR};

/// Vertical step between wrapped value lines inside a labeled field.
const FIELD_LINE_HEIGHT: f32 = 14.0;
/// Gap between a field's label baseline and its first value line.
const LABEL_VALUE_GAP: f32 = 4.0;

/// Greedy word-wrap: accumulate whitespace-separated words into lines
/// whose measured width stays within `max_width`.
///
/// A single word wider than `max_width` is placed alone on its own line
/// and may overflow the box; it is never split. Empty or whitespace-only
/// input yields no lines.
pub(super) fn wrap_text(
    text: &str,
    entry: &FontEntry,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let tentative = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if entry.text_width(&tentative, font_size) <= max_width {
            current = tentative;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current = word.to_string();
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn set_fill(content: &mut Content, color: [u8; 3]) {
    content.set_fill_rgb(
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
    );
}

/// Show one run of text at an absolute position. The fill color must
/// already be set.
pub(super) fn draw_text(
    content: &mut Content,
    entry: &FontEntry,
    font_size: f32,
    x: f32,
    y: f32,
    text: &str,
) {
    content.begin_text();
    content.set_font(Name(entry.pdf_name.as_bytes()), font_size);
    content.next_line(x, y);
    content.show(Str(&entry.encode(text)));
    content.end_text();
}

/// Like `draw_text`, but with the text's right edge at `right_x`.
pub(super) fn draw_text_right(
    content: &mut Content,
    entry: &FontEntry,
    font_size: f32,
    right_x: f32,
    y: f32,
    text: &str,
) {
    let width = entry.text_width(text, font_size);
    draw_text(content, entry, font_size, right_x - width, y, text);
}

pub(super) struct FieldOptions {
    pub(super) label_size: f32,
    pub(super) value_size: f32,
    /// Trailing gap added below the field; lets callers stack fields
    /// tightly (small gap) or place them in isolation (zero).
    pub(super) line_gap: f32,
}

impl Default for FieldOptions {
    fn default() -> Self {
        FieldOptions {
            label_size: 11.0,
            value_size: 11.0,
            line_gap: 16.0,
        }
    }
}

/// Draw a bold label at `(x, y)` with the wrapped value block below it,
/// and return the y the next field should start at (`y` minus the height
/// consumed minus `line_gap`).
///
/// Blank values render as a dash so the slot never disappears from the
/// document. An empty label skips the label draw but keeps the label
/// row's height, so chained fields stay aligned either way.
pub(super) fn draw_field(
    content: &mut Content,
    fonts: &FontSet,
    label: &str,
    value: &str,
    x: f32,
    y: f32,
    width: f32,
    options: &FieldOptions,
) -> f32 {
    let trimmed = value.trim();
    let value = if trimmed.is_empty() { "-" } else { trimmed };

    if !label.is_empty() {
        set_fill(content, PRIMARY_COLOR);
        draw_text(content, &fonts.bold, options.label_size, x, y, label);
    }

    let lines = wrap_text(value, &fonts.regular, options.value_size, width);
    set_fill(content, TEXT_COLOR);
    for (index, line) in lines.iter().enumerate() {
        let line_y = y - options.label_size - LABEL_VALUE_GAP - index as f32 * FIELD_LINE_HEIGHT;
        draw_text(content, &fonts.regular, options.value_size, x, line_y, line);
    }

    let used_height = options.label_size
        + LABEL_VALUE_GAP
        + lines.len().saturating_sub(1) as f32 * FIELD_LINE_HEIGHT;
    y - used_height - options.line_gap
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_writer::Ref;

    fn helvetica() -> FontEntry {
        FontEntry::for_tests(Ref::new(1))
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let entry = helvetica();
        assert!(wrap_text("", &entry, 11.0, 200.0).is_empty());
        assert!(wrap_text("   \t  ", &entry, 11.0, 200.0).is_empty());
    }

    #[test]
    fn lines_stay_within_width() {
        let entry = helvetica();
        let text = "Diseño y desarrollo de sitio web corporativo con panel de \
                    administración y optimización para buscadores";
        let lines = wrap_text(text, &entry, 11.0, 150.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                entry.text_width(line, 11.0) <= 150.0,
                "line too wide: {line:?}"
            );
        }
    }

    #[test]
    fn word_sequence_is_preserved() {
        let entry = helvetica();
        let text = "uno  dos   tres cuatro cinco seis siete ocho nueve diez";
        let lines = wrap_text(text, &entry, 11.0, 90.0);
        let rejoined = lines.join(" ");
        let words: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined.split_whitespace().collect::<Vec<_>>(), words);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let entry = helvetica();
        let text = "ver https://example.com/una/ruta/extremadamente/larga/sin/espacios aqui";
        let lines = wrap_text(text, &entry, 11.0, 80.0);
        let long = lines
            .iter()
            .find(|l| l.starts_with("https://"))
            .expect("oversized word kept");
        // Alone on its line, wider than the box, but intact.
        assert!(entry.text_width(long, 11.0) > 80.0);
        assert_eq!(long.split_whitespace().count(), 1);
    }

    #[test]
    fn wrap_is_deterministic() {
        let entry = helvetica();
        let text = "servicio mensual de mantenimiento y soporte técnico continuo";
        let a = wrap_text(text, &entry, 10.0, 120.0);
        let b = wrap_text(text, &entry, 10.0, 120.0);
        assert_eq!(a, b);
    }
}
