use pdf_writer::Content;

use crate::config::CurrencyConfig;
use crate::error::Error;
use crate::fonts::FontSet;
use crate::model::LineItem;
use crate::money::{TotalsRow, format_amount};
use crate::template::{MUTED_COLOR, TEXT_COLOR, TableAnchors, Template, TotalsAnchors};

use super::PageSet;
use super::layout::{draw_text, draw_text_right, set_fill, wrap_text};

pub(super) struct ItemsLayout {
    /// Index of the last page that received table content.
    pub(super) last_page: usize,
    /// Final cursor position on that page, clamped to the table bottom.
    pub(super) final_y: f32,
}

/// Single-line capacity estimate for the table region. Rows whose wrapped
/// description spans several lines consume more than one `row_gap`, so a
/// page can visually overrun before the estimate triggers a page break;
/// text is still drawn in full either way.
fn rows_per_page(anchors: &TableAnchors, page_height: f32) -> usize {
    let table_start_y = page_height - anchors.start_offset;
    let available_height = table_start_y - anchors.bottom_limit;
    ((available_height / anchors.row_gap).floor() as usize).max(1)
}

/// Lay the line items out top-to-bottom inside the table region, spilling
/// onto freshly provisioned copies of the items template page whenever the
/// estimated row capacity is reached. Items render in input order.
pub(super) fn layout_items(
    pages: &mut PageSet,
    template: &Template,
    fonts: &FontSet,
    start_page: usize,
    items: &[LineItem],
    currency: &CurrencyConfig,
    anchors: &TableAnchors,
    page_height: f32,
) -> Result<ItemsLayout, Error> {
    let table_start_y = page_height - anchors.start_offset;
    let capacity = rows_per_page(anchors, page_height);

    let mut page_index = start_page;
    let mut current_y = table_start_y;

    for (index, item) in items.iter().enumerate() {
        if index > 0 && index % capacity == 0 {
            page_index += 1;
            pages.ensure_page(template, fonts, page_index)?;
            current_y = table_start_y;
        }

        let lines = wrap_text(
            &item.description,
            &fonts.regular,
            anchors.description_size,
            anchors.description_width,
        );
        let block_height =
            (lines.len() as f32 * anchors.description_line_height).max(anchors.row_gap);

        let content = pages.content_mut(page_index);
        set_fill(content, TEXT_COLOR);
        for (line_index, line) in lines.iter().enumerate() {
            draw_text(
                content,
                &fonts.regular,
                anchors.description_size,
                anchors.description_x,
                current_y - line_index as f32 * anchors.description_line_height,
                line,
            );
        }

        draw_text_right(
            content,
            &fonts.bold,
            anchors.price_size,
            anchors.price_right_x,
            current_y,
            &format_amount(item.price, currency),
        );

        current_y -= block_height + anchors.row_spacing;
    }

    Ok(ItemsLayout {
        last_page: page_index,
        final_y: current_y.max(anchors.bottom_limit),
    })
}

/// Render the totals column: label at a fixed x, value right-aligned,
/// stepping down one line gap per row. Emphasized rows (the grand total)
/// switch to the bold face at the larger size.
pub(super) fn draw_totals(
    content: &mut Content,
    fonts: &FontSet,
    rows: &[TotalsRow],
    anchors: &TotalsAnchors,
) {
    let mut current_y = anchors.start_y;
    set_fill(content, TEXT_COLOR);
    for row in rows {
        let (entry, size) = if row.emphasize {
            (&fonts.bold, anchors.emphasize_size)
        } else {
            (&fonts.regular, anchors.size)
        };
        draw_text(content, entry, size, anchors.label_x, current_y, &row.label);
        draw_text_right(
            content,
            entry,
            size,
            anchors.value_right_x,
            current_y,
            &row.value,
        );
        current_y -= anchors.line_gap;
    }
}

/// Small gray note under the totals (applied-discount summary).
pub(super) fn draw_note(
    content: &mut Content,
    fonts: &FontSet,
    note: &str,
    x: f32,
    anchors: &TotalsAnchors,
) {
    set_fill(content, MUTED_COLOR);
    draw_text(content, &fonts.regular, anchors.note_size, x, anchors.note_y, note);
}
