mod layout;
mod table;

use std::collections::BTreeSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::config::DocumentConfig;
use crate::error::Error;
use crate::fonts::{FontSet, register_fonts};
use crate::model::QuoteData;
use crate::money::{TotalsRow, compute_totals, discount_note, totals_rows};
use crate::template::{
    CoverAnchors, DecorOp, ItemsHeaderAnchors, PRIMARY_COLOR, PageRole, Template, TemplatePage,
    TermsAnchors, WHITE_COLOR,
};

use layout::{FieldOptions, draw_field, draw_text, set_fill, wrap_text};

/// One output page under construction: its dimensions and content stream.
pub(crate) struct PageBuf {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) content: Content,
}

/// The ordered output pages. Seeded from the template's fixed pages, then
/// grown append-only as the table paginator demands more capacity. Local
/// to one generation call; nothing here outlives or crosses calls.
pub(crate) struct PageSet {
    pages: Vec<PageBuf>,
}

impl PageSet {
    /// Create one page per template page, each pre-painted with its
    /// static decoration.
    pub(crate) fn seed(template: &Template, fonts: &FontSet) -> PageSet {
        let mut set = PageSet { pages: Vec::new() };
        for page in &template.pages {
            set.push_template_page(page, fonts);
        }
        set
    }

    /// Make sure `target_index` exists, appending copies of the items
    /// template page as needed. Idempotent: an already-satisfied index
    /// appends nothing.
    pub(crate) fn ensure_page(
        &mut self,
        template: &Template,
        fonts: &FontSet,
        target_index: usize,
    ) -> Result<(), Error> {
        while self.pages.len() <= target_index {
            let page = template
                .items_page()
                .ok_or_else(|| Error::Template("template has no items page".to_string()))?;
            self.push_template_page(page, fonts);
        }
        Ok(())
    }

    fn push_template_page(&mut self, page: &TemplatePage, fonts: &FontSet) {
        let mut content = Content::new();
        paint_decor(&mut content, &page.decor, fonts);
        self.pages.push(PageBuf {
            width: page.width,
            height: page.height,
            content,
        });
    }

    pub(crate) fn content_mut(&mut self, index: usize) -> &mut Content {
        &mut self.pages[index].content
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn into_pages(self) -> Vec<PageBuf> {
        self.pages
    }
}

fn paint_decor(content: &mut Content, decor: &[DecorOp], fonts: &FontSet) {
    for op in decor {
        match op {
            DecorOp::Band {
                x,
                y,
                width,
                height,
                color,
            } => {
                set_fill(content, *color);
                content.rect(*x, *y, *width, *height);
                content.fill_nonzero();
            }
            DecorOp::Rule {
                x,
                y,
                width,
                thickness,
                color,
            } => {
                set_fill(content, *color);
                content.rect(*x, *y, *width, *thickness);
                content.fill_nonzero();
            }
            DecorOp::Label {
                text,
                x,
                y,
                size,
                bold,
                color,
            } => {
                let entry = if *bold { &fonts.bold } else { &fonts.regular };
                set_fill(content, *color);
                draw_text(content, entry, *size, *x, *y, text);
            }
        }
    }
}

/// Render a complete quote document and return its bytes.
///
/// Template acquisition and font registration are the only fallible
/// resource steps and both happen before any page content exists, so a
/// failure never leaves partial output behind.
pub(crate) fn render(data: &QuoteData, config: &DocumentConfig) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();

    let template = config.load_template()?;
    let t_template = t0.elapsed();

    let tax_rate = config.tax_rate();
    let totals = compute_totals(
        &data.items,
        data.include_discount,
        data.discount_percentage,
        tax_rate,
    );
    let rows = totals_rows(&totals, data.discount_percentage, tax_rate, &config.currency);
    let note = discount_note(&totals, data.discount_percentage, &config.currency);

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };
    let catalog_id = alloc();
    let pages_id = alloc();

    let used = used_chars(data, &template, &rows, note.as_deref());
    let fonts = register_fonts(&mut pdf, config, &used, &mut alloc)?;
    let t_fonts = t0.elapsed();

    let mut pages = PageSet::seed(&template, &fonts);

    if let Some(index) = template.page_index(PageRole::Cover) {
        let page_height = template.pages[index].height;
        draw_cover(
            pages.content_mut(index),
            &fonts,
            data,
            &template.anchors.cover,
            page_height,
        );
    }
    if let Some(index) = template.page_index(PageRole::Terms) {
        let page_height = template.pages[index].height;
        draw_terms(
            pages.content_mut(index),
            &fonts,
            data,
            &template.anchors.terms,
            page_height,
        );
    }

    let items_index = template
        .page_index(PageRole::Items)
        .ok_or_else(|| Error::Template("template has no items page".to_string()))?;
    let (page_width, page_height) = {
        let page = &template.pages[items_index];
        (page.width, page.height)
    };
    draw_items_header(
        pages.content_mut(items_index),
        &fonts,
        data,
        &template.anchors.items_header,
        page_width,
        page_height,
    );
    let t_fields = t0.elapsed();

    let items_layout = table::layout_items(
        &mut pages,
        &template,
        &fonts,
        items_index,
        &data.items,
        &config.currency,
        &template.anchors.table,
        page_height,
    )?;
    log::debug!(
        "items table ended at y={:.1} on page {}",
        items_layout.final_y,
        items_layout.last_page,
    );

    let last_content = pages.content_mut(items_layout.last_page);
    table::draw_totals(last_content, &fonts, &rows, &template.anchors.totals);
    if let Some(ref note) = note {
        table::draw_note(
            last_content,
            &fonts,
            note,
            template.anchors.table.description_x,
            &template.anchors.totals,
        );
    }
    let t_table = t0.elapsed();

    // Assembly: page count is final, allocate ids and write everything out.
    let page_bufs = pages.into_pages();
    let n = page_bufs.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    let mut dims = Vec::with_capacity(n);
    for (i, buf) in page_bufs.into_iter().enumerate() {
        dims.push((buf.width, buf.height));
        let raw = buf.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
        pdf.stream(content_ids[i], &compressed)
            .filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, dims[i].0, dims[i].1))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        font_dict.pair(Name(fonts.regular.pdf_name.as_bytes()), fonts.regular.font_ref);
        font_dict.pair(Name(fonts.bold.pdf_name.as_bytes()), fonts.bold.font_ref);
    }

    let t_assembly = t0.elapsed();
    log::info!(
        "Render phases: template={:.1}ms, fonts={:.1}ms, fields={:.1}ms, table={:.1}ms, assembly={:.1}ms ({n} pages)",
        t_template.as_secs_f64() * 1000.0,
        (t_fonts - t_template).as_secs_f64() * 1000.0,
        (t_fields - t_fonts).as_secs_f64() * 1000.0,
        (t_table - t_fields).as_secs_f64() * 1000.0,
        (t_assembly - t_table).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}

/// Every character the document can draw, for font subsetting: quote
/// fields, template labels, the pre-built totals rows and note, plus the
/// formatted prices' digit/punctuation set and the blank-value dash.
fn used_chars(
    data: &QuoteData,
    template: &Template,
    rows: &[TotalsRow],
    note: Option<&str>,
) -> BTreeSet<char> {
    let mut chars: BTreeSet<char> = BTreeSet::new();
    let mut take = |s: &str| chars.extend(s.chars());

    take(&data.client_name);
    take(&data.contact);
    take(&data.quote_number);
    take(&data.formatted_date());
    take(&data.quote_title);
    take(&data.work_duration);
    take(&data.method);
    take(&data.provider);
    take(&data.service_goal);
    take(&data.service_includes);
    take(&data.delivery_time);
    take(&data.included_bonus);
    take(&data.why_us);
    for item in &data.items {
        take(&item.description);
    }
    for row in rows {
        take(&row.label);
        take(&row.value);
    }
    if let Some(note) = note {
        take(note);
    }
    for label in template.label_texts() {
        take(label);
    }
    for label in [
        "Cliente:",
        "Duración del trabajo:",
        "Método:",
        "Proveedor:",
        "Fecha:",
        "Objetivo del servicio:",
        "Lo que incluye el servicio:",
        "Tiempo de entrega:",
        "Bonus incluido:",
        "¿Por qué con nosotros?",
    ] {
        take(label);
    }
    take("0123456789.,- ");
    chars
}

/// Cover page: chained client-detail column, then the wrapped title and
/// the two absolutely anchored narrative blocks.
fn draw_cover(
    content: &mut Content,
    fonts: &FontSet,
    data: &QuoteData,
    anchors: &CoverAnchors,
    page_height: f32,
) {
    let opts = FieldOptions::default();
    let width = anchors.detail_width;

    let mut current_y = page_height - anchors.top_offset;
    current_y = draw_field(
        content,
        fonts,
        "Cliente:",
        &data.client_name,
        anchors.client.x,
        current_y + anchors.client.nudge,
        width,
        &opts,
    );
    current_y = draw_field(
        content,
        fonts,
        "Duración del trabajo:",
        &data.work_duration,
        anchors.work_duration.x,
        current_y + anchors.work_duration.nudge,
        width,
        &opts,
    );
    current_y = draw_field(
        content,
        fonts,
        "Método:",
        &data.method,
        anchors.method.x,
        current_y + anchors.method.nudge,
        width,
        &opts,
    );
    current_y = draw_field(
        content,
        fonts,
        "Proveedor:",
        &data.provider,
        anchors.provider.x,
        current_y + anchors.provider.nudge,
        width,
        &opts,
    );
    draw_field(
        content,
        fonts,
        "Fecha:",
        &data.formatted_date(),
        anchors.date.x,
        current_y + anchors.date.nudge,
        width,
        &opts,
    );

    if !data.quote_title.trim().is_empty() {
        set_fill(content, PRIMARY_COLOR);
        let title_lines = wrap_text(
            &data.quote_title,
            &fonts.bold,
            anchors.title_size,
            anchors.narrative_width,
        );
        for (index, line) in title_lines.iter().enumerate() {
            draw_text(
                content,
                &fonts.bold,
                anchors.title_size,
                anchors.title.x,
                anchors.title.y - index as f32 * (anchors.title_size + 2.0),
                line,
            );
        }
    }

    draw_field(
        content,
        fonts,
        "Objetivo del servicio:",
        &data.service_goal,
        anchors.goal.x,
        anchors.goal.y,
        anchors.narrative_width,
        &FieldOptions {
            line_gap: anchors.goal_line_gap,
            ..FieldOptions::default()
        },
    );
    draw_field(
        content,
        fonts,
        "Lo que incluye el servicio:",
        &data.service_includes,
        anchors.includes.x,
        anchors.includes.y,
        anchors.narrative_width,
        &FieldOptions {
            line_gap: 0.0,
            ..FieldOptions::default()
        },
    );
}

/// Terms page: three narrative blocks at fixed offsets from the top.
fn draw_terms(
    content: &mut Content,
    fonts: &FontSet,
    data: &QuoteData,
    anchors: &TermsAnchors,
    page_height: f32,
) {
    let opts = FieldOptions::default();
    draw_field(
        content,
        fonts,
        "Tiempo de entrega:",
        &data.delivery_time,
        anchors.x,
        page_height - anchors.delivery_offset,
        anchors.width,
        &opts,
    );
    draw_field(
        content,
        fonts,
        "Bonus incluido:",
        &data.included_bonus,
        anchors.x,
        page_height - anchors.bonus_offset,
        anchors.width,
        &opts,
    );
    draw_field(
        content,
        fonts,
        "¿Por qué con nosotros?",
        &data.why_us,
        anchors.x,
        page_height - anchors.why_offset,
        anchors.width,
        &FieldOptions {
            line_gap: 0.0,
            ..FieldOptions::default()
        },
    );
}

/// Items page header: client block at the left, quote number and date on
/// the dark band at the right (hence the white fill).
fn draw_items_header(
    content: &mut Content,
    fonts: &FontSet,
    data: &QuoteData,
    anchors: &ItemsHeaderAnchors,
    page_width: f32,
    page_height: f32,
) {
    let right_x = page_width - anchors.right_inset;
    let base_y = page_height - anchors.top_offset;

    set_fill(content, PRIMARY_COLOR);
    draw_text(
        content,
        &fonts.bold,
        10.0,
        anchors.left_x,
        base_y + anchors.rise,
        &data.client_name,
    );
    draw_text(
        content,
        &fonts.regular,
        10.0,
        anchors.left_x,
        base_y - anchors.line_height,
        &data.contact,
    );

    set_fill(content, WHITE_COLOR);
    draw_text(
        content,
        &fonts.bold,
        8.0,
        right_x + anchors.number_indent,
        base_y + anchors.rise,
        &data.quote_number,
    );
    draw_text(
        content,
        &fonts.regular,
        10.0,
        right_x,
        base_y - anchors.line_height,
        &data.formatted_date(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;

    #[test]
    fn ensure_page_is_idempotent() {
        let template = Template::builtin();
        let fonts = FontSet::for_tests();
        let mut pages = PageSet::seed(&template, &fonts);
        assert_eq!(pages.page_count(), 3);

        pages.ensure_page(&template, &fonts, 2).unwrap();
        assert_eq!(pages.page_count(), 3);

        pages.ensure_page(&template, &fonts, 4).unwrap();
        assert_eq!(pages.page_count(), 5);
        pages.ensure_page(&template, &fonts, 4).unwrap();
        assert_eq!(pages.page_count(), 5);
    }

    #[test]
    fn seeded_pages_carry_template_dimensions() {
        let json = br#"{"pages": [{"role": "items", "width": 595, "height": 842}]}"#;
        let template = Template::from_slice(json).unwrap();
        let fonts = FontSet::for_tests();
        let pages = PageSet::seed(&template, &fonts);
        let bufs = pages.into_pages();
        assert_eq!(bufs.len(), 1);
        assert_eq!((bufs[0].width, bufs[0].height), (595.0, 842.0));
    }
}
