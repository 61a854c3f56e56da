use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::config::DocumentConfig;
use crate::error::Error;

/// A registered font: its PDF resource name, the indirect reference, and
/// the metrics needed to measure text before drawing it.
pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    /// WinAnsi widths at 1000 units/em for bytes 32..=255.
    widths_1000: Vec<f32>,
    /// Present for embedded CIDFonts: remapped glyph ids per char.
    char_to_gid: Option<HashMap<char, u16>>,
    char_widths_1000: Option<HashMap<char, f32>>,
}

impl FontEntry {
    fn char_width_1000(&self, ch: char) -> f32 {
        if let Some(ref map) = self.char_widths_1000
            && let Some(&w) = map.get(&ch)
        {
            return w;
        }
        match char_to_winansi(ch) {
            Some(byte) if byte >= 32 => self.widths_1000[(byte - 32) as usize],
            _ => 0.0,
        }
    }

    /// Measured width of `text` at `font_size`, spaces included. Monotonic
    /// in the text: appending characters never shrinks the width, which is
    /// what the greedy wrapper depends on.
    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Encode text for a content stream `Str` operand: 2-byte glyph ids for
    /// embedded CIDFonts, WinAnsi bytes for the base-14 fonts.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = map.get(&ch).copied().unwrap_or(0);
                    out.push((gid >> 8) as u8);
                    out.push((gid & 0xFF) as u8);
                }
                out
            }
            None => to_winansi_bytes(text),
        }
    }
}

/// The document's regular/bold pair. Every piece of dynamic and template
/// content draws with one of these two.
pub(crate) struct FontSet {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
}

#[cfg(test)]
impl FontEntry {
    /// Unregistered Helvetica-metric entry for layout tests.
    pub(crate) fn for_tests(font_ref: Ref) -> Self {
        FontEntry {
            pdf_name: "F1".to_string(),
            font_ref,
            widths_1000: helvetica_widths(),
            char_to_gid: None,
            char_widths_1000: None,
        }
    }
}

#[cfg(test)]
impl FontSet {
    pub(crate) fn for_tests() -> Self {
        FontSet {
            regular: FontEntry::for_tests(Ref::new(1)),
            bold: FontEntry::for_tests(Ref::new(2)),
        }
    }
}

/// Register the document fonts up front. This is the one fallible resource
/// step besides template acquisition: a configured font that cannot be read
/// or parsed aborts generation here, before any page exists.
pub(crate) fn register_fonts(
    pdf: &mut Pdf,
    config: &DocumentConfig,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontSet, Error> {
    match (&config.font_regular, &config.font_bold) {
        (Some(regular), Some(bold)) => {
            let regular = embed_font_file(pdf, regular, "F1", used_chars, alloc)?;
            let bold = embed_font_file(pdf, bold, "F2", used_chars, alloc)?;
            Ok(FontSet { regular, bold })
        }
        (None, None) => Ok(FontSet {
            regular: register_builtin(pdf, b"Helvetica", "F1", alloc),
            bold: register_builtin(pdf, b"Helvetica-Bold", "F2", alloc),
        }),
        _ => Err(Error::Font(
            "fontRegular and fontBold must be configured together".to_string(),
        )),
    }
}

/// Base-14 Type1 font with WinAnsi encoding and approximate metrics.
fn register_builtin(
    pdf: &mut Pdf,
    base_font: &[u8],
    pdf_name: &str,
    alloc: &mut impl FnMut() -> Ref,
) -> FontEntry {
    let font_ref = alloc();
    pdf.type1_font(font_ref)
        .base_font(Name(base_font))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        pdf_name: pdf_name.to_string(),
        font_ref,
        widths_1000: helvetica_widths(),
        char_to_gid: None,
        char_widths_1000: None,
    }
}

fn embed_font_file(
    pdf: &mut Pdf,
    path: &Path,
    pdf_name: &str,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontEntry, Error> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Font(format!("cannot read font {}: {e}", path.display())))?;
    let t0 = std::time::Instant::now();
    let entry = embed_truetype(pdf, &data, path, pdf_name, used_chars, alloc)?;
    log::debug!(
        "embed_truetype: {} → {:.1}ms",
        path.display(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(entry)
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with
/// Identity-H encoding, subsetted to the glyphs the document uses.
fn embed_truetype(
    pdf: &mut Pdf,
    font_data: &[u8],
    path: &Path,
    pdf_name: &str,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<FontEntry, Error> {
    let face = Face::parse(font_data, 0)
        .map_err(|e| Error::Font(format!("cannot parse font {}: {e}", path.display())))?;

    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    // WinAnsi widths kept as the measurement fallback for chars that were
    // not in used_chars at registration time.
    let widths_1000: Vec<f32> = (32u8..=255u8)
        .map(|byte| {
            face.glyph_index(winansi_to_char(byte))
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0)
        })
        .collect();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut char_widths_1000 = HashMap::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            char_widths_1000.insert(ch, w);
        }
    }

    let subset_data = subsetter::subset(font_data, 0, &remapper).unwrap_or_else(|e| {
        log::warn!(
            "Font subsetting failed for {}: {e} — embedding full font",
            path.display()
        );
        font_data.to_vec()
    });

    let font_ref = alloc();
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Font(format!("font {} too large to embed", path.display())))?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = postscript_name(&face, path);

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = char_to_gid
            .iter()
            .filter_map(|(&ch, &new_gid)| char_widths_1000.get(&ch).map(|&w| (new_gid, w)))
            .collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{}-UTF16", ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(FontEntry {
        pdf_name: pdf_name.to_string(),
        font_ref,
        widths_1000,
        char_to_gid: Some(char_to_gid),
        char_widths_1000: Some(char_widths_1000),
    })
}

/// PostScript name from the face's family name, falling back to the file
/// stem. Spaces are stripped either way.
fn postscript_name(face: &Face, path: &Path) -> String {
    let family = face.names().into_iter().find_map(|name| {
        if name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode() {
            name.to_string()
        } else {
            None
        }
    });
    let base = family.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Embedded")
            .to_string()
    });
    base.replace(' ', "")
}

/// Windows-1252 (WinAnsi) byte to Unicode char. Bytes 0x80-0x9F are
/// remapped; all others map directly to their codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Unicode char to its WinAnsi byte, or None if unmappable.
fn char_to_winansi(c: char) -> Option<u8> {
    match c as u32 {
        0x0020..=0x007F => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8),
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes for PDF Str encoding.
/// Unmappable characters are dropped.
fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(char_to_winansi).collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}
