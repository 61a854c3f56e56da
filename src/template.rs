//! Template asset model.
//!
//! A template supplies 1–3 fixed pages: their dimensions, the static
//! decoration painted onto every copy of the page (brand bands, rules,
//! static labels) and the anchor tables that pin dynamic content to the
//! page geometry. Templates load from a JSON description; the built-in
//! template reproduces the layout the anchors default to.
//!
//! Anchors are the one place template geometry lives: changing a template
//! means editing this data, not re-deriving coordinates in the renderer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const PRIMARY_COLOR: [u8; 3] = [43, 42, 76];
pub const TEXT_COLOR: [u8; 3] = [38, 38, 38];
pub const MUTED_COLOR: [u8; 3] = [90, 90, 90];
pub const WHITE_COLOR: [u8; 3] = [255, 255, 255];

/// What a template page is for. Dynamic content is dispatched by role;
/// the `Items` page is the one duplicated when the table overflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRole {
    Cover,
    Terms,
    Items,
}

/// Static decoration painted when a page is created from its template.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecorOp {
    Band {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: [u8; 3],
    },
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: [u8; 3],
    },
    Label {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: [u8; 3],
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePage {
    pub role: PageRole,
    #[serde(default = "default_page_width")]
    pub width: f32,
    #[serde(default = "default_page_height")]
    pub height: f32,
    #[serde(default)]
    pub decor: Vec<DecorOp>,
}

fn default_page_width() -> f32 {
    612.0
}

fn default_page_height() -> f32 {
    792.0
}

/// A chained field slot: x position plus a vertical nudge applied to the
/// running layout cursor before the field is drawn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAnchor {
    pub x: f32,
    pub nudge: f32,
}

impl Default for FieldAnchor {
    fn default() -> Self {
        FieldAnchor { x: 40.0, nudge: 0.0 }
    }
}

/// An absolutely positioned block.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct BlockAnchor {
    pub x: f32,
    pub y: f32,
}

/// Cover page: a chained client-detail column followed by two
/// absolutely anchored narrative blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverAnchors {
    /// First cursor position, measured down from the page top.
    pub top_offset: f32,
    /// Wrap width for the chained detail fields.
    pub detail_width: f32,
    pub client: FieldAnchor,
    pub work_duration: FieldAnchor,
    pub method: FieldAnchor,
    pub provider: FieldAnchor,
    pub date: FieldAnchor,
    pub title: BlockAnchor,
    pub title_size: f32,
    pub goal: BlockAnchor,
    pub goal_line_gap: f32,
    pub includes: BlockAnchor,
    pub narrative_width: f32,
}

impl Default for CoverAnchors {
    fn default() -> Self {
        CoverAnchors {
            top_offset: 167.0,
            detail_width: 440.0,
            client: FieldAnchor { x: 95.0, nudge: 4.0 },
            work_duration: FieldAnchor { x: 175.0, nudge: 5.0 },
            method: FieldAnchor { x: 95.0, nudge: 5.0 },
            provider: FieldAnchor { x: 115.0, nudge: 5.0 },
            date: FieldAnchor { x: 90.0, nudge: 6.0 },
            title: BlockAnchor { x: 40.0, y: 672.0 },
            title_size: 14.0,
            goal: BlockAnchor { x: 40.0, y: 460.0 },
            goal_line_gap: 20.0,
            includes: BlockAnchor { x: 40.0, y: 280.0 },
            narrative_width: 440.0,
        }
    }
}

/// Terms page: three narrative blocks at offsets measured from the top.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TermsAnchors {
    pub x: f32,
    pub width: f32,
    pub delivery_offset: f32,
    pub bonus_offset: f32,
    pub why_offset: f32,
}

impl Default for TermsAnchors {
    fn default() -> Self {
        TermsAnchors {
            x: 40.0,
            width: 440.0,
            delivery_offset: 165.0,
            bonus_offset: 246.0,
            why_offset: 355.0,
        }
    }
}

/// Items page header: client block at the left, quote number and date in
/// the band at the right.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemsHeaderAnchors {
    pub left_x: f32,
    /// Right column position, measured in from the page's right edge.
    pub right_inset: f32,
    pub top_offset: f32,
    pub line_height: f32,
    /// How far the top header line sits above the base position.
    pub rise: f32,
    /// Extra indent for the quote number within the right column.
    pub number_indent: f32,
}

impl Default for ItemsHeaderAnchors {
    fn default() -> Self {
        ItemsHeaderAnchors {
            left_x: 140.0,
            right_inset: 130.0,
            top_offset: 158.0,
            line_height: 18.0,
            rise: 20.0,
            number_indent: 5.0,
        }
    }
}

/// Item table region: vertical bounds, row granularity and the two columns.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableAnchors {
    /// Table top, measured down from the page top.
    pub start_offset: f32,
    /// Lowest y the cursor may reach; rows past capacity go to a new page.
    pub bottom_limit: f32,
    /// Minimum vertical space per row, also the rows-per-page granularity.
    pub row_gap: f32,
    /// Extra space between consecutive rows.
    pub row_spacing: f32,
    pub description_x: f32,
    pub description_width: f32,
    pub description_size: f32,
    pub description_line_height: f32,
    /// Right edge prices are aligned to.
    pub price_right_x: f32,
    pub price_size: f32,
}

impl Default for TableAnchors {
    fn default() -> Self {
        TableAnchors {
            start_offset: 340.0,
            bottom_limit: 210.0,
            row_gap: 18.0,
            row_spacing: 5.0,
            description_x: 85.0,
            description_width: 360.0,
            description_size: 10.0,
            description_line_height: 13.0,
            price_right_x: 505.0,
            price_size: 11.0,
        }
    }
}

/// Totals column on the last items page.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TotalsAnchors {
    pub label_x: f32,
    pub value_right_x: f32,
    pub start_y: f32,
    pub line_gap: f32,
    pub size: f32,
    pub emphasize_size: f32,
    pub note_y: f32,
    pub note_size: f32,
}

impl Default for TotalsAnchors {
    fn default() -> Self {
        TotalsAnchors {
            label_x: 310.0,
            value_right_x: 520.0,
            start_y: 201.0,
            line_gap: 18.0,
            size: 11.0,
            emphasize_size: 13.0,
            note_y: 125.0,
            note_size: 9.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anchors {
    pub cover: CoverAnchors,
    pub terms: TermsAnchors,
    pub items_header: ItemsHeaderAnchors,
    pub table: TableAnchors,
    pub totals: TotalsAnchors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub pages: Vec<TemplatePage>,
    #[serde(default)]
    pub anchors: Anchors,
}

impl Template {
    /// Load and validate a JSON template description. Any failure here is
    /// the fatal "asset unavailable" case: generation aborts before a
    /// single page is drawn.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Template(format!("cannot read template {}: {e}", path.display()))
        })?;
        Template::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let template: Template = serde_json::from_slice(bytes)?;
        template.validate()?;
        Ok(template)
    }

    /// The programmatically drawn default layout, matching the geometry the
    /// anchor defaults assume (US Letter, dark header bands, two-column
    /// item table headings).
    pub fn builtin() -> Self {
        let band = |color| DecorOp::Band {
            x: 0.0,
            y: 732.0,
            width: 612.0,
            height: 60.0,
            color,
        };
        let heading = |text: &str, size: f32| DecorOp::Label {
            text: text.to_string(),
            x: 40.0,
            y: 752.0,
            size,
            bold: true,
            color: WHITE_COLOR,
        };
        let footer_rule = DecorOp::Rule {
            x: 40.0,
            y: 60.0,
            width: 532.0,
            thickness: 0.75,
            color: MUTED_COLOR,
        };

        Template {
            pages: vec![
                TemplatePage {
                    role: PageRole::Cover,
                    width: 612.0,
                    height: 792.0,
                    decor: vec![
                        band(PRIMARY_COLOR),
                        heading("COTIZACIÓN", 20.0),
                        footer_rule.clone(),
                    ],
                },
                TemplatePage {
                    role: PageRole::Terms,
                    width: 612.0,
                    height: 792.0,
                    decor: vec![
                        band(PRIMARY_COLOR),
                        heading("CONDICIONES DEL SERVICIO", 16.0),
                        footer_rule.clone(),
                    ],
                },
                TemplatePage {
                    role: PageRole::Items,
                    width: 612.0,
                    height: 792.0,
                    decor: vec![
                        band(PRIMARY_COLOR),
                        heading("DETALLE DE COTIZACIÓN", 16.0),
                        // Band behind the white quote number / date column.
                        DecorOp::Band {
                            x: 360.0,
                            y: 600.0,
                            width: 252.0,
                            height: 70.0,
                            color: PRIMARY_COLOR,
                        },
                        DecorOp::Label {
                            text: "Descripción".to_string(),
                            x: 85.0,
                            y: 470.0,
                            size: 10.0,
                            bold: true,
                            color: PRIMARY_COLOR,
                        },
                        DecorOp::Label {
                            text: "Precio".to_string(),
                            x: 460.0,
                            y: 470.0,
                            size: 10.0,
                            bold: true,
                            color: PRIMARY_COLOR,
                        },
                        DecorOp::Rule {
                            x: 85.0,
                            y: 464.0,
                            width: 420.0,
                            thickness: 0.75,
                            color: PRIMARY_COLOR,
                        },
                        footer_rule,
                    ],
                },
            ],
            anchors: Anchors::default(),
        }
    }

    /// The page duplicated when the item table overflows.
    pub fn items_page(&self) -> Option<&TemplatePage> {
        self.pages.iter().find(|p| p.role == PageRole::Items)
    }

    pub fn page_index(&self, role: PageRole) -> Option<usize> {
        self.pages.iter().position(|p| p.role == role)
    }

    /// Static label texts, collected for font subsetting.
    pub(crate) fn label_texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| {
            page.decor.iter().filter_map(|op| match op {
                DecorOp::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }

    fn validate(&self) -> Result<(), Error> {
        if self.pages.is_empty() || self.pages.len() > 3 {
            return Err(Error::Template(format!(
                "template must have 1-3 pages, found {}",
                self.pages.len()
            )));
        }
        for page in &self.pages {
            if page.width <= 0.0 || page.height <= 0.0 {
                return Err(Error::Template(format!(
                    "non-positive page dimensions {}x{}",
                    page.width, page.height
                )));
            }
        }
        for role in [PageRole::Cover, PageRole::Terms, PageRole::Items] {
            if self.pages.iter().filter(|p| p.role == role).count() > 1 {
                return Err(Error::Template(format!("duplicate {role:?} page")));
            }
        }
        match self.page_index(PageRole::Items) {
            None => Err(Error::Template("template has no items page".to_string())),
            // Continuation pages are appended at the document end, so the
            // items page must already be the last template page.
            Some(i) if i != self.pages.len() - 1 => Err(Error::Template(
                "items page must be the last template page".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_template_is_valid() {
        let template = Template::builtin();
        assert!(template.validate().is_ok());
        assert_eq!(template.pages.len(), 3);
        assert_eq!(template.page_index(PageRole::Items), Some(2));
    }

    #[test]
    fn json_description_round_trips() {
        let template = Template::builtin();
        let json = serde_json::to_vec(&template).unwrap();
        let back = Template::from_slice(&json).unwrap();
        assert_eq!(back.pages.len(), 3);
        assert_eq!(back.anchors.table.row_gap, 18.0);
    }

    #[test]
    fn single_items_page_template_is_accepted() {
        let json = br#"{"pages": [{"role": "items"}]}"#;
        let template = Template::from_slice(json).unwrap();
        assert_eq!(template.pages[0].width, 612.0);
        assert_eq!(template.pages[0].height, 792.0);
    }

    #[test]
    fn missing_items_page_is_fatal() {
        let json = br#"{"pages": [{"role": "cover"}]}"#;
        assert!(matches!(
            Template::from_slice(json),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn items_page_must_come_last() {
        let json = br#"{"pages": [{"role": "items"}, {"role": "cover"}]}"#;
        assert!(matches!(
            Template::from_slice(json),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn anchor_overrides_merge_with_defaults() {
        let json = br#"{
            "pages": [{"role": "items", "width": 595, "height": 842}],
            "anchors": {"table": {"rowGap": 24}}
        }"#;
        let template = Template::from_slice(json).unwrap();
        assert_eq!(template.anchors.table.row_gap, 24.0);
        assert_eq!(template.anchors.table.bottom_limit, 210.0);
        assert_eq!(template.anchors.totals.start_y, 201.0);
    }
}
