use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

/// One billable row of the quote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub price: f64,
}

/// A validated quote record, as produced by the form-collaborator side
/// (see `input`). The rendering core assumes the invariants already hold:
/// `items` is never empty, every `price` is positive, and
/// `discount_percentage` sits in [0, 100].
///
/// The JSON shape is camelCase to match the upstream form payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    pub client_name: String,
    pub contact: String,
    /// Opaque label generated upstream (e.g. `C26` + four random digits).
    #[serde(default)]
    pub quote_number: String,
    pub quote_date: Date,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub include_discount: bool,
    #[serde(default)]
    pub discount_percentage: f64,

    // Narrative fields, rendered verbatim. Blank ones render as a dash.
    #[serde(default)]
    pub quote_title: String,
    #[serde(default)]
    pub work_duration: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub service_goal: String,
    #[serde(default)]
    pub service_includes: String,
    #[serde(default)]
    pub delivery_time: String,
    #[serde(default)]
    pub included_bonus: String,
    #[serde(default)]
    pub why_us: String,
}

impl QuoteData {
    /// Quote date as `dd/MM/yyyy`, the format printed on every page role.
    pub fn formatted_date(&self) -> String {
        let format = format_description!("[day]/[month]/[year]");
        self.quote_date
            .format(&format)
            .expect("date has d/m/y components")
    }
}

/// Derived financial figures. Recomputed from `QuoteData` on every render,
/// never persisted (see `money::compute_totals`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub tax: f64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn date_renders_day_month_year() {
        let json = r#"{
            "clientName": "Acme",
            "contact": "Jo",
            "quoteDate": "2026-08-07",
            "items": [{"description": "Web", "price": 100.0}]
        }"#;
        let data: QuoteData = serde_json::from_str(json).unwrap();
        assert_eq!(data.quote_date, date!(2026 - 08 - 07));
        assert_eq!(data.formatted_date(), "07/08/2026");
    }

    #[test]
    fn camel_case_payload_fills_defaults() {
        let json = r#"{
            "clientName": "Acme Corp",
            "contact": "Jo Doe",
            "quoteDate": "2026-08-07",
            "items": [{"description": "Site redesign", "price": 1500.0}],
            "includeDiscount": true,
            "discountPercentage": 10,
            "serviceGoal": "Launch the new site"
        }"#;
        let data: QuoteData = serde_json::from_str(json).unwrap();
        assert_eq!(data.client_name, "Acme Corp");
        assert_eq!(data.items.len(), 1);
        assert!(data.include_discount);
        assert_eq!(data.discount_percentage, 10.0);
        assert_eq!(data.service_goal, "Launch the new site");
        assert!(data.quote_number.is_empty());
        assert!(data.delivery_time.is_empty());
    }
}
