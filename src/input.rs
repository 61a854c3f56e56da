//! The form-collaborator side of the pipeline: parse a JSON quote payload
//! and establish the invariants the rendering core assumes. The core
//! itself never re-validates.

use std::path::Path;

use crate::error::Error;
use crate::model::QuoteData;

pub fn quote_from_file(path: &Path) -> Result<QuoteData, Error> {
    let bytes = std::fs::read(path).map_err(Error::Io)?;
    quote_from_slice(&bytes)
}

pub fn quote_from_slice(bytes: &[u8]) -> Result<QuoteData, Error> {
    let mut data: QuoteData = serde_json::from_slice(bytes)?;
    validate(&mut data)?;
    Ok(data)
}

/// Check the hard invariants and normalize the rest: required strings
/// non-empty, at least one item, positive prices, discount percentage
/// clamped into [0, 100]. The quote number is opaque and may be empty
/// here; callers fill it in before delivery.
pub fn validate(data: &mut QuoteData) -> Result<(), Error> {
    if data.client_name.trim().is_empty() {
        return Err(Error::Input("clientName is required".to_string()));
    }
    if data.contact.trim().is_empty() {
        return Err(Error::Input("contact is required".to_string()));
    }
    if data.items.is_empty() {
        return Err(Error::Input("at least one line item is required".to_string()));
    }
    for (index, item) in data.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(Error::Input(format!(
                "item {} has an empty description",
                index + 1
            )));
        }
        if !(item.price > 0.0) {
            return Err(Error::Input(format!(
                "item {} must have a positive price",
                index + 1
            )));
        }
    }
    if !data.discount_percentage.is_finite() {
        return Err(Error::Input("discountPercentage must be a number".to_string()));
    }
    data.discount_percentage = data.discount_percentage.clamp(0.0, 100.0);
    Ok(())
}

/// Quote numbers are minted where the form would mint them: a `C` prefix,
/// the two-digit year, and four random digits.
#[cfg(feature = "cli")]
pub fn generate_quote_number() -> String {
    use rand::Rng;
    let year = time::OffsetDateTime::now_utc().year() % 100;
    let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
    format!("C{year:02}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Vec<u8> {
        br#"{
            "clientName": "Acme Corp",
            "contact": "Jo Doe",
            "quoteDate": "2026-08-07",
            "items": [{"description": "Sitio web", "price": 1500.0}],
            "includeDiscount": true,
            "discountPercentage": 250
        }"#
        .to_vec()
    }

    #[test]
    fn discount_is_clamped_into_range() {
        let data = quote_from_slice(&payload()).unwrap();
        assert_eq!(data.discount_percentage, 100.0);
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let json = br#"{
            "clientName": "Acme",
            "contact": "Jo",
            "quoteDate": "2026-08-07",
            "items": []
        }"#;
        assert!(matches!(quote_from_slice(json), Err(Error::Input(_))));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let json = br#"{
            "clientName": "Acme",
            "contact": "Jo",
            "quoteDate": "2026-08-07",
            "items": [{"description": "Sitio web", "price": 0.0}]
        }"#;
        assert!(matches!(quote_from_slice(json), Err(Error::Input(_))));
    }

    #[test]
    fn malformed_json_surfaces_as_json_error() {
        assert!(matches!(
            quote_from_slice(b"{not json"),
            Err(Error::Json(_))
        ));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn quote_number_has_prefix_year_and_four_digits() {
        let number = generate_quote_number();
        assert_eq!(number.len(), 7);
        assert!(number.starts_with('C'));
        assert!(number[1..].chars().all(|c| c.is_ascii_digit()));
        let suffix: u32 = number[3..].parse().unwrap();
        assert!((1000..10000).contains(&suffix));
    }
}
