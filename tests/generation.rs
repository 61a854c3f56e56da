mod common;

use quotegen_pdf::{DocumentConfig, Error, generate_quote_pdf, generate_quote_to_file};

#[test]
fn three_template_pages_for_a_short_quote() {
    let data = common::sample_quote(3);
    let bytes = generate_quote_pdf(&data, &DocumentConfig::default()).unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(common::page_count(&bytes), 3);
}

#[test]
fn overflowing_item_table_provisions_continuation_pages() {
    // Default geometry fits 13 single-line rows per page; 20 items need a
    // second items page on top of the three template pages.
    let data = common::sample_quote(20);
    let bytes = generate_quote_pdf(&data, &DocumentConfig::default()).unwrap();
    assert_eq!(common::page_count(&bytes), 4);

    // 27 items: exactly one more full page plus one spill row.
    let data = common::sample_quote(27);
    let bytes = generate_quote_pdf(&data, &DocumentConfig::default()).unwrap();
    assert_eq!(common::page_count(&bytes), 5);
}

#[test]
fn identical_input_produces_identical_bytes() {
    let data = common::sample_quote(8);
    let config = DocumentConfig::default();
    let first = generate_quote_pdf(&data, &config).unwrap();
    let second = generate_quote_pdf(&data, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn discount_changes_rendered_content() {
    let mut data = common::sample_quote(2);
    let config = DocumentConfig::default();
    let plain = generate_quote_pdf(&data, &config).unwrap();

    data.include_discount = true;
    data.discount_percentage = 10.0;
    let discounted = generate_quote_pdf(&data, &config).unwrap();

    assert_eq!(common::page_count(&plain), common::page_count(&discounted));
    assert_ne!(plain, discounted);
}

#[test]
fn custom_single_page_template_is_honored() {
    let template_json = serde_json::json!({
        "pages": [{"role": "items", "width": 595.0, "height": 842.0}],
    });
    let template_path = common::scratch_path("single-page-template.json");
    std::fs::write(&template_path, serde_json::to_vec(&template_json).unwrap()).unwrap();

    let config = DocumentConfig {
        template: Some(template_path.clone()),
        ..DocumentConfig::default()
    };

    let bytes = generate_quote_pdf(&common::sample_quote(2), &config).unwrap();
    assert_eq!(common::page_count(&bytes), 1);

    // The taller page region fits more rows, but a large quote still
    // spills onto provisioned copies of the single template page.
    let bytes = generate_quote_pdf(&common::sample_quote(40), &config).unwrap();
    assert!(common::page_count(&bytes) > 1);

    std::fs::remove_file(&template_path).ok();
}

#[test]
fn missing_template_asset_aborts_before_output() {
    let config = DocumentConfig {
        template: Some(common::scratch_path("no-such-template.json")),
        ..DocumentConfig::default()
    };
    let output = common::scratch_path("should-not-exist.pdf");

    let result = generate_quote_to_file(&common::sample_quote(1), &config, &output);
    assert!(matches!(result, Err(Error::Template(_))));
    assert!(!output.exists(), "no partial document may be written");
}

#[test]
fn generated_file_matches_default_name_contract() {
    let data = common::sample_quote(1);
    assert_eq!(
        quotegen_pdf::default_output_name(&data),
        "quote-C261234.pdf"
    );

    let output = common::scratch_path(&quotegen_pdf::default_output_name(&data));
    generate_quote_to_file(&data, &DocumentConfig::default(), &output).unwrap();
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    std::fs::remove_file(&output).ok();
}

#[test]
fn misconfigured_font_pair_is_fatal() {
    let config = DocumentConfig {
        font_regular: Some(common::scratch_path("only-regular.ttf")),
        ..DocumentConfig::default()
    };
    let result = generate_quote_pdf(&common::sample_quote(1), &config);
    assert!(matches!(result, Err(Error::Font(_))));
}
