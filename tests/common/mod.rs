use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use quotegen_pdf::QuoteData;

/// A complete quote payload with `n` line items, parsed through the same
/// input path the CLI uses.
pub fn sample_quote(n: usize) -> QuoteData {
    let items: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "description": format!("Servicio {} de diseño y desarrollo", i + 1),
                "price": 100.0 + i as f64,
            })
        })
        .collect();
    let payload = serde_json::json!({
        "quoteTitle": "Propuesta de Rediseño Web",
        "quoteNumber": "C261234",
        "quoteDate": "2026-08-07",
        "clientName": "Acme Corp",
        "contact": "Jo Doe",
        "workDuration": "2 semanas",
        "method": "Remoto",
        "provider": "Creati Solutions",
        "serviceGoal": "Rediseñar el sitio corporativo para mejorar la conversión",
        "serviceIncludes": "Diseño, desarrollo, pruebas y despliegue",
        "deliveryTime": "5 días hábiles",
        "includedBonus": "Un mes de soporte sin costo",
        "whyUs": "Experiencia comprobada en proyectos similares",
        "items": items,
        "includeDiscount": false,
        "discountPercentage": 0,
    });
    quotegen_pdf::quote_from_slice(&serde_json::to_vec(&payload).unwrap())
        .expect("sample payload is valid")
}

/// Number of page objects in the document: `/Page` name tokens that are
/// not the `/Pages` tree node.
pub fn page_count(bytes: &[u8]) -> usize {
    let needle: &[u8] = b"/Page";
    bytes
        .windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique scratch path for tests that touch the filesystem.
pub fn scratch_path(name: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "quotegen-test-{}-{id}-{name}",
        std::process::id()
    ))
}
