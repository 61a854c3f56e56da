mod config;
mod error;
mod fonts;
mod input;
mod model;
mod money;
mod pdf;
pub mod template;

pub use config::{CurrencyConfig, DEFAULT_TAX_RATE, DocumentConfig};
pub use error::Error;
#[cfg(feature = "cli")]
pub use input::generate_quote_number;
pub use input::{quote_from_file, quote_from_slice, validate};
pub use model::{LineItem, QuoteData, Totals};
pub use money::{TotalsRow, compute_totals, discount_note, format_amount, totals_rows};
pub use template::{PageRole, Template};

use std::path::Path;
use std::time::Instant;

/// Render a quote document and return its bytes. Either the document is
/// complete or this returns an error and no bytes exist; delivery of the
/// bytes (download, disk, ...) is the caller's concern.
pub fn generate_quote_pdf(data: &QuoteData, config: &DocumentConfig) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(data, config)?;

    log::info!(
        "Timing: render={:.1}ms (output {} bytes)",
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(bytes)
}

/// Render a quote document and write it to `output`.
pub fn generate_quote_to_file(
    data: &QuoteData,
    config: &DocumentConfig,
    output: &Path,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(data, config)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

/// Delivery filename derived from the quote's opaque identifier.
pub fn default_output_name(data: &QuoteData) -> String {
    format!("quote-{}.pdf", data.quote_number)
}
