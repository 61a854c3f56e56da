use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use quotegen_pdf::{DocumentConfig, Error};

/// Generate a multi-page quote PDF from a JSON quote record.
#[derive(Parser)]
#[command(name = "quotegen-pdf", version)]
struct Args {
    /// JSON file with the quote data (camelCase form payload).
    input: PathBuf,

    /// Output PDF path. Defaults to quote-<quoteNumber>.pdf.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON document config: tax rate, currency, template, fonts.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(output) => {
            println!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, Error> {
    let mut data = quotegen_pdf::quote_from_file(&args.input)?;
    if data.quote_number.is_empty() {
        data.quote_number = quotegen_pdf::generate_quote_number();
        log::debug!("generated quote number {}", data.quote_number);
    }

    let config = match &args.config {
        Some(path) => DocumentConfig::from_file(path)?,
        None => DocumentConfig::default(),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(quotegen_pdf::default_output_name(&data)));

    quotegen_pdf::generate_quote_to_file(&data, &config, &output)?;
    Ok(output)
}
