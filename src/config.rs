use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::template::Template;

/// Currency presentation: ISO code, printed symbol and separators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrencyConfig {
    pub code: String,
    pub symbol: String,
    pub thousands_sep: char,
    pub decimal_sep: char,
}

impl CurrencyConfig {
    /// Guatemalan quetzal, printed as `Q1,234.50`.
    pub fn gtq() -> Self {
        CurrencyConfig {
            code: "GTQ".to_string(),
            symbol: "Q".to_string(),
            thousands_sep: ',',
            decimal_sep: '.',
        }
    }

    /// Mexican peso, printed as `$1,234.50`.
    pub fn mxn() -> Self {
        CurrencyConfig {
            code: "MXN".to_string(),
            symbol: "$".to_string(),
            thousands_sep: ',',
            decimal_sep: '.',
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        CurrencyConfig::gtq()
    }
}

/// Generation parameters that the source hard-coded per variant: tax rate,
/// currency, which template to lay out against, and optionally a custom
/// regular/bold font pair to embed instead of the base-14 Helvetica.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Tax charged on the discounted subtotal. Defaults to [`DEFAULT_TAX_RATE`].
    pub tax_rate: Option<f64>,
    pub currency: CurrencyConfig,
    /// Path to a JSON template description. `None` uses the built-in layout.
    pub template: Option<PathBuf>,
    /// TTF/OTF files embedded as the document's regular and bold faces.
    /// Both must be set together; with neither set, Helvetica is used.
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

/// IVA rate of the primary variant; the 0.16 variant is reached via config.
pub const DEFAULT_TAX_RATE: f64 = 0.12;

impl DocumentConfig {
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(Error::Io)?;
        let config: DocumentConfig = serde_json::from_slice(&bytes)?;
        Ok(config)
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate.unwrap_or(DEFAULT_TAX_RATE)
    }

    /// Acquire the template asset. This is the single fallible I/O step
    /// before any drawing starts; a missing or malformed template aborts
    /// generation here.
    pub(crate) fn load_template(&self) -> Result<Template, Error> {
        match &self.template {
            Some(path) => Template::from_path(path),
            None => Ok(Template::builtin()),
        }
    }
}
