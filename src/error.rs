use std::fmt;

/// Failures surfaced by quote generation.
///
/// Everything here is fatal to the generation call that produced it: either
/// the document is rendered completely or the caller gets one of these and
/// no bytes at all.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    Io(std::io::Error),
    /// A JSON payload (quote data, config or template) could not be parsed.
    Json(serde_json::Error),
    /// The quote data violates an input invariant (empty client name,
    /// no line items, non-positive price, ...).
    Input(String),
    /// The template asset is unavailable or misconfigured.
    Template(String),
    /// A configured font could not be parsed or embedded.
    Font(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Json(e) => write!(f, "invalid json: {e}"),
            Error::Input(msg) => write!(f, "invalid quote data: {msg}"),
            Error::Template(msg) => write!(f, "template error: {msg}"),
            Error::Font(msg) => write!(f, "font error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
