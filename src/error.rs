// Error types for the client.

use thiserror::Error;

/// Errors surfaced to callers of the client.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure: connection, timeout, non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded as XML of the expected
    /// shape. Raised by the XML framework before any of our own
    /// validation runs.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The request document could not be written out as XML.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// A value survived XML decoding but failed our validation.
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// The provider answered with an error document instead of the
    /// expected response.
    #[error("provider error {code}: {message}")]
    Api { code: String, message: String },
}

/// A dated attribute held a non-empty value matching none of the formats
/// declared for it.
///
/// Kept as its own type, distinct from [`Error::Xml`], so callers can
/// tell our validation apart from framework failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to deserialize {field}=\"{value}\": expected the {expected} format")]
pub struct DeserializationError {
    field: &'static str,
    value: String,
    expected: String,
}

impl DeserializationError {
    pub(crate) fn new(field: &'static str, value: &str, formats: &[&str]) -> Self {
        Self {
            field,
            value: value.to_string(),
            expected: formats.join(" or "),
        }
    }

    /// Name of the XML attribute that failed to parse.
    pub fn field(&self) -> &str {
        self.field
    }

    /// The raw attribute value as it arrived.
    pub fn value(&self) -> &str {
        &self.value
    }
}
