// Lenient parsing for the provider's inconsistently formatted date
// attributes.
//
// The provider emits dates in several shapes, sometimes within the same
// document: plain dates ("2019-06-03"), timestamps with an offset
// ("2019-06-03T23:22:15+00:00"), and empty strings where a value is simply
// absent. Each dated attribute declares which shapes it accepts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::DeserializationError;

/// Plain calendar date, e.g. `2019-06-03`.
pub const DATE: &str = "%Y-%m-%d";
/// Timestamp with a UTC offset, e.g. `2019-06-03T23:22:15+00:00`.
pub const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%:z";
/// Timestamp without an offset, e.g. `2019-06-03 23:22:15`.
pub const DATE_TIME_PLAIN: &str = "%Y-%m-%d %H:%M:%S";

/// A dated XML attribute together with the formats it accepts.
///
/// Formats are tried in declaration order; the first one that consumes the
/// whole value wins.
#[derive(Debug, Clone, Copy)]
pub struct DateField {
    name: &'static str,
    formats: &'static [&'static str],
}

impl DateField {
    pub const fn new(name: &'static str, formats: &'static [&'static str]) -> Self {
        Self { name, formats }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parse a raw attribute value.
    ///
    /// A missing attribute and an empty string both mean "no value" and
    /// yield `None`. A non-empty value that matches none of the accepted
    /// formats is an error, never a silent absence.
    pub fn parse(&self, raw: Option<&str>) -> Result<Option<NaiveDateTime>, DeserializationError> {
        let raw = match raw {
            None => return Ok(None),
            Some(value) if value.is_empty() => return Ok(None),
            Some(value) => value,
        };

        for format in self.formats {
            // Offset-carrying timestamps keep their local reading, which is
            // how the provider stamps its attributes.
            if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
                return Ok(Some(parsed.naive_local()));
            }
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return Ok(Some(parsed));
            }
            // Date-only formats pin the time of day to midnight, so the
            // result never depends on when parsing happens.
            if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
                return Ok(Some(parsed.and_time(NaiveTime::MIN)));
            }
        }

        Err(DeserializationError::new(self.name, raw, self.formats))
    }
}
