//! Record extraction from rendered listing pages
//!
//! A listing page is a sequence of heading/body element pairs. The heading
//! names the company; the body is free text such as
//!
//! ```text
//! Final Dividend of Kes.2.50 on 01-Jan-2024. Books Closure 05-Feb-2024.
//! Payment Date; 01-Mar-2024
//! ```
//!
//! Each field is pulled out with its own pattern so that one missing field
//! never drops the rest of the record.

use crate::config::ExtractorConfig;
use crate::crawler::record::{PageBatch, PageRecord};
use crate::{ConfigError, DataError};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

/// Day-month-year as printed in listings, e.g. `01-Jan-2024`
const DATE_PATTERN: &str = r"(\d{1,2}-[A-Za-z]+-\d{2,4})";

/// Compiled field patterns
#[derive(Debug, Clone)]
struct FieldPatterns {
    amount: Regex,
    announce_date: Regex,
    closure_date: Regex,
    payment_date: Regex,
}

impl FieldPatterns {
    fn new(currency_label: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            amount: Regex::new(&format!(
                r"Dividend of {}\s*(\d{{1,3}}(?:,\d{{3}})+(?:\.\d+)?|\d+(?:\.\d+)?)",
                regex::escape(currency_label)
            ))?,
            announce_date: Regex::new(&format!(r"\bon {}", DATE_PATTERN))?,
            closure_date: Regex::new(&format!(r"Books Closure:?\s*{}", DATE_PATTERN))?,
            payment_date: Regex::new(&format!(r"Payment Date[;:]\s*{}", DATE_PATTERN))?,
        })
    }
}

/// Turns one page's rendered markup into a [`PageBatch`]
///
/// Pure: no I/O and no state between calls.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    heading: Selector,
    body_tag: String,
    patterns: FieldPatterns,
}

impl RecordExtractor {
    /// Builds an extractor for the configured markup shape
    ///
    /// # Returns
    ///
    /// * `Ok(RecordExtractor)` - Selectors and patterns compiled
    /// * `Err(ConfigError)` - The heading tag or currency label cannot be compiled
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let heading = Selector::parse(&config.heading_tag).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid heading tag '{}': {:?}",
                config.heading_tag, e
            ))
        })?;

        let patterns = FieldPatterns::new(&config.currency_label).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid currency label '{}': {}",
                config.currency_label, e
            ))
        })?;

        Ok(Self {
            heading,
            body_tag: config.body_tag.to_ascii_lowercase(),
            patterns,
        })
    }

    /// Extracts all records from raw page content
    ///
    /// # Returns
    ///
    /// * `Ok(PageBatch)` - Records in document order (possibly empty)
    /// * `Err(DataError)` - The content is not valid UTF-8
    pub fn extract(&self, content: &[u8]) -> Result<PageBatch, DataError> {
        let html = std::str::from_utf8(content)?;
        Ok(self.extract_str(html))
    }

    /// Extracts all records from already-decoded markup
    pub fn extract_str(&self, html: &str) -> PageBatch {
        let document = Html::parse_document(html);
        let mut batch = PageBatch::new();

        for heading in document.select(&self.heading) {
            let subject = normalize_text(heading);

            // Only the immediately following element counts as the body
            let Some(body) = heading.next_siblings().find_map(ElementRef::wrap) else {
                tracing::trace!("Heading '{}' has no following element", subject);
                continue;
            };
            if body.value().name() != self.body_tag {
                tracing::trace!(
                    "Heading '{}' is followed by <{}>, not <{}>",
                    subject,
                    body.value().name(),
                    self.body_tag
                );
                continue;
            }

            batch.push(self.parse_entry(subject, &normalize_text(body)));
        }

        batch
    }

    /// Parses one entry's body text into a record
    fn parse_entry(&self, subject: String, text: &str) -> PageRecord {
        PageRecord {
            subject,
            amount: parse_amount(&self.patterns.amount, text),
            announce_date: capture(&self.patterns.announce_date, text).and_then(parse_listing_date),
            closure_date: capture(&self.patterns.closure_date, text).and_then(parse_listing_date),
            payment_date: capture(&self.patterns.payment_date, text).and_then(parse_listing_date),
        }
    }
}

/// Collects an element's text with runs of whitespace collapsed
fn normalize_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads the dividend amount, dropping thousands separators
///
/// A number that runs on into further digits or separators the pattern
/// could not consume (`1,25`, `1,2500`) is unknown rather than truncated.
fn parse_amount(pattern: &Regex, text: &str) -> Option<Decimal> {
    let matched = pattern.captures(text)?.get(1)?;
    let mut rest = text[matched.end()..].chars();
    match (rest.next(), rest.next()) {
        (Some(c), _) if c.is_ascii_digit() => return None,
        (Some(','), Some(c)) if c.is_ascii_digit() => return None,
        _ => {}
    }
    Decimal::from_str(&matched.as_str().replace(',', "")).ok()
}

fn capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses `01-Jan-2024`, `01-January-2024` or `01-Jan-24`
///
/// Returns None for anything else, including impossible dates such as
/// `31-Feb-2024`.
pub fn parse_listing_date(text: &str) -> Option<NaiveDate> {
    let year_digits = text.rsplit('-').next().map(str::len).unwrap_or(0);
    let formats: &[&str] = match year_digits {
        2 => &["%d-%b-%y", "%d-%B-%y"],
        4 => &["%d-%b-%Y", "%d-%B-%Y"],
        _ => return None,
    };

    let parsed = formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok());
    if parsed.is_none() {
        tracing::debug!("Unrecognised date '{}'", text);
    }
    parsed
}
