//! Record types produced by the listing flow

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One dividend announcement extracted from a listing entry
///
/// Every field except the subject may be unknown (`None`) when its pattern
/// did not match the entry's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Company or subject the announcement is about
    pub subject: String,

    /// Dividend amount per share
    pub amount: Option<Decimal>,

    pub announce_date: Option<NaiveDate>,

    /// Books closure (record) date
    pub closure_date: Option<NaiveDate>,

    pub payment_date: Option<NaiveDate>,
}

/// Key under which two records count as the same economic event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub subject: String,
    pub announce_date: Option<NaiveDate>,
}

impl PageRecord {
    /// Creates a record with every optional field unknown
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            amount: None,
            announce_date: None,
            closure_date: None,
            payment_date: None,
        }
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            subject: self.subject.clone(),
            announce_date: self.announce_date,
        }
    }
}

/// Records from one rendered page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageBatch {
    records: Vec<PageRecord>,
}

impl PageBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }
}

impl From<Vec<PageRecord>> for PageBatch {
    fn from(records: Vec<PageRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for PageBatch {
    type Item = PageRecord;
    type IntoIter = std::vec::IntoIter<PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Deduplicated records accumulated across all pages, in first-seen order
///
/// Only the aggregator appends to a dataset, which is what keeps identity
/// keys unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<PageRecord>,
}

impl Dataset {
    pub(crate) fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PageRecord> {
        self.records
    }
}
