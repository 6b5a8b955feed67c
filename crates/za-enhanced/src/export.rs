//! Parsed CSV exports.

use std::collections::HashMap;

use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Rows of a CSV export, keyed by the header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportedRows {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

impl ExportedRows {
    /// Parse CSV text. Empty text yields no headers and no rows.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row at `index`.
    pub fn get(&self, index: usize) -> Option<Row<'_>> {
        self.records.get(index).map(|record| Row {
            headers: &self.headers,
            record,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(|record| Row {
            headers: &self.headers,
            record,
        })
    }

    /// Deserialize every row into `T`, matching fields by header name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .map(|record| record.deserialize::<T>(Some(&self.headers)).map_err(Into::into))
            .collect()
    }
}

/// One exported row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.record.get(index)
    }

    /// Value at a column position.
    pub fn at(&self, index: usize) -> Option<&'a str> {
        self.record.get(index)
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .zip(self.record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }
}
