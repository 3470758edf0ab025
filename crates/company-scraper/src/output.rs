// Copyright 2026 Company Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! Record output.
//!
//! Records are printed as JSON indented with four spaces. Stdout carries
//! nothing else; logs go to stderr.

use crate::error::ScrapeError;
use crate::extraction::CompanyRecord;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// Destination for successfully extracted records.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &CompanyRecord) -> Result<(), ScrapeError>;
}

/// Render a record the way it is printed.
pub fn format_record(record: &CompanyRecord) -> Result<String, ScrapeError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| ScrapeError::Serialization(e.to_string()))
}

/// Writes each record to stdout in one locked write.
pub struct StdoutSink;

impl RecordSink for StdoutSink {
    fn emit(&self, record: &CompanyRecord) -> Result<(), ScrapeError> {
        let text = format_record(record)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{text}").map_err(|e| ScrapeError::Serialization(e.to_string()))
    }
}

/// Keeps records in memory instead of printing them.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<CompanyRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CompanyRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &CompanyRecord) -> Result<(), ScrapeError> {
        self.records
            .lock()
            .map_err(|_| ScrapeError::Serialization("record buffer poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}
