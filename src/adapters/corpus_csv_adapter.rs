//! Single-file CSV corpus store.
//!
//! Columns: `filing_id,ticker,filing_date,label,raw_text`. Reopening an
//! existing file appends to it and treats its rows as already written.

use crate::domain::error::CorpusError;
use crate::domain::filing::{record_name, CorpusRecord};
use crate::ports::corpus_port::CorpusPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

const HEADER: [&str; 5] = ["filing_id", "ticker", "filing_date", "label", "raw_text"];

pub struct CorpusCsvAdapter {
    path: PathBuf,
    existing: HashSet<String>,
    writer: Option<csv::Writer<File>>,
}

fn csv_error(e: csv::Error) -> CorpusError {
    CorpusError::Io(std::io::Error::other(e))
}

impl CorpusCsvAdapter {
    pub fn open(path: PathBuf) -> Result<Self, CorpusError> {
        let mut existing = HashSet::new();

        if path.is_file() {
            let mut rdr = csv::Reader::from_path(&path).map_err(csv_error)?;
            for result in rdr.records() {
                let row = result.map_err(csv_error)?;
                let (Some(ticker), Some(date)) = (row.get(1), row.get(2)) else {
                    continue;
                };
                if let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                    existing.insert(record_name(ticker, date));
                }
            }
        }

        Ok(Self {
            path,
            existing,
            writer: None,
        })
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<File>, CorpusError> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let mut writer = csv::Writer::from_writer(file);
            if is_new {
                writer.write_record(HEADER).map_err(csv_error)?;
            }
            self.writer = Some(writer);
        }
        self.writer
            .as_mut()
            .ok_or_else(|| CorpusError::Io(std::io::Error::other("corpus writer unavailable")))
    }
}

impl CorpusPort for CorpusCsvAdapter {
    fn contains(&self, record_name: &str) -> Result<bool, CorpusError> {
        Ok(self.existing.contains(record_name))
    }

    fn write(&mut self, record: &CorpusRecord) -> Result<(), CorpusError> {
        let date = record.filing_date.format("%Y-%m-%d").to_string();
        self.writer()?
            .write_record([
                record.filing_id.as_str(),
                record.ticker.as_str(),
                date.as_str(),
                record.label.as_str(),
                record.raw_text.as_str(),
            ])
            .map_err(csv_error)?;
        self.existing.insert(record.record_name());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CorpusError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
