#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use edgar8k::domain::classifier::{ClassificationConfig, DelayUnit};
use edgar8k::domain::error::CorpusError;
use edgar8k::domain::filing::{CorpusRecord, FilingRef};
pub use edgar8k::domain::price::{PricePoint, PriceSeries};
use edgar8k::ports::corpus_port::CorpusPort;
use edgar8k::ports::filing_port::FilingPort;
use edgar8k::ports::price_port::PricePort;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockPricePort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
    pub fetches: AtomicUsize,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_points(mut self, ticker: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(ticker.to_string(), points);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl PricePort for MockPricePort {
    fn fetch_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, CorpusError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(CorpusError::Database {
                reason: reason.clone(),
            });
        }
        let points = self.data.get(ticker).ok_or_else(|| CorpusError::NoData {
            ticker: ticker.to_string(),
        })?;
        Ok(PriceSeries::new(
            ticker,
            points
                .iter()
                .copied()
                .filter(|p| p.date >= start_date && p.date <= end_date)
                .collect(),
        ))
    }

    fn list_tickers(&self) -> Result<Vec<String>, CorpusError> {
        let mut tickers: Vec<_> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }

    fn get_data_range(
        &self,
        ticker: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, CorpusError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(CorpusError::Database {
                reason: reason.clone(),
            });
        }
        let series = match self.data.get(ticker) {
            Some(points) => PriceSeries::new(ticker, points.clone()),
            None => return Ok(None),
        };
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Ok(Some((first, last, series.len()))),
            _ => Ok(None),
        }
    }
}

pub struct MockFilingPort {
    pub filings: Vec<(FilingRef, String)>,
    pub unreadable: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub reads: AtomicUsize,
}

impl MockFilingPort {
    pub fn new() -> Self {
        Self {
            filings: Vec::new(),
            unreadable: HashSet::new(),
            list_calls: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn with_filing(mut self, ticker: &str, date: &str, text: &str) -> Self {
        self.filings.push((make_filing(ticker, date), text.to_string()));
        self
    }

    /// Adds a filing under an explicit ref, e.g. a second copy of a record.
    pub fn with_filing_ref(mut self, filing: FilingRef, text: &str) -> Self {
        self.filings.push((filing, text.to_string()));
        self
    }

    pub fn with_unreadable(mut self, ticker: &str, date: &str) -> Self {
        let filing = make_filing(ticker, date);
        self.unreadable.insert(filing.id.clone());
        self.filings.push((filing, String::new()));
        self
    }
}

impl FilingPort for MockFilingPort {
    fn list_filings(&self) -> Result<Vec<FilingRef>, CorpusError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.filings.iter().map(|(f, _)| f.clone()).collect())
    }

    fn read_text(&self, filing: &FilingRef) -> Result<String, CorpusError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.contains(&filing.id) {
            return Err(CorpusError::Filing {
                reason: format!("cannot read {}", filing.id),
            });
        }
        self.filings
            .iter()
            .find(|(f, _)| f.id == filing.id)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| CorpusError::Filing {
                reason: format!("unknown filing {}", filing.id),
            })
    }
}

#[derive(Default)]
pub struct MemoryCorpus {
    pub records: Vec<CorpusRecord>,
    pub existing: HashSet<String>,
    pub finished: bool,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(mut self, record_name: &str) -> Self {
        self.existing.insert(record_name.to_string());
        self
    }

    pub fn label_of(&self, filing_id: &str) -> Option<edgar8k::domain::label::Label> {
        self.records
            .iter()
            .find(|r| r.filing_id == filing_id)
            .map(|r| r.label)
    }
}

impl CorpusPort for MemoryCorpus {
    fn contains(&self, record_name: &str) -> Result<bool, CorpusError> {
        Ok(self.existing.contains(record_name))
    }

    fn write(&mut self, record: &CorpusRecord) -> Result<(), CorpusError> {
        self.existing.insert(record.record_name());
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CorpusError> {
        self.finished = true;
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_filing(ticker: &str, date: &str) -> FilingRef {
    FilingRef {
        id: format!("{ticker}-{date}-8-K"),
        ticker: ticker.to_string(),
        filing_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        path: PathBuf::from(format!("{ticker}-{date}-8-K.txt")),
    }
}

/// One close per weekday starting at `start`.
pub fn weekday_points(start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let mut day = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    let mut points = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day.succ_opt().unwrap();
        }
        points.push(PricePoint::new(day, close));
        day = day.succ_opt().unwrap();
    }
    points
}

/// Twelve weekday closes from 2015-01-05 where the 2015-01-09 close is
/// `start` and the 2015-01-16 close is `end`: a filing on 2015-01-05 with
/// `example_config()` measures exactly `start -> end`.
pub fn window_points(start: f64, end: f64) -> Vec<PricePoint> {
    let mut closes = vec![start; 12];
    closes[0] = start * 0.5;
    closes[9] = end;
    closes[10] = end * 2.0;
    closes[11] = end * 2.0;
    weekday_points("2015-01-05", &closes)
}

/// One close per Friday starting at `start`.
pub fn weekly_points(start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let first = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(first + chrono::Days::new(7 * i as u64), close))
        .collect()
}

pub fn example_config() -> ClassificationConfig {
    ClassificationConfig {
        timespan: 5,
        limit: 0.02,
        adjust_delay: 4,
        num_classes: 3,
        delay_unit: DelayUnit::Business,
    }
}
