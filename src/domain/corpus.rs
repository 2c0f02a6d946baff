//! Corpus assembly: label every filing and persist the labeled records.
//!
//! Filings are grouped by ticker so each ticker's prices are fetched once.
//! Groups are independent and may be processed in parallel; records are
//! written afterwards, one at a time, in ticker then date order.

use crate::domain::classifier::{self, ClassificationConfig};
use crate::domain::error::{ClassifyError, CorpusError};
use crate::domain::filing::{contains_keyword, CorpusRecord, FilingRef};
use crate::domain::label::Label;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use crate::ports::corpus_port::CorpusPort;
use crate::ports::filing_port::FilingPort;
use crate::ports::price_port::PricePort;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub skip_existing: bool,
    pub require_keyword: Option<String>,
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
            require_keyword: None,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoPriceData(String),
    Classify(ClassifyError),
    Io(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPriceData(reason) => write!(f, "no price data: {reason}"),
            SkipReason::Classify(err) => write!(f, "{err}"),
            SkipReason::Io(reason) => write!(f, "i/o: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFiling {
    pub filing_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub written: BTreeMap<Label, usize>,
    pub already_present: usize,
    /// Filings sharing a record name with an earlier filing in the same run.
    pub duplicates: usize,
    pub filtered: usize,
    pub skipped: Vec<SkippedFiling>,
}

impl BuildSummary {
    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }

    pub fn count(&self, label: Label) -> usize {
        self.written.get(&label).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
enum FilingOutcome {
    Labeled(CorpusRecord),
    AlreadyPresent(String),
    Filtered(String),
    Skipped(SkippedFiling),
}

/// Groups filings by ticker, each group sorted by date then id.
///
/// Filings that map to the same record name are collapsed onto the first by id.
pub fn plan_filings(filings: Vec<FilingRef>) -> Vec<(String, Vec<FilingRef>)> {
    let mut groups: BTreeMap<String, Vec<FilingRef>> = BTreeMap::new();
    for filing in filings {
        groups.entry(filing.ticker.clone()).or_default().push(filing);
    }
    groups
        .into_iter()
        .map(|(ticker, mut group)| {
            group.sort_by(|a, b| {
                a.filing_date
                    .cmp(&b.filing_date)
                    .then_with(|| a.id.cmp(&b.id))
            });
            group.dedup_by(|later, kept| {
                let duplicate = later.record_name() == kept.record_name();
                if duplicate {
                    warn!(
                        "{} duplicates {} as {}, ignoring it",
                        later.id,
                        kept.id,
                        kept.record_name()
                    );
                }
                duplicate
            });
            (ticker, group)
        })
        .collect()
}

pub fn build_corpus(
    prices: &(dyn PricePort + Sync),
    filings: &(dyn FilingPort + Sync),
    corpus: &mut (dyn CorpusPort + Sync),
    config: &ClassificationConfig,
    options: &BuildOptions,
) -> Result<BuildSummary, CorpusError> {
    config.validate()?;

    let listed = filings.list_filings()?;
    let listed_count = listed.len();
    let groups = plan_filings(listed);
    let filing_count: usize = groups.iter().map(|(_, g)| g.len()).sum();
    info!(
        "classifying {} filings across {} tickers (timespan={}, limit={}, classes={})",
        filing_count,
        groups.len(),
        config.timespan,
        config.limit,
        config.num_classes
    );

    let outcomes: Vec<Vec<FilingOutcome>> = {
        let store: &(dyn CorpusPort + Sync) = &*corpus;
        let run = |(ticker, group): &(String, Vec<FilingRef>)| {
            process_ticker(prices, filings, store, ticker, group, config, options)
        };
        if options.parallel {
            groups.par_iter().map(run).collect::<Result<_, _>>()?
        } else {
            groups.iter().map(run).collect::<Result<_, _>>()?
        }
    };

    let mut summary = BuildSummary {
        duplicates: listed_count - filing_count,
        ..BuildSummary::default()
    };
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            FilingOutcome::Labeled(record) => {
                corpus.write(&record)?;
                debug!("{} -> {}", record.filing_id, record.label);
                *summary.written.entry(record.label).or_insert(0) += 1;
            }
            FilingOutcome::AlreadyPresent(id) => {
                debug!("{id} already in corpus");
                summary.already_present += 1;
            }
            FilingOutcome::Filtered(id) => {
                debug!("{id} filtered by keyword");
                summary.filtered += 1;
            }
            FilingOutcome::Skipped(skipped) => {
                warn!("skipping {}: {}", skipped.filing_id, skipped.reason);
                summary.skipped.push(skipped);
            }
        }
    }
    corpus.finish()?;

    info!(
        "wrote {} records ({} already present, {} duplicates, {} filtered, {} skipped)",
        summary.total_written(),
        summary.already_present,
        summary.duplicates,
        summary.filtered,
        summary.skipped.len()
    );
    Ok(summary)
}

fn skipped(filing: &FilingRef, reason: SkipReason) -> FilingOutcome {
    FilingOutcome::Skipped(SkippedFiling {
        filing_id: filing.id.clone(),
        reason,
    })
}

fn process_ticker(
    prices: &(dyn PricePort + Sync),
    filings: &(dyn FilingPort + Sync),
    store: &(dyn CorpusPort + Sync),
    ticker: &str,
    group: &[FilingRef],
    config: &ClassificationConfig,
    options: &BuildOptions,
) -> Result<Vec<FilingOutcome>, ClassifyError> {
    let mut outcomes = Vec::with_capacity(group.len());
    let mut pending: Vec<(&FilingRef, String)> = Vec::new();

    for filing in group {
        if options.skip_existing {
            match store.contains(&filing.record_name()) {
                Ok(true) => {
                    outcomes.push(FilingOutcome::AlreadyPresent(filing.id.clone()));
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    outcomes.push(skipped(filing, SkipReason::Io(e.to_string())));
                    continue;
                }
            }
        }

        let text = match filings.read_text(filing) {
            Ok(text) => text,
            Err(e) => {
                outcomes.push(skipped(filing, SkipReason::Io(e.to_string())));
                continue;
            }
        };

        if let Some(keyword) = options.require_keyword.as_deref() {
            if !contains_keyword(&text, keyword) {
                outcomes.push(FilingOutcome::Filtered(filing.id.clone()));
                continue;
            }
        }

        pending.push((filing, text));
    }

    if pending.is_empty() {
        return Ok(outcomes);
    }

    let start = pending
        .iter()
        .filter_map(|(filing, _)| config.anchor_date(filing.filing_date))
        .min();
    let fetched = match start {
        Some(start) => fetch_forward(prices, ticker, start).map_err(|e| e.to_string()),
        None => Err("filing dates out of range".to_string()),
    };
    let series = match fetched {
        Ok(series) => series,
        Err(reason) => {
            for (filing, _) in &pending {
                outcomes.push(skipped(filing, SkipReason::NoPriceData(reason.clone())));
            }
            return Ok(outcomes);
        }
    };
    debug!("{ticker}: {} price points loaded", series.len());

    for (filing, raw_text) in pending {
        match classifier::classify(filing.filing_date, &series, config) {
            Ok(label) => outcomes.push(FilingOutcome::Labeled(CorpusRecord {
                filing_id: filing.id.clone(),
                ticker: filing.ticker.clone(),
                filing_date: filing.filing_date,
                label,
                raw_text,
            })),
            Err(e) if e.is_recoverable() => {
                outcomes.push(skipped(filing, SkipReason::Classify(e)))
            }
            Err(e) => return Err(e),
        }
    }
    Ok(outcomes)
}

/// Every close for `ticker` from `start` to the end of its data.
///
/// The end is left open so that sparse series (weekly closes, trading halts)
/// still reach `timespan` sessions past the anchor.
pub fn fetch_forward(
    prices: &dyn PricePort,
    ticker: &str,
    start: NaiveDate,
) -> Result<PriceSeries, CorpusError> {
    let (_, last, _) = prices
        .get_data_range(ticker)?
        .ok_or_else(|| CorpusError::NoData {
            ticker: ticker.to_string(),
        })?;
    prices.fetch_closes(ticker, start, last.max(start))
}
