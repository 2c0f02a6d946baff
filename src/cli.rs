//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::corpus_csv_adapter::CorpusCsvAdapter;
use crate::adapters::corpus_dir_adapter::CorpusDirAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::filing_dir_adapter::FilingDirAdapter;
use crate::domain::classifier::{label_for_return, measure_return, ClassificationConfig};
use crate::domain::config_validation::{
    build_options, classification_config, corpus_format, price_source, required_string,
    strict_bool, validate_config, CorpusFormat, PriceSource,
};
use crate::domain::corpus::{build_corpus, fetch_forward, plan_filings, BuildOptions, BuildSummary};
use crate::domain::error::{ClassifyError, CorpusError};
use crate::domain::label::Label;
use crate::ports::config_port::ConfigPort;
use crate::ports::corpus_port::CorpusPort;
use crate::ports::filing_port::FilingPort;
use crate::ports::price_port::PricePort;

#[derive(Parser, Debug)]
#[command(
    name = "edgar8k",
    about = "Label SEC 8-K filings by the stock's return after filing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify every filing and write the labeled corpus
    Build {
        #[arg(short, long)]
        config: PathBuf,
        /// Validate and show what would be processed without writing
        #[arg(long)]
        dry_run: bool,
        /// Process tickers one at a time
        #[arg(long)]
        sequential: bool,
    },
    /// Classify a single filing date for one ticker
    Classify {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        /// Filing date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        #[arg(long)]
        num_classes: Option<i64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show price data range for one or all tickers
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// List the filings found in the filing directory
    ListFilings {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load a directory of <TICKER>.csv price files into the SQLite store
    ImportPrices {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Build {
            config,
            dry_run,
            sequential,
        } => run_build(&config, dry_run, sequential),
        Command::Classify {
            config,
            ticker,
            date,
            num_classes,
        } => run_classify(&config, &ticker, &date, num_classes),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::ListFilings { config } => run_list_filings(&config),
        Command::ImportPrices { config, csv_dir } => run_import_prices(&config, &csv_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CorpusError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Where records go: `output_dir`, plus a `<timespan>` level when grouping by timespan.
pub fn corpus_root(config: &dyn ConfigPort, timespan: i64) -> Result<PathBuf, CorpusError> {
    let output_dir = PathBuf::from(required_string(config, "corpus", "output_dir")?);
    if strict_bool(config, "corpus", "group_by_timespan", true)? {
        Ok(output_dir.join(timespan.to_string()))
    } else {
        Ok(output_dir)
    }
}

pub fn open_price_port(config: &dyn ConfigPort) -> Result<Box<dyn PricePort + Sync>, CorpusError> {
    match price_source(config)? {
        PriceSource::Csv => {
            let dir = required_string(config, "prices", "csv_dir")?;
            Ok(Box::new(CsvPriceAdapter::new(PathBuf::from(dir))))
        }
        PriceSource::Sqlite => open_sqlite(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort) -> Result<Box<dyn PricePort + Sync>, CorpusError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;
    Ok(Box::new(SqliteAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort) -> Result<Box<dyn PricePort + Sync>, CorpusError> {
    Err(sqlite_unavailable())
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_unavailable() -> CorpusError {
    CorpusError::ConfigInvalid {
        section: "prices".into(),
        key: "source".into(),
        reason: "edgar8k was built without the sqlite feature".into(),
    }
}

pub fn open_filing_port(config: &dyn ConfigPort) -> Result<FilingDirAdapter, CorpusError> {
    let dir = required_string(config, "filings", "dir")?;
    Ok(FilingDirAdapter::new(PathBuf::from(dir)))
}

pub fn open_corpus(
    config: &dyn ConfigPort,
    timespan: i64,
) -> Result<Box<dyn CorpusPort + Sync>, CorpusError> {
    let root = corpus_root(config, timespan)?;
    match corpus_format(config)? {
        CorpusFormat::Directory => Ok(Box::new(CorpusDirAdapter::new(root))),
        CorpusFormat::Csv => Ok(Box::new(CorpusCsvAdapter::open(root.join("corpus.csv"))?)),
    }
}

fn run_build(config_path: &Path, dry_run: bool, sequential: bool) -> Result<(), CorpusError> {
    let adapter = load_config(config_path)?;
    validate_config(&adapter)?;

    let config = classification_config(&adapter)?;
    let mut options = build_options(&adapter)?;
    if sequential {
        options.parallel = false;
    }

    let filings = open_filing_port(&adapter)?;
    let corpus = open_corpus(&adapter, config.timespan)?;

    if dry_run {
        return run_dry_run(&filings, corpus.as_ref(), &config, &options);
    }

    let prices = open_price_port(&adapter)?;
    let mut corpus = corpus;
    let summary = build_corpus(
        prices.as_ref(),
        &filings,
        corpus.as_mut(),
        &config,
        &options,
    )?;
    print_summary(&summary, &config);
    Ok(())
}

pub fn run_dry_run(
    filings: &dyn FilingPort,
    corpus: &dyn CorpusPort,
    config: &ClassificationConfig,
    options: &BuildOptions,
) -> Result<(), CorpusError> {
    let groups = plan_filings(filings.list_filings()?);

    println!(
        "classifier: timespan={} limit={} adjust_delay={} ({}) classes={}",
        config.timespan, config.limit, config.adjust_delay, config.delay_unit, config.num_classes
    );
    if let Some(keyword) = &options.require_keyword {
        println!("keyword filter: {keyword}");
    }

    let mut total = 0;
    let mut present = 0;
    for (ticker, group) in &groups {
        let mut already = 0;
        for filing in group {
            if options.skip_existing && corpus.contains(&filing.record_name())? {
                already += 1;
            }
        }
        println!("  {ticker}: {} filings ({already} already in corpus)", group.len());
        total += group.len();
        present += already;
    }
    println!(
        "dry run: {} filings across {} tickers, {} to classify",
        total,
        groups.len(),
        total - present
    );
    Ok(())
}

fn print_summary(summary: &BuildSummary, config: &ClassificationConfig) {
    println!("=== Corpus Summary ===");
    for label in Label::for_classes(config.num_classes) {
        println!("{:<16}{}", format!("{label}:"), summary.count(*label));
    }
    println!("{:<16}{}", "written:", summary.total_written());
    println!("{:<16}{}", "already present:", summary.already_present);
    println!("{:<16}{}", "duplicates:", summary.duplicates);
    println!("{:<16}{}", "filtered:", summary.filtered);
    println!("{:<16}{}", "skipped:", summary.skipped.len());
    for skipped in &summary.skipped {
        println!("  {}: {}", skipped.filing_id, skipped.reason);
    }
}

fn run_classify(
    config_path: &Path,
    ticker: &str,
    date: &str,
    num_classes: Option<i64>,
) -> Result<(), CorpusError> {
    let adapter = load_config(config_path)?;
    let mut config = classification_config(&adapter)?;
    if let Some(n) = num_classes {
        config.num_classes = n;
    }
    config.validate()?;

    let filing_date =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| CorpusError::ConfigInvalid {
            section: "cli".into(),
            key: "date".into(),
            reason: format!("invalid date {date:?} (expected YYYY-MM-DD)"),
        })?;
    let ticker = ticker.trim().to_uppercase();

    let anchor =
        config
            .anchor_date(filing_date)
            .ok_or_else(|| ClassifyError::DataUnavailable {
                ticker: ticker.clone(),
                reason: format!("cannot shift {filing_date} by the filing delay"),
            })?;

    let prices = open_price_port(&adapter)?;
    let series = fetch_forward(prices.as_ref(), &ticker, anchor)?;
    let ret = measure_return(filing_date, &series, &config)?;
    let label = label_for_return(ret.value, config.limit, config.num_classes);

    println!("ticker:      {ticker}");
    println!("filing date: {filing_date}");
    println!("start:       {} {:.4}", ret.start_date, ret.start_price);
    println!("end:         {} {:.4}", ret.end_date, ret.end_price);
    println!("return:      {:.2}%", ret.value * 100.0);
    println!("label:       {label}");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), CorpusError> {
    let adapter = load_config(config_path)?;
    validate_config(&adapter)?;

    let config = classification_config(&adapter)?;
    let options = build_options(&adapter)?;
    println!(
        "classifier: timespan={} limit={} adjust_delay={} ({}) classes={}",
        config.timespan, config.limit, config.adjust_delay, config.delay_unit, config.num_classes
    );
    println!("corpus: {}", corpus_root(&adapter, config.timespan)?.display());
    if let Some(keyword) = options.require_keyword {
        println!("keyword filter: {keyword}");
    }
    println!("configuration is valid");
    Ok(())
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> Result<(), CorpusError> {
    let adapter = load_config(config_path)?;
    let prices = open_price_port(&adapter)?;

    let tickers = match ticker {
        Some(t) => vec![t.trim().to_uppercase()],
        None => prices.list_tickers()?,
    };

    for t in &tickers {
        match prices.get_data_range(t) {
            Ok(Some((first, last, count))) => {
                println!("{t}: {count} closes, {first} to {last}");
            }
            Ok(None) => warn!("{t}: no price data found"),
            Err(e) => warn!("error querying {t}: {e}"),
        }
    }
    Ok(())
}

fn run_list_filings(config_path: &Path) -> Result<(), CorpusError> {
    let adapter = load_config(config_path)?;
    let filings = open_filing_port(&adapter)?;

    let groups = plan_filings(filings.list_filings()?);
    let mut count = 0;
    for filing in groups.iter().flat_map(|(_, group)| group) {
        println!("{}\t{}\t{}", filing.id, filing.ticker, filing.filing_date);
        count += 1;
    }
    info!("{count} filings found");
    Ok(())
}

#[cfg(feature = "sqlite")]
fn run_import_prices(config_path: &Path, csv_dir: &Path) -> Result<(), CorpusError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let adapter = load_config(config_path)?;
    let store = SqliteAdapter::from_config(&adapter)?;
    let source = CsvPriceAdapter::new(csv_dir.to_path_buf());

    let mut total = 0;
    for ticker in source.list_tickers()? {
        match source.read_all(&ticker) {
            Ok(points) => {
                let n = store.insert_points(&ticker, &points)?;
                info!("{ticker}: imported {n} closes");
                total += n;
            }
            Err(e) => warn!("skipping {ticker}: {e}"),
        }
    }
    println!("imported {total} closes");
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn run_import_prices(_config_path: &Path, _csv_dir: &Path) -> Result<(), CorpusError> {
    Err(sqlite_unavailable())
}
