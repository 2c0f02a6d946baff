//! Configuration reading and validation.
//!
//! Every key is checked before any filing is touched; a bad classifier
//! setting aborts the run as `ClassifyError::InvalidConfig`.

use crate::domain::classifier::{
    ClassificationConfig, DelayUnit, DEFAULT_ADJUST_DELAY, DEFAULT_LIMIT, DEFAULT_NUM_CLASSES,
    DEFAULT_TIMESPAN,
};
use crate::domain::corpus::BuildOptions;
use crate::domain::error::CorpusError;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Csv,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Directory,
    Csv,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CorpusError> {
    classification_config(config)?.validate()?;
    validate_prices(config)?;
    validate_filings(config)?;
    validate_corpus(config)?;
    Ok(())
}

/// Reads `[classifier]`. Range checks are left to `ClassificationConfig::validate`.
pub fn classification_config(config: &dyn ConfigPort) -> Result<ClassificationConfig, CorpusError> {
    let delay_unit = match config.get_string("classifier", "delay_unit") {
        Some(s) => s.parse::<DelayUnit>().map_err(|reason| CorpusError::ConfigInvalid {
            section: "classifier".to_string(),
            key: "delay_unit".to_string(),
            reason,
        })?,
        None => DelayUnit::default(),
    };

    Ok(ClassificationConfig {
        timespan: strict_int(config, "classifier", "timespan", DEFAULT_TIMESPAN)?,
        limit: strict_double(config, "classifier", "limit", DEFAULT_LIMIT)?,
        adjust_delay: strict_int(config, "classifier", "adjust_delay", DEFAULT_ADJUST_DELAY)?,
        num_classes: strict_int(config, "classifier", "num_classes", DEFAULT_NUM_CLASSES)?,
        delay_unit,
    })
}

pub fn build_options(config: &dyn ConfigPort) -> Result<BuildOptions, CorpusError> {
    Ok(BuildOptions {
        skip_existing: strict_bool(config, "corpus", "skip_existing", true)?,
        require_keyword: config
            .get_string("filings", "require_keyword")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        parallel: strict_bool(config, "corpus", "parallel", true)?,
    })
}

/// `[sqlite] pool_size` as a connection count, at least 1.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, CorpusError> {
    let size = strict_int(config, "sqlite", "pool_size", 4)?;
    u32::try_from(size)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| CorpusError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "pool_size".to_string(),
            reason: format!("pool_size must be between 1 and {}, got {size}", u32::MAX),
        })
}

/// A boolean key; a value that is present but not a boolean is an error.
pub fn strict_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, CorpusError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    // An unrecognized spelling is the only way both fallbacks survive.
    let parsed = config.get_bool(section, key, true);
    if parsed != config.get_bool(section, key, false) {
        return Err(CorpusError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a boolean, got {}", raw.trim()),
        });
    }
    Ok(parsed)
}

pub fn price_source(config: &dyn ConfigPort) -> Result<PriceSource, CorpusError> {
    match config.get_string("prices", "source") {
        None => Ok(PriceSource::Csv),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "csv" => Ok(PriceSource::Csv),
            "sqlite" => Ok(PriceSource::Sqlite),
            other => Err(CorpusError::ConfigInvalid {
                section: "prices".to_string(),
                key: "source".to_string(),
                reason: format!("expected csv or sqlite, got {other}"),
            }),
        },
    }
}

pub fn corpus_format(config: &dyn ConfigPort) -> Result<CorpusFormat, CorpusError> {
    match config.get_string("corpus", "format") {
        None => Ok(CorpusFormat::Directory),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "directory" | "dir" => Ok(CorpusFormat::Directory),
            "csv" => Ok(CorpusFormat::Csv),
            other => Err(CorpusError::ConfigInvalid {
                section: "corpus".to_string(),
                key: "format".to_string(),
                reason: format!("expected directory or csv, got {other}"),
            }),
        },
    }
}

/// Non-empty string value or `ConfigMissing`.
pub fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, CorpusError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(CorpusError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn strict_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, CorpusError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|_| CorpusError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected an integer, got {s}"),
        }),
    }
}

fn strict_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, CorpusError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|_| CorpusError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a number, got {s}"),
        }),
    }
}

fn validate_prices(config: &dyn ConfigPort) -> Result<(), CorpusError> {
    match price_source(config)? {
        PriceSource::Csv => {
            required_string(config, "prices", "csv_dir")?;
        }
        PriceSource::Sqlite => {
            required_string(config, "sqlite", "path")?;
            pool_size(config)?;
        }
    }
    Ok(())
}

fn validate_filings(config: &dyn ConfigPort) -> Result<(), CorpusError> {
    required_string(config, "filings", "dir")?;
    Ok(())
}

fn validate_corpus(config: &dyn ConfigPort) -> Result<(), CorpusError> {
    required_string(config, "corpus", "output_dir")?;
    corpus_format(config)?;
    strict_bool(config, "corpus", "group_by_timespan", true)?;
    build_options(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;
    use crate::domain::error::ClassifyError;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const PATHS: &str = "[prices]\ncsv_dir = /prices\n[filings]\ndir = /filings\n[corpus]\noutput_dir = /corpus\n";

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[classifier]
timespan = 5
limit = 0.02
adjust_delay = 4
num_classes = 3
delay_unit = calendar

[prices]
source = csv
csv_dir = /data/prices

[filings]
dir = /data/filings
require_keyword = quarter

[corpus]
output_dir = /data/corpus
format = csv
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn defaults_apply_when_classifier_section_absent() {
        let config = make_config(PATHS);
        let c = classification_config(&config).unwrap();
        assert_eq!(c, ClassificationConfig::default());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn num_classes_four_is_invalid_classifier_config() {
        let config = make_config(&format!("[classifier]\nnum_classes = 4\n{PATHS}"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::Classify(ClassifyError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn negative_limit_is_invalid() {
        let config = make_config(&format!("[classifier]\nlimit = -0.1\n{PATHS}"));
        assert!(matches!(
            validate_config(&config).unwrap_err(),
            CorpusError::Classify(ClassifyError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn non_numeric_timespan_is_rejected() {
        let config = make_config(&format!("[classifier]\ntimespan = ten\n{PATHS}"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CorpusError::ConfigInvalid { key, .. } if key == "timespan"));
    }

    #[test]
    fn unknown_delay_unit_is_rejected() {
        let config = make_config(&format!("[classifier]\ndelay_unit = fortnight\n{PATHS}"));
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CorpusError::ConfigInvalid { key, .. } if key == "delay_unit"));
    }

    #[test]
    fn missing_filings_dir_fails() {
        let config = make_config("[prices]\ncsv_dir = /p\n[corpus]\noutput_dir = /c\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CorpusError::ConfigMissing { key, .. } if key == "dir"));
    }

    #[test]
    fn missing_output_dir_fails() {
        let config = make_config("[prices]\ncsv_dir = /p\n[filings]\ndir = /f\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, CorpusError::ConfigMissing { key, .. } if key == "output_dir"));
    }

    #[test]
    fn sqlite_source_requires_path() {
        let config = make_config("[prices]\nsource = sqlite\n[filings]\ndir = /f\n[corpus]\noutput_dir = /c\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, CorpusError::ConfigMissing { section, key } if section == "sqlite" && key == "path")
        );
    }

    #[test]
    fn unknown_price_source_fails() {
        let config = make_config("[prices]\nsource = bloomberg\n");
        assert!(matches!(
            price_source(&config).unwrap_err(),
            CorpusError::ConfigInvalid { key, .. } if key == "source"
        ));
    }

    #[test]
    fn unknown_corpus_format_fails() {
        let config = make_config("[corpus]\nformat = parquet\n");
        assert!(corpus_format(&config).is_err());
        let config = make_config("[corpus]\nformat = dir\n");
        assert_eq!(corpus_format(&config).unwrap(), CorpusFormat::Directory);
    }

    #[test]
    fn build_options_reads_corpus_and_filings() {
        let config = make_config(
            "[filings]\nrequire_keyword = Quarter \n[corpus]\nskip_existing = false\nparallel = no\n",
        );
        let options = build_options(&config).unwrap();
        assert!(!options.skip_existing);
        assert!(!options.parallel);
        assert_eq!(options.require_keyword.as_deref(), Some("Quarter"));
    }

    #[test]
    fn blank_keyword_means_no_filter() {
        let config = make_config("[filings]\nrequire_keyword =\n");
        assert_eq!(build_options(&config).unwrap().require_keyword, None);
    }

    #[test]
    fn unparseable_booleans_are_rejected() {
        for key in ["skip_existing", "parallel", "group_by_timespan"] {
            let config = make_config(&format!("{PATHS}{key} = maybe\n"));
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(&err, CorpusError::ConfigInvalid { key: k, .. } if k == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn strict_bool_reads_spellings_and_default() {
        let config = make_config("[corpus]\nparallel = off\nskip_existing = Yes\n");
        assert!(!strict_bool(&config, "corpus", "parallel", true).unwrap());
        assert!(strict_bool(&config, "corpus", "skip_existing", false).unwrap());
        assert!(strict_bool(&config, "corpus", "group_by_timespan", true).unwrap());
    }

    #[test]
    fn pool_size_out_of_range_is_rejected() {
        let sqlite = |size: &str| {
            make_config(&format!(
                "[prices]\nsource = sqlite\n[sqlite]\npath = /p.db\npool_size = {size}\n\
                 [filings]\ndir = /f\n[corpus]\noutput_dir = /c\n"
            ))
        };
        for bad in ["0", "-3", "4294967296"] {
            assert!(
                matches!(validate_config(&sqlite(bad)).unwrap_err(), CorpusError::ConfigInvalid { key, .. } if key == "pool_size"),
                "pool_size = {bad}"
            );
        }
        let config = sqlite("8");
        assert_eq!(pool_size(&config).unwrap(), 8);
    }
}
