//! Return classifier: labels a filing by the stock's forward return.
//!
//! The anchor is the filing date shifted by `adjust_delay` (in business or
//! calendar days), rolled forward to the next trading session. The return is
//! measured from that session's close to the close `timespan` sessions later.

use crate::domain::error::ClassifyError;
use crate::domain::label::Label;
use crate::domain::price::PriceSeries;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TIMESPAN: i64 = 10;
pub const DEFAULT_LIMIT: f64 = 0.05;
pub const DEFAULT_ADJUST_DELAY: i64 = 4;
pub const DEFAULT_NUM_CLASSES: i64 = 3;
pub const MAX_ADJUST_DELAY: i64 = 365;

/// Unit in which `adjust_delay` is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayUnit {
    /// Monday to Friday; weekends are skipped.
    #[default]
    Business,
    Calendar,
}

impl fmt::Display for DelayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayUnit::Business => f.write_str("business"),
            DelayUnit::Calendar => f.write_str("calendar"),
        }
    }
}

impl FromStr for DelayUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "business" | "bday" => Ok(DelayUnit::Business),
            "calendar" | "day" => Ok(DelayUnit::Calendar),
            other => Err(format!("unknown delay unit: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationConfig {
    /// Trading sessions between the start and end close.
    pub timespan: i64,
    /// Half-width of the neutral band in 3-class mode.
    pub limit: f64,
    pub adjust_delay: i64,
    pub num_classes: i64,
    pub delay_unit: DelayUnit,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            timespan: DEFAULT_TIMESPAN,
            limit: DEFAULT_LIMIT,
            adjust_delay: DEFAULT_ADJUST_DELAY,
            num_classes: DEFAULT_NUM_CLASSES,
            delay_unit: DelayUnit::Business,
        }
    }
}

impl ClassificationConfig {
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.timespan <= 0 {
            return Err(invalid(format!(
                "timespan must be a positive number of sessions, got {}",
                self.timespan
            )));
        }
        if !self.limit.is_finite() || self.limit < 0.0 {
            return Err(invalid(format!(
                "limit must be finite and non-negative, got {}",
                self.limit
            )));
        }
        if self.num_classes != 2 && self.num_classes != 3 {
            return Err(invalid(format!(
                "num_classes must be 2 or 3, got {}",
                self.num_classes
            )));
        }
        if self.adjust_delay.abs() > MAX_ADJUST_DELAY {
            return Err(invalid(format!(
                "adjust_delay must be within +/-{MAX_ADJUST_DELAY} days, got {}",
                self.adjust_delay
            )));
        }
        Ok(())
    }

    /// Filing date shifted by `adjust_delay`; not yet rolled to a session.
    pub fn anchor_date(&self, filing_date: NaiveDate) -> Option<NaiveDate> {
        match self.delay_unit {
            DelayUnit::Calendar => shift_calendar_days(filing_date, self.adjust_delay),
            DelayUnit::Business => shift_business_days(filing_date, self.adjust_delay),
        }
    }
}

fn invalid(reason: String) -> ClassifyError {
    ClassifyError::InvalidConfig { reason }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn step(date: NaiveDate, forward: bool) -> Option<NaiveDate> {
    if forward {
        date.checked_add_days(Days::new(1))
    } else {
        date.checked_sub_days(Days::new(1))
    }
}

pub fn shift_calendar_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// Moves `days` weekdays away from `date`, skipping Saturdays and Sundays.
pub fn shift_business_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let forward = days >= 0;
    let mut remaining = days.unsigned_abs();
    let mut current = date;
    while remaining > 0 {
        current = step(current, forward)?;
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    Some(current)
}

/// Forward return measured over the classification window.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardReturn {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub value: f64,
}

pub fn measure_return(
    filing_date: NaiveDate,
    series: &PriceSeries,
    config: &ClassificationConfig,
) -> Result<ForwardReturn, ClassifyError> {
    config.validate()?;

    if series.len() < 2 {
        return Err(ClassifyError::InsufficientHistory {
            ticker: series.ticker.clone(),
            points: series.len(),
        });
    }

    let unavailable = |reason: String| ClassifyError::DataUnavailable {
        ticker: series.ticker.clone(),
        reason,
    };

    let anchor = config
        .anchor_date(filing_date)
        .ok_or_else(|| unavailable(format!("cannot shift {filing_date} by the filing delay")))?;

    let start_idx = series
        .session_on_or_after(anchor)
        .ok_or_else(|| unavailable(format!("no trading session on or after {anchor}")))?;

    // validate() guarantees a positive timespan
    let sessions = config.timespan as usize;
    let end_idx = series.session_after(start_idx, sessions).ok_or_else(|| {
        unavailable(format!(
            "no trading session {sessions} sessions after {}",
            series.points()[start_idx].date
        ))
    })?;

    let (start, end) = match (series.get(start_idx), series.get(end_idx)) {
        (Some(s), Some(e)) => (*s, *e),
        _ => return Err(unavailable("price lookup out of range".into())),
    };

    Ok(ForwardReturn {
        start_date: start.date,
        end_date: end.date,
        start_price: start.close,
        end_price: end.close,
        value: (end.close - start.close) / start.close,
    })
}

/// Maps a return onto a label. Assumes a validated `num_classes`.
///
/// 2-class: `value >= 0` is `pos`. 3-class: the band `[-limit, limit]` is
/// `neutral`, both ends inclusive.
pub fn label_for_return(value: f64, limit: f64, num_classes: i64) -> Label {
    if num_classes == 2 {
        return if value >= 0.0 { Label::Pos } else { Label::Neg };
    }
    if value > limit {
        Label::Pos
    } else if value < -limit {
        Label::Neg
    } else {
        Label::Neutral
    }
}

pub fn classify(
    filing_date: NaiveDate,
    series: &PriceSeries,
    config: &ClassificationConfig,
) -> Result<Label, ClassifyError> {
    let ret = measure_return(filing_date, series, config)?;
    Ok(label_for_return(ret.value, config.limit, config.num_classes))
}
