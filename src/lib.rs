//! edgar8k: builds a sentiment-labeled corpus from SEC Form 8-K filings.
//!
//! Each filing is labeled `neg`, `pos` or `neutral` from the stock's return
//! over a window of trading sessions after the filing date.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
