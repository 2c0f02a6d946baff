//! Core domain types and logic.

pub mod price;
pub mod label;
pub mod classifier;
pub mod filing;
pub mod corpus;
pub mod config_validation;
pub mod error;
