//! Port traits: the seams between the domain and the outside world.

pub mod config_port;
pub mod corpus_port;
pub mod filing_port;
pub mod price_port;
