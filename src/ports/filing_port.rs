//! Filing source port trait.

use crate::domain::error::CorpusError;
use crate::domain::filing::FilingRef;

pub trait FilingPort {
    /// Every filing the source holds, in no particular order.
    fn list_filings(&self) -> Result<Vec<FilingRef>, CorpusError>;

    fn read_text(&self, filing: &FilingRef) -> Result<String, CorpusError>;
}
