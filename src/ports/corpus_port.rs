//! Labeled corpus store port trait.

use crate::domain::error::CorpusError;
use crate::domain::filing::CorpusRecord;

pub trait CorpusPort {
    /// Whether a record named `record_name` was already written, under any label.
    fn contains(&self, record_name: &str) -> Result<bool, CorpusError>;

    fn write(&mut self, record: &CorpusRecord) -> Result<(), CorpusError>;

    /// Flushes buffered output. Stores that write through need not override this.
    fn finish(&mut self) -> Result<(), CorpusError> {
        Ok(())
    }
}
