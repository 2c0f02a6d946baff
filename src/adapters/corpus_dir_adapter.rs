//! Class-directory corpus store: `<root>/<label>/<TICKER>-<date>.txt`.

use crate::domain::error::CorpusError;
use crate::domain::filing::CorpusRecord;
use crate::domain::label::Label;
use crate::ports::corpus_port::CorpusPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CorpusDirAdapter {
    root: PathBuf,
}

impl CorpusDirAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, label: Label, record_name: &str) -> PathBuf {
        self.root.join(label.as_str()).join(record_name)
    }
}

impl CorpusPort for CorpusDirAdapter {
    fn contains(&self, record_name: &str) -> Result<bool, CorpusError> {
        Ok(Label::ALL
            .iter()
            .any(|label| self.record_path(*label, record_name).is_file()))
    }

    fn write(&mut self, record: &CorpusRecord) -> Result<(), CorpusError> {
        let path = self.record_path(record.label, &record.record_name());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &record.raw_text)?;
        Ok(())
    }
}
