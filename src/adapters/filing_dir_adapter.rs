//! Filing directory adapter.
//!
//! Walks a directory tree for files named `<TICKER>-<date>-8-K.txt`;
//! anything else is ignored.

use crate::domain::error::CorpusError;
use crate::domain::filing::{parse_filing_filename, FilingRef};
use crate::ports::filing_port::FilingPort;
use encoding_rs::WINDOWS_1252;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FilingDirAdapter {
    root: PathBuf,
}

impl FilingDirAdapter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn walk(&self, dir: &Path, out: &mut Vec<FilingRef>) -> Result<(), CorpusError> {
        let entries = fs::read_dir(dir).map_err(|e| CorpusError::Filing {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| CorpusError::Filing {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();

            if path.is_dir() {
                self.walk(&path, out)?;
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();
            match parse_filing_filename(&name) {
                Some((ticker, filing_date)) => {
                    let id = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| name.to_string());
                    out.push(FilingRef {
                        id,
                        ticker,
                        filing_date,
                        path,
                    });
                }
                None => debug!("ignoring {}", path.display()),
            }
        }
        Ok(())
    }
}

impl FilingPort for FilingDirAdapter {
    fn list_filings(&self) -> Result<Vec<FilingRef>, CorpusError> {
        let mut filings = Vec::new();
        self.walk(&self.root, &mut filings)?;
        filings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(filings)
    }

    /// Text that is not valid UTF-8 is read as Windows-1252, the encoding of
    /// older EDGAR submissions, so smart quotes and dashes survive.
    fn read_text(&self, filing: &FilingRef) -> Result<String, CorpusError> {
        let bytes = fs::read(&filing.path).map_err(|e| CorpusError::Filing {
            reason: format!("failed to read {}: {}", filing.path.display(), e),
        })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                debug!("{} is not UTF-8, decoding as windows-1252", filing.id);
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(e.as_bytes());
                Ok(text.into_owned())
            }
        }
    }
}
