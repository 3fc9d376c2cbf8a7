//! On-disk cache of the last exchange rate snapshot

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::file_io::{read_json_optional, write_json_atomic};
use crate::error::ExpenseResult;
use crate::models::RateSnapshot;

/// Stores one [`RateSnapshot`] in its own file, separate from the records
#[derive(Debug, Clone)]
pub struct RateCache {
    path: PathBuf,
}

impl RateCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached snapshot, if any.
    ///
    /// The cache is disposable, so an unreadable file is logged and treated
    /// as missing rather than failing the command.
    pub fn load(&self) -> Option<RateSnapshot> {
        match read_json_optional::<RateSnapshot, _>(&self.path) {
            Ok(snapshot) => {
                if let Some(s) = &snapshot {
                    debug!(fetched_at = %s.fetched_at, "Loaded cached exchange rates");
                }
                snapshot
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable rate cache");
                None
            }
        }
    }

    pub fn save(&self, snapshot: &RateSnapshot) -> ExpenseResult<()> {
        write_json_atomic(&self.path, snapshot)?;
        debug!(path = %self.path.display(), "Saved exchange rate cache");
        Ok(())
    }
}
