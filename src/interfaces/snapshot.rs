use crate::domain::account::Account;
use crate::domain::invoice::TransferredInvoice;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryBackend;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Offline copy of both backend collections, in the backend's wire shapes.
///
/// ```json
/// { "workers": [ ... ], "invoices": [ ... ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub workers: Vec<Account>,
    #[serde(default)]
    pub invoices: Vec<TransferredInvoice>,
}

impl Snapshot {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(source))?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Seeds an in-memory backend with the snapshot contents.
    pub fn into_backend(self) -> InMemoryBackend {
        InMemoryBackend::with_data(self.workers, self.invoices)
    }
}
