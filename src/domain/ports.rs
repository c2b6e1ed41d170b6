use super::account::{Account, NewWorker};
use super::invoice::TransferredInvoice;
use super::money::MinorUnits;
use crate::error::Result;
use async_trait::async_trait;

/// The admin backend that owns workers and the transfer ledger.
#[async_trait]
pub trait WorkerBackend: Send + Sync {
    async fn list_workers(&self) -> Result<Vec<Account>>;
    async fn create_worker(&self, worker: &NewWorker) -> Result<Account>;
    async fn update_limit(&self, account_id: &str, daily_limit: MinorUnits) -> Result<Account>;
    async fn delete_worker(&self, account_id: &str) -> Result<()>;
    async fn transferred_invoices(&self) -> Result<Vec<TransferredInvoice>>;
}

pub type WorkerBackendBox = Box<dyn WorkerBackend>;
