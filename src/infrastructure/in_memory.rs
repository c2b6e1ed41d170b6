use crate::domain::account::{Account, NewWorker};
use crate::domain::invoice::TransferredInvoice;
use crate::domain::money::MinorUnits;
use crate::domain::ports::WorkerBackend;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory backend.
///
/// Holds workers in insertion order and an immutable-by-API ledger. Used by
/// tests and by the CLI's offline snapshot mode; nothing is persisted.
#[derive(Default, Clone)]
pub struct InMemoryBackend {
    workers: Arc<RwLock<Vec<Account>>>,
    invoices: Arc<RwLock<Vec<TransferredInvoice>>>,
}

impl InMemoryBackend {
    /// Creates a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(workers: Vec<Account>, invoices: Vec<TransferredInvoice>) -> Self {
        Self {
            workers: Arc::new(RwLock::new(workers)),
            invoices: Arc::new(RwLock::new(invoices)),
        }
    }

    /// Appends a ledger entry, as a worker would after a transfer.
    pub async fn record_transfer(&self, invoice: TransferredInvoice) {
        self.invoices.write().await.push(invoice);
    }
}

#[async_trait]
impl WorkerBackend for InMemoryBackend {
    async fn list_workers(&self) -> Result<Vec<Account>> {
        Ok(self.workers.read().await.clone())
    }

    async fn create_worker(&self, worker: &NewWorker) -> Result<Account> {
        let mut workers = self.workers.write().await;
        if workers.iter().any(|a| a.account_id == worker.account_id) {
            return Err(DashboardError::Validation(format!(
                "account id '{}' already exists",
                worker.account_id
            )));
        }
        let account = Account::new(
            worker.account_id.clone(),
            worker.friendly_name.clone(),
            worker.worker_url.clone(),
            worker.daily_limit,
        );
        workers.push(account.clone());
        Ok(account)
    }

    async fn update_limit(&self, account_id: &str, daily_limit: MinorUnits) -> Result<Account> {
        let mut workers = self.workers.write().await;
        let account = workers
            .iter_mut()
            .find(|a| a.account_id == account_id)
            .ok_or_else(|| DashboardError::UnknownAccount(account_id.to_string()))?;
        account.daily_limit = daily_limit;
        Ok(account.clone())
    }

    async fn delete_worker(&self, account_id: &str) -> Result<()> {
        let mut workers = self.workers.write().await;
        let before = workers.len();
        workers.retain(|a| a.account_id != account_id);
        if workers.len() == before {
            return Err(DashboardError::UnknownAccount(account_id.to_string()));
        }
        Ok(())
    }

    async fn transferred_invoices(&self) -> Result<Vec<TransferredInvoice>> {
        Ok(self.invoices.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn new_worker(id: &str) -> NewWorker {
        NewWorker {
            account_id: id.to_string(),
            friendly_name: format!("Worker {id}"),
            worker_url: "http://127.0.0.1:4000".to_string(),
            daily_limit: MinorUnits(500),
            stripe_api_key: SecretString::new("sk_test_1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let backend = InMemoryBackend::new();
        backend.create_worker(&new_worker("a1")).await.unwrap();
        backend.create_worker(&new_worker("a2")).await.unwrap();

        let ids: Vec<String> = backend
            .list_workers()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.account_id)
            .collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_duplicate_account_id_rejected() {
        let backend = InMemoryBackend::new();
        backend.create_worker(&new_worker("a1")).await.unwrap();
        let result = backend.create_worker(&new_worker("a1")).await;
        assert!(matches!(result, Err(DashboardError::Validation(_))));
        assert_eq!(backend.list_workers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_limit_and_delete() {
        let backend = InMemoryBackend::new();
        backend.create_worker(&new_worker("a1")).await.unwrap();

        let updated = backend.update_limit("a1", MinorUnits(9000)).await.unwrap();
        assert_eq!(updated.daily_limit, MinorUnits(9000));

        backend.delete_worker("a1").await.unwrap();
        assert!(backend.list_workers().await.unwrap().is_empty());
        assert!(matches!(
            backend.delete_worker("a1").await,
            Err(DashboardError::UnknownAccount(_))
        ));
    }
}
