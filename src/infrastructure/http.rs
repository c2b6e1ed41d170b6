use crate::config::BackendSettings;
use crate::domain::account::{Account, LimitUpdate, NewWorker};
use crate::domain::invoice::{InvoiceLedger, TransferredInvoice};
use crate::domain::money::MinorUnits;
use crate::domain::ports::WorkerBackend;
use crate::error::{ApiOperation, DashboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// `WorkerBackend` over the admin REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(DashboardError::ClientSetup)?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    /// Joins percent-encoded path segments onto the base URL, keeping any
    /// path prefix the base already has.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DashboardError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn workers_url(&self) -> Result<Url> {
        self.endpoint(&["admin", "workers"])
    }

    fn worker_url(&self, account_id: &str) -> Result<Url> {
        self.endpoint(&["admin", "workers", account_id])
    }

    async fn send(
        &self,
        operation: ApiOperation,
        request: reqwest::RequestBuilder,
    ) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| DashboardError::Transport { operation, source })?;

        let status = response.status();
        debug!(%operation, status = status.as_u16(), url = %response.url(), "Backend responded");
        if !status.is_success() {
            warn!(%operation, status = status.as_u16(), "Backend call failed");
            return Err(DashboardError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|source| DashboardError::Decode { operation, source })
    }
}

#[async_trait]
impl WorkerBackend for HttpBackend {
    async fn list_workers(&self) -> Result<Vec<Account>> {
        let url = self.workers_url()?;
        self.send_json(ApiOperation::ListWorkers, self.client.get(url))
            .await
    }

    async fn create_worker(&self, worker: &NewWorker) -> Result<Account> {
        let url = self.workers_url()?;
        self.send_json(
            ApiOperation::CreateWorker,
            self.client.post(url).json(worker),
        )
        .await
    }

    async fn update_limit(&self, account_id: &str, daily_limit: MinorUnits) -> Result<Account> {
        let url = self.endpoint(&["admin", "workers", account_id, "limit"])?;
        self.send_json(
            ApiOperation::UpdateLimit,
            self.client.post(url).json(&LimitUpdate { daily_limit }),
        )
        .await
    }

    async fn delete_worker(&self, account_id: &str) -> Result<()> {
        let url = self.worker_url(account_id)?;
        // 200 and 204 both signal success; the body is ignored.
        self.send(ApiOperation::DeleteWorker, self.client.delete(url))
            .await
            .map(|_| ())
    }

    async fn transferred_invoices(&self) -> Result<Vec<TransferredInvoice>> {
        let url = self.endpoint(&["admin", "workers", "transferred-invoices"])?;
        let ledger: InvoiceLedger = self
            .send_json(ApiOperation::ListTransferredInvoices, self.client.get(url))
            .await?;
        Ok(ledger.invoices)
    }
}
