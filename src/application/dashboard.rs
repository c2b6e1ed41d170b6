use crate::application::reconciliation::{
    InvoiceTotals, aggregate_totals, filter_by_account, recompute_account_stats,
};
use crate::domain::account::{Account, NewWorker};
use crate::domain::invoice::TransferredInvoice;
use crate::domain::money::{Currency, MinorUnits};
use crate::domain::ports::WorkerBackendBox;
use crate::error::{DashboardError, Result};
use serde::Serialize;
use tracing::{info, warn};

/// The snapshot of one refresh cycle plus the operator's selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub accounts: Vec<Account>,
    pub invoices: Vec<TransferredInvoice>,
    pub active_account: Option<String>,
}

/// Headline figures over the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub total_volume: MinorUnits,
    /// Label for `total_volume`; see [`aggregate_totals`] for mixed ledgers.
    pub currency: Currency,
    pub total_transfers: usize,
    pub active_account: Option<Account>,
}

impl DashboardSummary {
    pub fn formatted_volume(&self) -> String {
        self.currency.format_amount(self.total_volume)
    }
}

/// The statistics view for one account, or for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceView<'a> {
    pub account_filter: Option<&'a str>,
    pub invoices: Vec<&'a TransferredInvoice>,
    pub totals: InvoiceTotals,
}

/// Operator-facing service over the worker backend.
///
/// `Dashboard` owns the backend and the current [`DashboardState`]. Every
/// mutation is followed by a full refresh so the derived account statistics
/// always come from a single consistent snapshot. A mutation reports its own
/// outcome: when only the follow-up refresh fails, the mutation still
/// succeeds and the previous snapshot stays in place until the next refresh.
pub struct Dashboard {
    backend: WorkerBackendBox,
    state: DashboardState,
}

impl Dashboard {
    pub fn new(backend: WorkerBackendBox) -> Self {
        Self {
            backend,
            state: DashboardState::default(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn accounts(&self) -> &[Account] {
        &self.state.accounts
    }

    pub fn invoices(&self) -> &[TransferredInvoice] {
        &self.state.invoices
    }

    /// Fetches workers and the transfer ledger, then recomputes account stats once.
    ///
    /// Both requests run concurrently; if either fails the previous snapshot is
    /// kept unchanged.
    pub async fn refresh(&mut self) -> Result<()> {
        let (workers, invoices) = tokio::try_join!(
            self.backend.list_workers(),
            self.backend.transferred_invoices()
        )?;

        let accounts = recompute_account_stats(&workers, &invoices);

        let selection_gone = self
            .state
            .active_account
            .as_deref()
            .is_some_and(|id| !accounts.iter().any(|a| a.account_id == id));
        if selection_gone {
            warn!(
                account_id = ?self.state.active_account,
                "Active account no longer exists, clearing selection"
            );
            self.state.active_account = None;
        }
        if self.state.active_account.is_none() {
            self.state.active_account = accounts.first().map(|a| a.account_id.clone());
        }

        info!(
            accounts = accounts.len(),
            invoices = invoices.len(),
            "Refreshed dashboard snapshot"
        );
        self.state.accounts = accounts;
        self.state.invoices = invoices;
        Ok(())
    }

    pub async fn add_worker(&mut self, worker: NewWorker) -> Result<Account> {
        worker.validate()?;
        let created = self.backend.create_worker(&worker).await?;
        info!(
            account_id = %created.account_id,
            friendly_name = %created.friendly_name,
            "Worker created"
        );
        self.refresh_after_change().await;
        Ok(created)
    }

    pub async fn update_limit(
        &mut self,
        account_id: &str,
        daily_limit: MinorUnits,
    ) -> Result<Account> {
        let updated = self.backend.update_limit(account_id, daily_limit).await?;
        info!(account_id, daily_limit = daily_limit.value(), "Daily limit updated");
        self.refresh_after_change().await;
        Ok(updated)
    }

    pub async fn delete_worker(&mut self, account_id: &str) -> Result<()> {
        self.backend.delete_worker(account_id).await?;
        info!(account_id, "Worker deleted");
        self.refresh_after_change().await;
        Ok(())
    }

    async fn refresh_after_change(&mut self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Refresh after change failed, keeping previous snapshot");
        }
    }

    /// Makes `account_id` the active account. It must be in the current snapshot.
    pub fn select_account(&mut self, account_id: &str) -> Result<&Account> {
        let account = self
            .state
            .accounts
            .iter()
            .find(|a| a.account_id == account_id)
            .ok_or_else(|| DashboardError::UnknownAccount(account_id.to_string()))?;
        self.state.active_account = Some(account.account_id.clone());
        Ok(account)
    }

    pub fn active_account(&self) -> Option<&Account> {
        let id = self.state.active_account.as_deref()?;
        self.state.accounts.iter().find(|a| a.account_id == id)
    }

    pub fn summary(&self) -> DashboardSummary {
        let totals = aggregate_totals(&self.state.invoices);
        DashboardSummary {
            total_accounts: self.state.accounts.len(),
            active_accounts: self.state.accounts.iter().filter(|a| a.is_active()).count(),
            total_volume: totals.total_amount,
            currency: totals.currency,
            total_transfers: totals.count,
            active_account: self.active_account().cloned(),
        }
    }

    /// Invoices for `account_filter` (all when `None`) together with their totals.
    pub fn invoice_view<'a>(&'a self, account_filter: Option<&'a str>) -> InvoiceView<'a> {
        let invoices = filter_by_account(&self.state.invoices, account_filter);
        let totals = aggregate_totals(invoices.iter().copied());
        InvoiceView {
            account_filter: account_filter.filter(|id| !id.is_empty()),
            invoices,
            totals,
        }
    }
}
