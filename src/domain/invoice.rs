use super::money::{Currency, MinorUnits};
use super::timestamp::TransferDate;
use serde::{Deserialize, Serialize};

/// One transfer event: an invoice on the payment platform handed over to a worker.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransferredInvoice {
    /// Identifier of the transfer event, not of the invoice.
    pub log_id: String,
    pub stripe_invoice_id: String,
    pub amount: MinorUnits,
    pub currency: Currency,
    /// The `account_id` of the worker that made the transfer.
    pub transferred_by_worker: String,
    #[serde(default)]
    pub transfer_date: TransferDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_friendly_name: Option<String>,
}

impl TransferredInvoice {
    pub fn is_from(&self, account_id: &str) -> bool {
        self.transferred_by_worker == account_id
    }
}

/// Envelope of `GET /admin/workers/transferred-invoices`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct InvoiceLedger {
    pub invoices: Vec<TransferredInvoice>,
}
