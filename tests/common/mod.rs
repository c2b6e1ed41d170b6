#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;
use workerdesk::domain::account::Account;
use workerdesk::domain::invoice::TransferredInvoice;
use workerdesk::domain::money::{Currency, MinorUnits};
use workerdesk::domain::timestamp::TransferDate;
use workerdesk::interfaces::snapshot::Snapshot;

pub fn account(id: &str, daily_limit: u64) -> Account {
    Account::new(
        id,
        format!("Worker {id}"),
        format!("http://{id}.workers.local:4000"),
        MinorUnits(daily_limit),
    )
}

pub fn invoice(log_id: &str, amount: u64, worker: &str, date: &str) -> TransferredInvoice {
    TransferredInvoice {
        log_id: log_id.to_string(),
        stripe_invoice_id: format!("in_{log_id}"),
        amount: MinorUnits(amount),
        currency: Currency::new("usd"),
        transferred_by_worker: worker.to_string(),
        transfer_date: TransferDate::parse(date),
        worker_friendly_name: None,
    }
}

/// Two accounts and three invoices: a1 moved 500 + 300, a2 moved 900.
pub fn example_accounts() -> Vec<Account> {
    vec![account("a1", 1000), account("a2", 2000)]
}

pub fn example_invoices() -> Vec<TransferredInvoice> {
    vec![
        invoice("L1", 500, "a1", "2024-01-02T00:00:00Z"),
        invoice("L2", 300, "a1", "2024-01-01T00:00:00Z"),
        invoice("L3", 900, "a2", "2024-01-03T00:00:00Z"),
    ]
}

/// The example ledger plus an invoice from a worker that no longer exists.
pub fn example_invoices_with_orphan() -> Vec<TransferredInvoice> {
    let mut invoices = example_invoices();
    invoices.push(invoice("L4", 100, "unknown", "2024-01-04T00:00:00Z"));
    invoices
}

pub fn write_snapshot(workers: Vec<Account>, invoices: Vec<TransferredInvoice>) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let snapshot = Snapshot { workers, invoices };
    writeln!(file, "{}", serde_json::to_string(&snapshot).unwrap()).unwrap();
    file
}
