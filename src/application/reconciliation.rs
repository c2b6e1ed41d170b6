//! Joins the transfer ledger to the worker accounts.
//!
//! Every function here is pure: inputs are borrowed, outputs are fresh values,
//! and invoices that reference an unknown account are tolerated rather than
//! reported.

use crate::domain::account::Account;
use crate::domain::invoice::TransferredInvoice;
use crate::domain::money::{Currency, MinorUnits};
use crate::domain::timestamp::{TimestampStyle, TransferDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Returns `accounts` with `gross_volume`, `transferred_invoices` and
/// `last_transfer` recomputed from `invoices`.
///
/// Order and every other field are preserved. The last transfer is the latest
/// `transfer_date` among the account's invoices; when several share it, the
/// one appearing first in `invoices` wins. Backend ordering is not assumed.
pub fn recompute_account_stats(
    accounts: &[Account],
    invoices: &[TransferredInvoice],
) -> Vec<Account> {
    accounts
        .iter()
        .map(|account| {
            let mut gross_volume = MinorUnits::ZERO;
            let mut transferred_invoices = 0;
            let mut latest: Option<&TransferDate> = None;

            for invoice in invoices.iter().filter(|i| i.is_from(&account.account_id)) {
                gross_volume += invoice.amount;
                transferred_invoices += 1;
                latest = match latest {
                    Some(best) if invoice.transfer_date.instant() <= best.instant() => Some(best),
                    _ => Some(&invoice.transfer_date),
                };
            }

            Account {
                gross_volume,
                transferred_invoices,
                last_transfer: latest.cloned(),
                ..account.clone()
            }
        })
        .collect()
}

/// Invoices transferred by `account_id`, in input order.
///
/// `None` or an empty id selects every invoice.
pub fn filter_by_account<'a>(
    invoices: &'a [TransferredInvoice],
    account_id: Option<&str>,
) -> Vec<&'a TransferredInvoice> {
    match account_id.filter(|id| !id.is_empty()) {
        None => invoices.iter().collect(),
        Some(id) => invoices.iter().filter(|i| i.is_from(id)).collect(),
    }
}

/// Count and sum of a set of invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub count: usize,
    pub total_amount: MinorUnits,
    pub currency: Currency,
}

impl InvoiceTotals {
    pub fn formatted_total(&self) -> String {
        self.currency.format_amount(self.total_amount)
    }
}

/// Totals over `invoices`.
///
/// The currency label is taken from the first invoice (`usd` when empty) while
/// the amount sums every invoice regardless of currency. Use
/// [`aggregate_by_currency`] for a mixed-currency ledger.
pub fn aggregate_totals<'a, I>(invoices: I) -> InvoiceTotals
where
    I: IntoIterator<Item = &'a TransferredInvoice>,
{
    let mut iter = invoices.into_iter().peekable();
    let currency = iter
        .peek()
        .map(|invoice| invoice.currency.clone())
        .unwrap_or_default();

    let (count, total_amount) = iter.fold((0, MinorUnits::ZERO), |(count, total), invoice| {
        (count + 1, total + invoice.amount)
    });

    InvoiceTotals {
        count,
        total_amount,
        currency,
    }
}

/// One [`InvoiceTotals`] per distinct currency, ordered by currency code.
pub fn aggregate_by_currency<'a, I>(invoices: I) -> Vec<InvoiceTotals>
where
    I: IntoIterator<Item = &'a TransferredInvoice>,
{
    let mut groups: BTreeMap<&Currency, Vec<&TransferredInvoice>> = BTreeMap::new();
    for invoice in invoices {
        groups.entry(&invoice.currency).or_default().push(invoice);
    }
    groups
        .into_values()
        .map(|group| aggregate_totals(group))
        .collect()
}

/// A flat export row. Fields serialize in [`ExportRecord::HEADERS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub stripe_invoice_id: String,
    pub amount: MinorUnits,
    pub currency: Currency,
    pub transfer_date: String,
    pub worker_id: String,
    pub worker_name: String,
    pub log_id: String,
}

impl ExportRecord {
    pub const HEADERS: [&'static str; 7] = [
        "Stripe Invoice ID",
        "Amount",
        "Currency",
        "Transfer Date",
        "Worker ID",
        "Worker Name",
        "Log ID",
    ];
}

/// Flattens invoices into export rows, one per invoice and in the same order.
///
/// The worker name comes from the invoice when the backend supplied it, else
/// from the matching account, else it is left empty.
pub fn format_for_export<'a, I>(
    invoices: I,
    accounts: &[Account],
    style: &TimestampStyle,
) -> Vec<ExportRecord>
where
    I: IntoIterator<Item = &'a TransferredInvoice>,
{
    let names: BTreeMap<&str, &str> = accounts
        .iter()
        .map(|a| (a.account_id.as_str(), a.friendly_name.as_str()))
        .collect();

    invoices
        .into_iter()
        .map(|invoice| ExportRecord {
            stripe_invoice_id: invoice.stripe_invoice_id.clone(),
            amount: invoice.amount,
            currency: invoice.currency.clone(),
            transfer_date: style.render(&invoice.transfer_date),
            worker_id: invoice.transferred_by_worker.clone(),
            worker_name: invoice
                .worker_friendly_name
                .as_deref()
                .or_else(|| names.get(invoice.transferred_by_worker.as_str()).copied())
                .unwrap_or_default()
                .to_string(),
            log_id: invoice.log_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> Account {
        Account::new(id, format!("Worker {id}"), format!("http://{id}:4000"), MinorUnits(1000))
    }

    fn invoice(log_id: &str, amount: u64, worker: &str, date: &str) -> TransferredInvoice {
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

    #[test]
    fn test_last_transfer_ignores_input_order() {
        let accounts = vec![account("a1")];
        let invoices = vec![
            invoice("L2", 300, "a1", "2024-01-01T00:00:00Z"),
            invoice("L1", 500, "a1", "2024-01-02T00:00:00Z"),
        ];

        let result = recompute_account_stats(&accounts, &invoices);
        let last = result[0].last_transfer.as_ref().unwrap();
        assert_eq!(last.as_str(), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_last_transfer_tie_keeps_first() {
        let accounts = vec![account("a1")];
        let invoices = vec![
            invoice("L1", 1, "a1", "2024-01-02T00:00:00Z"),
            invoice("L2", 1, "a1", "2024-01-02T00:00:00.000Z"),
        ];

        let result = recompute_account_stats(&accounts, &invoices);
        let last = result[0].last_transfer.as_ref().unwrap();
        assert_eq!(last.as_str(), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_unparseable_date_loses_to_parsed() {
        let accounts = vec![account("a1")];
        let invoices = vec![
            invoice("L1", 1, "a1", "not a date"),
            invoice("L2", 1, "a1", "2020-01-01T00:00:00Z"),
        ];

        let result = recompute_account_stats(&accounts, &invoices);
        assert_eq!(
            result[0].last_transfer.as_ref().unwrap().as_str(),
            "2020-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_recompute_overwrites_stale_stats() {
        let mut stale = account("a1");
        stale.gross_volume = MinorUnits(42);
        stale.transferred_invoices = 9;
        stale.last_transfer = Some(TransferDate::parse("2000-01-01T00:00:00Z"));

        let result = recompute_account_stats(&[stale], &[]);
        assert_eq!(result[0].gross_volume, MinorUnits::ZERO);
        assert_eq!(result[0].transferred_invoices, 0);
        assert!(result[0].last_transfer.is_none());
    }

    #[test]
    fn test_filter_empty_id_is_all() {
        let invoices = vec![invoice("L1", 1, "a1", "2024-01-01T00:00:00Z")];
        assert_eq!(filter_by_account(&invoices, Some("")).len(), 1);
    }

    #[test]
    fn test_aggregate_mixed_currency_uses_first_label() {
        let mut eur = invoice("L2", 250, "a1", "2024-01-01T00:00:00Z");
        eur.currency = Currency::new("eur");
        let invoices = vec![invoice("L1", 100, "a1", "2024-01-01T00:00:00Z"), eur];

        let totals = aggregate_totals(&invoices);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total_amount, MinorUnits(350));
        assert_eq!(totals.currency.code(), "usd");

        let by_currency = aggregate_by_currency(&invoices);
        assert_eq!(by_currency.len(), 2);
        assert_eq!(by_currency[0].currency.code(), "eur");
        assert_eq!(by_currency[0].total_amount, MinorUnits(250));
        assert_eq!(by_currency[1].currency.code(), "usd");
        assert_eq!(by_currency[1].total_amount, MinorUnits(100));
    }

    #[test]
    fn test_export_worker_name_resolution() {
        let accounts = vec![account("a1")];
        let mut named = invoice("L1", 1, "a2", "2024-01-01T00:00:00Z");
        named.worker_friendly_name = Some("Backend Name".to_string());
        let invoices = vec![
            named,
            invoice("L2", 1, "a1", "2024-01-01T00:00:00Z"),
            invoice("L3", 1, "ghost", "2024-01-01T00:00:00Z"),
        ];

        let rows = format_for_export(&invoices, &accounts, &TimestampStyle::utc());
        let names: Vec<&str> = rows.iter().map(|r| r.worker_name.as_str()).collect();
        assert_eq!(names, vec!["Backend Name", "Worker a1", ""]);
        assert_eq!(rows[0].transfer_date, "01.01.2024, 00:00:00");
    }
}
