use crate::domain::account::{Account, AccountStatus};
use crate::domain::money::MinorUnits;
use crate::domain::timestamp::TimestampStyle;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const HEADERS: [&str; 7] = [
    "account_id",
    "friendly_name",
    "status",
    "daily_limit",
    "gross_volume",
    "transferred_invoices",
    "last_transfer",
];

#[derive(Serialize)]
struct AccountRow<'a> {
    account_id: &'a str,
    friendly_name: &'a str,
    status: AccountStatus,
    daily_limit: MinorUnits,
    gross_volume: MinorUnits,
    transferred_invoices: usize,
    last_transfer: String,
}

/// Writes the account roll-up table as CSV.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
    style: TimestampStyle,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W, style: TimestampStyle) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
            style,
        }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        self.writer.write_record(HEADERS)?;
        for account in accounts {
            self.writer.serialize(AccountRow {
                account_id: &account.account_id,
                friendly_name: &account.friendly_name,
                status: account.status,
                daily_limit: account.daily_limit,
                gross_volume: account.gross_volume,
                transferred_invoices: account.transferred_invoices,
                last_transfer: account.last_transfer_display(&self.style),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timestamp::TransferDate;

    #[test]
    fn test_write_accounts() {
        let mut busy = Account::new("a1", "First", "http://w1:4000", MinorUnits(1000));
        busy.gross_volume = MinorUnits(800);
        busy.transferred_invoices = 2;
        busy.last_transfer = Some(TransferDate::parse("2024-01-02T00:00:00Z"));
        let mut idle = Account::new("a2", "Second", "http://w2:4000", MinorUnits(2000));
        idle.status = AccountStatus::Inactive;

        let mut buf = Vec::new();
        AccountWriter::new(&mut buf, TimestampStyle::utc())
            .write_accounts(&[busy, idle])
            .unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "account_id,friendly_name,status,daily_limit,gross_volume,transferred_invoices,last_transfer"
        );
        assert_eq!(lines[1], "a1,First,ACTIVE,1000,800,2,\"02.01.2024, 00:00:00\"");
        assert_eq!(lines[2], "a2,Second,INACTIVE,2000,0,0,N/A");
    }

    #[test]
    fn test_header_without_accounts() {
        let mut buf = Vec::new();
        AccountWriter::new(&mut buf, TimestampStyle::utc())
            .write_accounts(&[])
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
