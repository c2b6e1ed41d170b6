use crate::application::reconciliation::ExportRecord;
use crate::error::Result;
use chrono::NaiveDate;
use std::io::Write;

/// File name offered for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("stripe-invoices-export-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes invoice export rows as CSV.
///
/// The header is emitted even when there are no rows so that the column set
/// is the same for every export.
pub struct ExportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ExportWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = ExportRecord>,
    {
        self.writer.write_record(ExportRecord::HEADERS)?;
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
