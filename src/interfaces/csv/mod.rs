pub mod account_writer;
pub mod export_writer;
