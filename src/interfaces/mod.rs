//! Input and output formats: CSV tables for operators, JSON snapshots for offline use.

pub mod csv;
pub mod snapshot;
