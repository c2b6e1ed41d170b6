//! Domain types shared by the reconciliation engine, the backend adapters and the CLI.

pub mod account;
pub mod invoice;
pub mod money;
pub mod ports;
pub mod timestamp;
