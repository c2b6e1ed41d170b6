//! Application layer: the reconciliation engine and the dashboard service.
//!
//! `reconciliation` holds the pure functions that derive account statistics
//! from the transfer ledger. `Dashboard` drives the backend and calls into the
//! engine once per refresh cycle.

pub mod dashboard;
pub mod reconciliation;
