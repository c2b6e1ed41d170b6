//! Backend adapters implementing [`crate::domain::ports::WorkerBackend`].

pub mod http;
pub mod in_memory;
