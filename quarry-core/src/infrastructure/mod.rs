// quarry-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod history_store;

pub use history_store::HistoryStore;
