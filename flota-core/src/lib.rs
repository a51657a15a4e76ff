pub mod common;
pub mod constants;
pub mod domain;
pub mod reconcile;
pub mod storage;

#[cfg(feature = "db")]
pub mod database;

pub use common::error::{FlotaError, Result};
pub use domain::*;

// Re-export database manager when db feature is enabled
#[cfg(feature = "db")]
pub use database::DatabaseManager;
