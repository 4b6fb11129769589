//! sw-core - Core library for Stepwise
//!
//! This crate provides the revision type, migration discovery, the persisted
//! progress cursor, the run lock, and configuration parsing shared by the
//! runner and the CLI.

pub mod config;
pub mod error;
pub mod lock;
pub mod migration;
pub mod progress;
pub mod revision;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, DbType};
pub use error::{CoreError, CoreResult};
pub use lock::{LockGuard, LockInfo, RunLock};
pub use migration::{Migration, MigrationSet, MANUAL_INSTALLATION_MARKER};
pub use progress::ProgressStore;
pub use revision::Revision;
