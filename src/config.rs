//! Runtime settings shared by every `payrelay` subcommand.

use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DEPLOYMENT: &str = "payment_processor";

pub const ROCKSDB_FALLBACK_WARNING: &str = "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.";

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Deployment identifier the processor record is stored under
    #[arg(long, global = true, env = "PAYRELAY_DEPLOYMENT", default_value = DEFAULT_DEPLOYMENT)]
    pub deployment: String,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "PAYRELAY_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log filter, e.g. `info` or `payrelay=debug`
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Where processor records and token accounts are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    #[cfg(feature = "storage-rocksdb")]
    RocksDb(PathBuf),
}

impl Settings {
    /// Resolves the backend. Without the `storage-rocksdb` feature a requested database path
    /// is ignored after logging [`ROCKSDB_FALLBACK_WARNING`], so call this after
    /// [`Settings::init_tracing`].
    pub fn storage_backend(&self) -> StorageBackend {
        match &self.db_path {
            None => StorageBackend::InMemory,
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => StorageBackend::RocksDb(path.clone()),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(_) => {
                tracing::warn!("{}", ROCKSDB_FALLBACK_WARNING);
                StorageBackend::InMemory
            }
        }
    }

    /// Installs the global `tracing` subscriber, logging to stderr.
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init_tracing(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_new(&self.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(db_path: Option<&str>) -> Settings {
        Settings {
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            db_path: db_path.map(PathBuf::from),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_in_memory_without_db_path() {
        assert_eq!(settings(None).storage_backend(), StorageBackend::InMemory);
    }

    #[cfg(feature = "storage-rocksdb")]
    #[test]
    fn test_rocksdb_with_db_path() {
        assert_eq!(
            settings(Some("db")).storage_backend(),
            StorageBackend::RocksDb(PathBuf::from("db"))
        );
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    #[test]
    fn test_db_path_falls_back_without_feature() {
        assert_eq!(settings(Some("db")).storage_backend(), StorageBackend::InMemory);
    }

    #[test]
    fn test_tracing_installs_once() {
        let settings = settings(None);
        // Another test may have installed the subscriber first
        let _ = settings.init_tracing();
        assert!(settings.init_tracing().is_err());
    }
}
