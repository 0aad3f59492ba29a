//! Application layer orchestrating the relay's operations.
//!
//! This module defines the `RelayEngine`, the entry point for administrative requests,
//! payments and state queries against one deployment. It owns the storage ports and
//! serializes commits so the domain rules always see a consistent record.

pub mod engine;
