//! Configuration for planstore
//!
//! This crate provides:
//! - Path utilities for config and data files
//! - Configuration file loading (TOML)
//! - Store configuration (StoreConfig)

pub mod config_file;
pub mod paths;
pub mod store_config;

pub use config_file::load_config_file;
pub use store_config::{PersistenceConfig, StoreConfig};
