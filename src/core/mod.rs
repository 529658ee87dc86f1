// src/core/mod.rs
//! Infrastructure shared by the services and the web layer

pub mod config_manager;
pub mod database;
pub mod locks;

pub use config_manager::{ConfigManager, EnvironmentConfig};
pub use database::Database;
pub use locks::{KeyedLocks, WriteLocks};
