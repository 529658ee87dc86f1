pub mod admin_cli;
pub mod auth;
pub mod core;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod utils;
pub mod web;

pub use error::{AppError, Result};
pub use web::{build_rocket, start_web_server};
