//! Libris Library Catalog Server
//!
//! Models books, authors, genres and physical copies, and serves the catalog
//! browsing views plus the librarian console over a REST JSON API.

use std::sync::Arc;

pub mod admin;
pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
