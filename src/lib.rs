//! LocalLibrary catalog server
//!
//! Authors, genres, books and their physical copies, served as pages for a view
//! renderer. Related lookups run concurrently, deletions are refused while other
//! records still reference the target, and form submissions go through a
//! declarative validation and sanitization pipeline.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
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
