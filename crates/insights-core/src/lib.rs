//! # insights-core
//!
//! Core library for the account insights console.
//!
//! Holds everything the `insights` binary needs apart from argument parsing:
//! the HTTP client, the query/result coordination behind the accounts
//! explorer, the dashboard and analytics views, configuration and display.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use insights_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> insights_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = InsightsClient::with_token(
//!         config.get_url().unwrap_or_default(),
//!         std::env::var("INSIGHTS_TOKEN").unwrap_or_default(),
//!     )?;
//!
//!     let mut explorer = AccountsExplorer::new(Arc::new(client), ExplorerOptions::default());
//!     explorer.start();
//!     explorer.set_search("acme");
//!     explorer.next_event().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           API Layer                 │  HTTP client, envelopes, models
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  Query state, explorer, views, services
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  Configuration, token lookup
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  Validation, formatting, error helpers
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: Insights HTTP client and data models
//! - [`core`]: Query coordination, views and services
//! - [`storage`]: Configuration and credentials
//! - [`utils`]: Shared utilities
//! - [`display`]: Table rendering
//! - [`error`]: Hierarchical error system with troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use insights_core::prelude::*;
/// ```
pub mod prelude {
    // Error handling
    pub use crate::Result;
    pub use crate::error::{ApiError, AppError};

    // API client and models
    pub use crate::api::client::InsightsClient;
    pub use crate::api::models::{AccountRecord, AccountsPage, Audience, Summary};

    // Query state and views
    pub use crate::core::explorer::{AccountsExplorer, ExplorerEvent, ExplorerOptions};
    pub use crate::core::query::{
        PageSize, QueryParams, ResultState, SortDirection, SortField, StatusFilter,
    };
    pub use crate::core::views::{AnalyticsView, DashboardView};

    // Services
    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::ingestion_service::IngestionService;

    // Storage
    pub use crate::storage::config::Config;
    pub use crate::storage::credentials::resolve_token;

    // Display utilities
    pub use crate::display::TableDisplay;
}

/// Business logic layer.
///
/// - [`core::query`]: query parameters, debouncing, assembly, cursor, result state
/// - [`core::explorer`]: the accounts explorer
/// - [`core::views`]: dashboard and analytics views
/// - [`core::services`]: data source traits, configuration and ingestion
pub mod core;

/// Storage layer - configuration and credentials.
pub mod storage;

/// Utilities layer - shared helpers.
pub mod utils;

/// API layer - insights HTTP client and data models.
pub mod api;

/// Display layer - terminal tables.
pub mod display;

/// Error handling - hierarchical error system.
///
/// - Domain-specific error variants (API, Config, Ingestion, ...)
/// - Severity levels (Critical, High, Medium, Low)
/// - Troubleshooting hints for common issues
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
