//! WifiWidget - Configuration Library
//!
//! Configuration state for a home-screen Wi-Fi widget: which properties the
//! widget shows, in which order, how it looks and how often it refreshes.
//! Every value is edited as a *pending* copy and committed or discarded
//! explicitly, so a configuration screen can offer save/discard and warn
//! about unsaved changes.
//!
//! # Module Structure
//!
//! - **`shared`** - Cross-cutting concerns
//!   - Error types
//!   - Application configuration (TOML file plus environment overrides)
//!   - Tracing setup
//!
//! - **`reversible`** - Generic reversible state
//!   - Scalar flows and fixed-key maps with applied/pending values
//!   - Compositions committed in order with fail-fast semantics
//!   - Guarded setters
//!
//! - **`widget`** - The widget configuration
//!   - Domain model and JSON preferences store
//!   - Persistence ports per configuration value
//!   - Refresh worker and location access handling
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wifiwidget::shared::AppConfig;
//! use wifiwidget::widget::{
//!     PreferencesStore, RefreshWorkerManager, WidgetConfiguration, WidgetHost, WidgetRepository,
//! };
//!
//! # async fn example(host: Arc<dyn WidgetHost>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let store = match &config.preferences_path {
//!     Some(path) => PreferencesStore::open(path),
//!     None => PreferencesStore::in_memory(),
//! };
//! let repository = WidgetRepository::new(Arc::new(store));
//! let refresh = Arc::new(RefreshWorkerManager::new(config.minimum_refresh_interval));
//!
//! let mut configuration = WidgetConfiguration::load(&repository, refresh, host, &config).await?;
//! configuration.set_opacity(0.8)?;
//! if configuration.has_unsynced_changes() {
//!     configuration.sync().await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - Reversible states have a single owner; edits take `&mut self`
//! - Persistence ports are `Send + Sync` and shared through `Arc`
//! - The refresh worker communicates through `watch` channels
//!
//! # Error Handling
//!
//! - `PersistenceError` for failed reads and writes; a failed commit keeps pending edits
//! - `StateError` for edits addressing a key outside a map's key set
//! - `ConfigError` for invalid configuration files or values

/// Errors, configuration and tracing
pub mod shared;

/// Reversible state primitives
pub mod reversible;

/// Widget configuration
pub mod widget;
