//! # Widget
//!
//! The Wi-Fi widget's configuration, built on the reversible state core.
//!
//! ## Key Components
//!
//! - `model.rs`: properties, bottom bar elements, appearance options
//! - `store.rs`: JSON preferences document backing every value
//! - `repository.rs`: one persistence port per configuration value
//! - `refresh.rs`: refresh schedule and background refresh worker
//! - `location.rs`: location access permission requests
//! - `configuration.rs`: the composed, committable configuration session

pub mod configuration;
pub mod location;
pub mod model;
pub mod refresh;
pub mod repository;
pub mod store;

pub use configuration::{CheckChangeDenial, ConfigurationEvent, WidgetConfiguration, WidgetStates};
pub use location::{LocationAccessPermissionRequestTrigger, LocationAccessState};
pub use refresh::{RefreshSchedule, RefreshStatus, RefreshWorkerManager, WidgetHost};
pub use repository::WidgetRepository;
pub use store::PreferencesStore;
