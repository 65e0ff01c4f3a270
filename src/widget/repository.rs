//! Widget repository
//!
//! Hands out one persistence port per configuration value, all backed by
//! the same [`PreferencesStore`]. Ports fall back to defaults for values that
//! were never written, and map ports always yield the full default key set.

use super::model::{
    ColoringConfig, FontSize, IpSubProperty, LocationParameter, PropertyValueAlignment,
    WidgetBottomBarElement, WidgetRefreshingParameter, WifiProperty,
};
use super::store::PreferencesStore;
use crate::reversible::PersistencePort;
use crate::shared::error::PersistenceError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

/// Preference keys
pub mod keys {
    pub const COLORING: &str = "coloring";
    pub const OPACITY: &str = "opacity";
    pub const FONT_SIZE: &str = "font_size";
    pub const PROPERTY_VALUE_ALIGNMENT: &str = "property_value_alignment";
    pub const WIFI_PROPERTIES: &str = "wifi_properties";
    pub const WIFI_PROPERTY_ORDER: &str = "wifi_property_order";
    pub const IP_SUB_PROPERTIES: &str = "ip_sub_properties";
    pub const BOTTOM_BAR: &str = "bottom_bar";
    pub const REFRESH_INTERVAL: &str = "refresh_interval";
    pub const REFRESHING_PARAMETERS: &str = "refreshing_parameters";
    pub const LOCATION_PARAMETERS: &str = "location_parameters";
}

pub const DEFAULT_OPACITY: f32 = 1.0;
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Check run on a scalar before it is written
pub type Validator<T> = fn(&T) -> Result<(), String>;

/// Opacity must be a finite fraction; JSON cannot hold NaN or infinities
pub fn validate_opacity(value: &f32) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(value) {
        Ok(())
    } else {
        Err(format!("opacity must be between 0 and 1, got {value}"))
    }
}

/// Scalar stored under a single key
#[derive(Debug)]
pub struct PreferencePort<T> {
    store: Arc<PreferencesStore>,
    key: &'static str,
    default: T,
    validate: Option<Validator<T>>,
}

#[async_trait]
impl<T> PersistencePort<T> for PreferencePort<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self) -> Result<T, PersistenceError> {
        Ok(self
            .store
            .get(self.key)
            .await?
            .unwrap_or_else(|| self.default.clone()))
    }

    async fn write(&self, value: T) -> Result<(), PersistenceError> {
        if let Some(validate) = self.validate {
            validate(&value).map_err(|message| PersistenceError::rejected(self.key, message))?;
        }
        self.store.put(self.key, &value).await
    }
}

#[derive(Serialize, Deserialize)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Map stored as a list of entries under a single key.
///
/// Entry lists keep non-string keys (such as [`IpSubProperty`]) JSON-friendly.
#[derive(Debug)]
pub struct MapPreferencePort<K, V> {
    store: Arc<PreferencesStore>,
    key: &'static str,
    defaults: BTreeMap<K, V>,
}

#[async_trait]
impl<K, V> PersistencePort<BTreeMap<K, V>> for MapPreferencePort<K, V>
where
    K: Ord + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self) -> Result<BTreeMap<K, V>, PersistenceError> {
        let mut map = self.defaults.clone();
        let stored: Vec<Entry<Value, Value>> = self.store.get(self.key).await?.unwrap_or_default();
        for entry in stored {
            let decoded = serde_json::from_value::<K>(entry.key.clone())
                .and_then(|key| Ok((key, serde_json::from_value::<V>(entry.value)?)));
            match decoded {
                Ok((key, value)) => {
                    if let Some(slot) = map.get_mut(&key) {
                        *slot = value;
                    }
                }
                Err(e) => {
                    tracing::warn!(preference = self.key, key = %entry.key, error = %e, "dropping unreadable entry");
                }
            }
        }
        Ok(map)
    }

    async fn write(&self, value: BTreeMap<K, V>) -> Result<(), PersistenceError> {
        let entries: Vec<Entry<K, V>> = value
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect();
        self.store.put(self.key, &entries).await
    }
}

/// Display order of the widget's properties.
///
/// Reads are reconciled against [`WifiProperty::ALL`]: duplicates are dropped
/// and properties missing from the stored order are appended.
#[derive(Debug)]
pub struct PropertyOrderPort {
    store: Arc<PreferencesStore>,
}

#[async_trait]
impl PersistencePort<Vec<WifiProperty>> for PropertyOrderPort {
    async fn read(&self) -> Result<Vec<WifiProperty>, PersistenceError> {
        let stored: Vec<WifiProperty> = self
            .store
            .get(keys::WIFI_PROPERTY_ORDER)
            .await?
            .unwrap_or_default();
        Ok(reconcile_order(stored))
    }

    async fn write(&self, value: Vec<WifiProperty>) -> Result<(), PersistenceError> {
        self.store.put(keys::WIFI_PROPERTY_ORDER, &value).await
    }
}

fn reconcile_order(stored: Vec<WifiProperty>) -> Vec<WifiProperty> {
    let mut seen = BTreeSet::new();
    let mut order: Vec<WifiProperty> = stored.into_iter().filter(|p| seen.insert(*p)).collect();
    order.extend(WifiProperty::ALL.iter().copied().filter(|p| !seen.contains(p)));
    order
}

/// Source of every widget configuration port
#[derive(Debug, Clone)]
pub struct WidgetRepository {
    store: Arc<PreferencesStore>,
}

impl WidgetRepository {
    pub fn new(store: Arc<PreferencesStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PreferencesStore> {
        &self.store
    }

    fn scalar<T>(&self, key: &'static str, default: T) -> Arc<dyn PersistencePort<T>>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.validated_scalar(key, default, None)
    }

    fn validated_scalar<T>(
        &self,
        key: &'static str,
        default: T,
        validate: Option<Validator<T>>,
    ) -> Arc<dyn PersistencePort<T>>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Arc::new(PreferencePort {
            store: self.store.clone(),
            key,
            default,
            validate,
        })
    }

    fn map<K, V>(
        &self,
        key: &'static str,
        defaults: impl IntoIterator<Item = (K, V)>,
    ) -> Arc<dyn PersistencePort<BTreeMap<K, V>>>
    where
        K: Ord + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        Arc::new(MapPreferencePort {
            store: self.store.clone(),
            key,
            defaults: defaults.into_iter().collect(),
        })
    }

    pub fn coloring(&self) -> Arc<dyn PersistencePort<ColoringConfig>> {
        self.scalar(keys::COLORING, ColoringConfig::default())
    }

    pub fn opacity(&self) -> Arc<dyn PersistencePort<f32>> {
        self.validated_scalar(keys::OPACITY, DEFAULT_OPACITY, Some(validate_opacity))
    }

    pub fn font_size(&self) -> Arc<dyn PersistencePort<FontSize>> {
        self.scalar(keys::FONT_SIZE, FontSize::default())
    }

    pub fn property_value_alignment(&self) -> Arc<dyn PersistencePort<PropertyValueAlignment>> {
        self.scalar(keys::PROPERTY_VALUE_ALIGNMENT, PropertyValueAlignment::default())
    }

    pub fn refresh_interval(&self) -> Arc<dyn PersistencePort<Duration>> {
        self.scalar(keys::REFRESH_INTERVAL, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn wifi_properties(&self) -> Arc<dyn PersistencePort<BTreeMap<WifiProperty, bool>>> {
        self.map(
            keys::WIFI_PROPERTIES,
            WifiProperty::ALL.iter().map(|p| (*p, p.default_enabled())),
        )
    }

    pub fn wifi_property_order(&self) -> Arc<dyn PersistencePort<Vec<WifiProperty>>> {
        Arc::new(PropertyOrderPort {
            store: self.store.clone(),
        })
    }

    pub fn ip_sub_properties(&self) -> Arc<dyn PersistencePort<BTreeMap<IpSubProperty, bool>>> {
        self.map(
            keys::IP_SUB_PROPERTIES,
            IpSubProperty::all()
                .into_iter()
                .map(|sub| (sub, sub.kind.is_address_version())),
        )
    }

    pub fn bottom_bar(&self) -> Arc<dyn PersistencePort<BTreeMap<WidgetBottomBarElement, bool>>> {
        self.map(
            keys::BOTTOM_BAR,
            WidgetBottomBarElement::ALL.iter().map(|e| (*e, true)),
        )
    }

    pub fn refreshing_parameters(&self) -> Arc<dyn PersistencePort<BTreeMap<WidgetRefreshingParameter, bool>>> {
        self.map(
            keys::REFRESHING_PARAMETERS,
            WidgetRefreshingParameter::ALL
                .iter()
                .map(|p| (*p, p.default_enabled())),
        )
    }

    pub fn location_parameters(&self) -> Arc<dyn PersistencePort<BTreeMap<LocationParameter, bool>>> {
        self.map(
            keys::LOCATION_PARAMETERS,
            LocationParameter::ALL
                .iter()
                .map(|p| (*p, p.default_enabled())),
        )
    }

    /// Committed refresh interval
    pub async fn committed_refresh_interval(&self) -> Result<Duration, PersistenceError> {
        self.refresh_interval().read().await
    }
}
