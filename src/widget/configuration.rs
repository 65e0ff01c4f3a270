//! # Widget Configuration
//!
//! Every configurable aspect of the widget as one reversible composition.
//! The configuration screen edits pending values, shows a save/discard
//! prompt while `has_unsynced_changes()` holds, and commits or resets all
//! members at once.
//!
//! ## Commit order
//!
//! Members commit in declaration order of [`WidgetStates`]. The refresh
//! interval commits before the refreshing parameters, whose post-sync hook
//! reads the committed interval back from the store to reschedule the
//! refresh worker.
//!
//! ## After a commit
//!
//! The widget host is asked to refresh its data, and after a short delay a
//! [`ConfigurationEvent::Updated`] is broadcast to subscribers.

use super::location::{LocationAccessPermissionRequestTrigger, LocationAccessState};
use super::model::{
    ColoringConfig, FontSize, IpSubProperty, LocationParameter, PropertyValueAlignment,
    WidgetBottomBarElement, WidgetRefreshingParameter, WifiProperty,
};
use super::refresh::{RefreshWorkerManager, WidgetHost};
use super::repository::{validate_opacity, WidgetRepository};
use crate::reversible::{
    ReversibleState, ReversibleStateFlow, ReversibleStateMap, ReversibleStatesComposition,
    StateMembers,
};
use crate::shared::config::AppConfig;
use crate::shared::error::PersistenceError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Notification emitted after a configuration commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationEvent {
    Updated { at: DateTime<Utc> },
}

/// Reason a gated edit was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckChangeDenial {
    #[error("{0} requires location access")]
    LocationAccessRequired(WifiProperty),
    #[error("leave at least one property enabled")]
    LeaveAtLeastOnePropertyEnabled,
    #[error("leave at least one address version enabled")]
    LeaveAtLeastOneAddressVersionEnabled,
    #[error("opacity must be a number between 0 and 1")]
    OpacityOutOfRange,
}

/// Reversible members of the widget configuration, in commit order
#[derive(Debug)]
pub struct WidgetStates {
    pub coloring: ReversibleStateFlow<ColoringConfig>,
    pub opacity: ReversibleStateFlow<f32>,
    pub font_size: ReversibleStateFlow<FontSize>,
    pub property_value_alignment: ReversibleStateFlow<PropertyValueAlignment>,
    pub wifi_properties: ReversibleStateMap<WifiProperty, bool>,
    pub wifi_property_order: ReversibleStateFlow<Vec<WifiProperty>>,
    pub ip_sub_properties: ReversibleStateMap<IpSubProperty, bool>,
    pub bottom_bar: ReversibleStateMap<WidgetBottomBarElement, bool>,
    pub refresh_interval: ReversibleStateFlow<Duration>,
    pub refreshing_parameters: ReversibleStateMap<WidgetRefreshingParameter, bool>,
    pub location_parameters: ReversibleStateMap<LocationParameter, bool>,
}

impl StateMembers for WidgetStates {
    fn states(&self) -> Vec<&dyn ReversibleState> {
        vec![
            &self.coloring as &dyn ReversibleState,
            &self.opacity,
            &self.font_size,
            &self.property_value_alignment,
            &self.wifi_properties,
            &self.wifi_property_order,
            &self.ip_sub_properties,
            &self.bottom_bar,
            &self.refresh_interval,
            &self.refreshing_parameters,
            &self.location_parameters,
        ]
    }

    fn states_mut(&mut self) -> Vec<&mut dyn ReversibleState> {
        vec![
            &mut self.coloring as &mut dyn ReversibleState,
            &mut self.opacity,
            &mut self.font_size,
            &mut self.property_value_alignment,
            &mut self.wifi_properties,
            &mut self.wifi_property_order,
            &mut self.ip_sub_properties,
            &mut self.bottom_bar,
            &mut self.refresh_interval,
            &mut self.refreshing_parameters,
            &mut self.location_parameters,
        ]
    }
}

/// The widget configuration session
#[derive(Debug)]
pub struct WidgetConfiguration {
    composition: ReversibleStatesComposition<WidgetStates>,
    events: broadcast::Sender<ConfigurationEvent>,
}

impl WidgetConfiguration {
    /// Load every member from the repository and wire the post-commit effects
    pub async fn load(
        repository: &WidgetRepository,
        refresh: Arc<RefreshWorkerManager>,
        host: Arc<dyn WidgetHost>,
        config: &AppConfig,
    ) -> Result<Self, PersistenceError> {
        let refreshing_parameters = {
            let repository = repository.clone();
            let refresh = refresh.clone();
            ReversibleStateMap::load("refreshing_parameters", repository.refreshing_parameters())
                .await?
                .with_on_state_synced(move |parameters| {
                    let repository = repository.clone();
                    let refresh = refresh.clone();
                    async move {
                        match repository.committed_refresh_interval().await {
                            Ok(interval) => {
                                refresh.apply_refreshing_settings(&parameters, interval);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "cannot read committed refresh interval");
                            }
                        }
                    }
                })
        };

        let states = WidgetStates {
            coloring: ReversibleStateFlow::load("coloring", repository.coloring()).await?,
            opacity: ReversibleStateFlow::load("opacity", repository.opacity()).await?,
            font_size: ReversibleStateFlow::load("font_size", repository.font_size()).await?,
            property_value_alignment: ReversibleStateFlow::load(
                "property_value_alignment",
                repository.property_value_alignment(),
            )
            .await?,
            wifi_properties: ReversibleStateMap::load("wifi_properties", repository.wifi_properties())
                .await?,
            wifi_property_order: ReversibleStateFlow::load(
                "wifi_property_order",
                repository.wifi_property_order(),
            )
            .await?,
            ip_sub_properties: ReversibleStateMap::load(
                "ip_sub_properties",
                repository.ip_sub_properties(),
            )
            .await?,
            bottom_bar: ReversibleStateMap::load("bottom_bar", repository.bottom_bar()).await?,
            refresh_interval: ReversibleStateFlow::load("refresh_interval", repository.refresh_interval())
                .await?,
            refreshing_parameters,
            location_parameters: ReversibleStateMap::load(
                "location_parameters",
                repository.location_parameters(),
            )
            .await?,
        };

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let notification_delay = config.synced_notification_delay;
        let composition = {
            let events = events.clone();
            ReversibleStatesComposition::new("widget_configuration", states).with_on_state_synced(
                move || {
                    let host = host.clone();
                    let events = events.clone();
                    async move {
                        host.trigger_data_refresh().await;
                        tracing::info!("triggered widget data refresh on configuration state sync");
                        tokio::time::sleep(notification_delay).await;
                        if events.send(ConfigurationEvent::Updated { at: Utc::now() }).is_err() {
                            tracing::debug!("no subscriber for configuration events");
                        }
                    }
                },
            )
        };

        Ok(Self {
            composition,
            events,
        })
    }

    pub fn states(&self) -> &WidgetStates {
        self.composition.members()
    }

    pub fn states_mut(&mut self) -> &mut WidgetStates {
        self.composition.members_mut()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigurationEvent> {
        self.events.subscribe()
    }

    pub fn has_unsynced_changes(&self) -> bool {
        self.composition.has_unsynced_changes()
    }

    /// Names of members with unsynced edits
    pub fn dirty_members(&self) -> Vec<String> {
        self.composition.dirty_members()
    }

    /// Commit every member in order; see [`ReversibleStatesComposition`]
    pub async fn sync(&mut self) -> Result<(), PersistenceError> {
        self.composition.sync().await
    }

    pub fn reset(&mut self) {
        self.composition.reset();
    }

    /// Enable or disable a displayed property.
    ///
    /// Enabling a location-requiring property without location access is
    /// refused and launches a permission request on `location`. Disabling
    /// the last enabled property is refused.
    pub fn set_wifi_property_enabled(
        &mut self,
        property: WifiProperty,
        enabled: bool,
        location: &mut LocationAccessState,
    ) -> Result<(), CheckChangeDenial> {
        let location_granted = location.is_granted();
        self.states_mut().wifi_properties.set_if(
            property,
            enabled,
            |map, property, enabled| {
                if *enabled {
                    if property.requires_location_access() && !location_granted {
                        return Err(CheckChangeDenial::LocationAccessRequired(*property));
                    }
                    return Ok(());
                }
                let currently_enabled = map.get(property).copied().unwrap_or(false);
                let enabled_count = map.iter().filter(|(_, v)| **v).count();
                if currently_enabled && enabled_count <= 1 {
                    Err(CheckChangeDenial::LeaveAtLeastOnePropertyEnabled)
                } else {
                    Ok(())
                }
            },
            |property, _, denial| {
                tracing::warn!(%property, %denial, "property check change refused");
                if let CheckChangeDenial::LocationAccessRequired(property) = denial {
                    location.launch_request(LocationAccessPermissionRequestTrigger::PropertyCheckChange(
                        *property,
                    ));
                }
            },
        )
    }

    /// Enable or disable an IP sub-property.
    ///
    /// An address version can only be disabled while its opposing version
    /// stays enabled.
    pub fn set_ip_sub_property_enabled(
        &mut self,
        sub_property: IpSubProperty,
        enabled: bool,
    ) -> Result<(), CheckChangeDenial> {
        self.states_mut().ip_sub_properties.set_if(
            sub_property,
            enabled,
            |map, sub_property, enabled| {
                let opposing_enabled = sub_property
                    .opposing()
                    .map(|opposing| map.get(&opposing).copied().unwrap_or(false));
                match opposing_enabled {
                    Some(false) if !*enabled => Err(CheckChangeDenial::LeaveAtLeastOneAddressVersionEnabled),
                    _ => Ok(()),
                }
            },
            |sub_property, _, denial| {
                tracing::warn!(%sub_property, %denial, "sub-property check change refused");
            },
        )
    }

    /// Set the pending background opacity, refusing values outside `0.0..=1.0`
    pub fn set_opacity(&mut self, value: f32) -> Result<(), CheckChangeDenial> {
        self.states_mut().opacity.set_if(
            value,
            |_, proposed| validate_opacity(proposed).map_err(|_| CheckChangeDenial::OpacityOutOfRange),
            |proposed, denial| {
                tracing::warn!(opacity = %proposed, %denial, "opacity change refused");
            },
        )
    }

    /// Move the property at `from` to position `to` of the pending order.
    ///
    /// Returns `false` when either index is out of range.
    pub fn move_wifi_property(&mut self, from: usize, to: usize) -> bool {
        let order = &mut self.states_mut().wifi_property_order;
        let len = order.get().len();
        if from >= len || to >= len {
            return false;
        }
        order.update(|order| {
            let property = order.remove(from);
            order.insert(to, property);
        });
        true
    }

    /// Pending enabled properties in pending display order
    pub fn enabled_wifi_properties(&self) -> Vec<WifiProperty> {
        let states = self.states();
        states
            .wifi_property_order
            .get()
            .iter()
            .copied()
            .filter(|p| states.wifi_properties.get(p).copied().unwrap_or(false))
            .collect()
    }

    /// Whether any location-requiring property is enabled in the committed configuration
    pub fn any_location_access_requiring_property_enabled(&self) -> bool {
        WifiProperty::LOCATION_ACCESS_REQUIRING.iter().any(|property| {
            self.states()
                .wifi_properties
                .get_applied(property)
                .copied()
                .unwrap_or(false)
        })
    }

    /// React to a granted location access request.
    ///
    /// On first launch all location-requiring properties are enabled and
    /// committed right away; after a check change only that property is
    /// enabled, leaving the commit to the user.
    pub async fn on_location_access_permission_granted(
        &mut self,
        trigger: Option<LocationAccessPermissionRequestTrigger>,
    ) -> Result<(), PersistenceError> {
        match trigger {
            Some(LocationAccessPermissionRequestTrigger::InitialAppLaunch) => {
                let wifi_properties = &mut self.states_mut().wifi_properties;
                for property in WifiProperty::LOCATION_ACCESS_REQUIRING {
                    wifi_properties.set(*property, true);
                }
                wifi_properties.sync().await
            }
            Some(LocationAccessPermissionRequestTrigger::PropertyCheckChange(property)) => {
                self.states_mut().wifi_properties.set(property, true);
                Ok(())
            }
            None => Ok(()),
        }
    }
}
