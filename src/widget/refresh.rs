//! # Widget Refreshing
//!
//! Turns the committed refreshing settings into a schedule and runs the
//! background worker that periodically asks the widget host to refresh its
//! data.
//!
//! ## Features
//!
//! - **Schedule Publishing**: settings are published on a `watch` channel
//! - **Interval Clamping**: periodic intervals below the minimum are raised
//! - **Re-arming**: the worker restarts its timer whenever the schedule changes;
//!   re-applying identical settings leaves a running timer alone
//! - **Low Battery**: periodic refreshes are skipped while the host reports a
//!   low battery, unless refreshing on low battery is enabled

use super::model::WidgetRefreshingParameter;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Whatever renders the widget
#[async_trait]
pub trait WidgetHost: Send + Sync {
    /// Ask every placed widget to reload its Wi-Fi data
    async fn trigger_data_refresh(&self);

    /// Whether the device battery is low; hosts without a battery signal never are
    async fn is_battery_low(&self) -> bool {
        false
    }
}

/// When the worker refreshes the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSchedule {
    /// Interval of periodic refreshing, `None` when disabled
    pub periodic: Option<Duration>,
    /// Keep refreshing while the battery is low
    pub refresh_on_low_battery: bool,
}

/// Status of the refresh worker
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
    pub schedule: RefreshSchedule,
    pub last_refresh: Option<DateTime<Utc>>,
    pub refresh_count: u64,
}

/// Publishes refreshing settings and drives the refresh worker
#[derive(Debug)]
pub struct RefreshWorkerManager {
    minimum_interval: Duration,
    schedule: watch::Sender<RefreshSchedule>,
    status: watch::Sender<RefreshStatus>,
}

impl RefreshWorkerManager {
    pub fn new(minimum_interval: Duration) -> Self {
        let (schedule, _) = watch::channel(RefreshSchedule::default());
        let (status, _) = watch::channel(RefreshStatus::default());
        Self {
            minimum_interval,
            schedule,
            status,
        }
    }

    /// Derive and publish the schedule for the committed settings
    pub fn apply_refreshing_settings(
        &self,
        parameters: &BTreeMap<WidgetRefreshingParameter, bool>,
        interval: Duration,
    ) -> RefreshSchedule {
        let enabled = |p: WidgetRefreshingParameter| parameters.get(&p).copied().unwrap_or_else(|| p.default_enabled());

        let periodic = enabled(WidgetRefreshingParameter::RefreshPeriodically).then(|| {
            if interval < self.minimum_interval {
                tracing::warn!(
                    requested = ?interval,
                    minimum = ?self.minimum_interval,
                    "refresh interval below minimum, clamping"
                );
                self.minimum_interval
            } else {
                interval
            }
        });
        let schedule = RefreshSchedule {
            periodic,
            refresh_on_low_battery: enabled(WidgetRefreshingParameter::RefreshOnLowBattery),
        };

        let changed = self.schedule.send_if_modified(|current| {
            if *current == schedule {
                return false;
            }
            *current = schedule;
            true
        });
        if changed {
            tracing::info!(?schedule, "applied refreshing settings");
            self.status.send_if_modified(|status| {
                status.schedule = schedule;
                true
            });
        } else {
            tracing::debug!(?schedule, "refreshing settings unchanged");
        }
        schedule
    }

    pub fn schedule(&self) -> RefreshSchedule {
        *self.schedule.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshSchedule> {
        self.schedule.subscribe()
    }

    pub fn status(&self) -> RefreshStatus {
        self.status.borrow().clone()
    }

    /// Spawn the worker; it stops once the manager is dropped.
    pub fn spawn(self: &Arc<Self>, host: Arc<dyn WidgetHost>) -> JoinHandle<()> {
        let mut schedule_rx = self.subscribe();
        let manager = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                let schedule = *schedule_rx.borrow_and_update();
                match schedule.periodic {
                    Some(interval) => {
                        tokio::select! {
                            _ = tokio::time::sleep(interval) => {
                                let Some(manager) = manager.upgrade() else { break };
                                if !schedule.refresh_on_low_battery && host.is_battery_low().await {
                                    tracing::debug!("battery low, skipping periodic widget refresh");
                                    continue;
                                }
                                host.trigger_data_refresh().await;
                                manager.status.send_modify(|status| {
                                    status.last_refresh = Some(Utc::now());
                                    status.refresh_count += 1;
                                });
                                tracing::debug!("periodic widget refresh");
                            }
                            changed = schedule_rx.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        if schedule_rx.changed().await.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("refresh worker stopped");
        })
    }
}
