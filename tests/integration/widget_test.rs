//! Widget configuration sessions over a real preferences file

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wifiwidget::shared::{AppConfig, PersistenceError};
use wifiwidget::widget::model::{FontSize, WidgetRefreshingParameter, WifiProperty};
use wifiwidget::widget::{
    LocationAccessState, PreferencesStore, RefreshWorkerManager, WidgetConfiguration, WidgetHost,
    WidgetRepository,
};

#[derive(Default)]
struct CountingHost {
    refreshes: AtomicUsize,
}

#[async_trait]
impl WidgetHost for CountingHost {
    async fn trigger_data_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

fn config_at(path: &Path) -> AppConfig {
    assert_ok!(AppConfig::builder()
        .preferences_path(path)
        .synced_notification_delay(Duration::ZERO)
        .minimum_refresh_interval(Duration::from_secs(60))
        .build())
}

async fn open(config: &AppConfig, host: Arc<CountingHost>) -> (WidgetConfiguration, Arc<RefreshWorkerManager>) {
    let store = match &config.preferences_path {
        Some(path) => PreferencesStore::open(path),
        None => PreferencesStore::in_memory(),
    };
    let repository = WidgetRepository::new(Arc::new(store));
    let refresh = Arc::new(RefreshWorkerManager::new(config.minimum_refresh_interval));
    let configuration = assert_ok!(WidgetConfiguration::load(&repository, refresh.clone(), host, config).await);
    (configuration, refresh)
}

#[tokio::test]
async fn test_committed_configuration_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("preferences.json"));
    let mut location = LocationAccessState::new(true);

    let (mut configuration, _) = open(&config, Arc::new(CountingHost::default())).await;
    configuration.states_mut().opacity.set(0.4);
    configuration.states_mut().font_size.set(FontSize::Large);
    assert_ok!(configuration.set_wifi_property_enabled(WifiProperty::Dns, false, &mut location));
    assert!(configuration.move_wifi_property(0, 1));
    assert_ok!(configuration.sync().await);
    drop(configuration);

    let (reopened, _) = open(&config, Arc::new(CountingHost::default())).await;
    let states = reopened.states();
    assert_eq!(*states.opacity.applied(), 0.4);
    assert_eq!(*states.font_size.applied(), FontSize::Large);
    assert_eq!(states.wifi_properties.get_applied(&WifiProperty::Dns), Some(&false));
    assert_eq!(
        &states.wifi_property_order.applied()[..2],
        &[WifiProperty::Bssid, WifiProperty::Ssid]
    );
    assert!(!reopened.has_unsynced_changes());
}

#[tokio::test]
async fn test_reset_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let config = config_at(&path);

    let (mut configuration, _) = open(&config, Arc::new(CountingHost::default())).await;
    configuration.states_mut().opacity.set(0.1);
    configuration
        .states_mut()
        .refreshing_parameters
        .set(WidgetRefreshingParameter::RefreshPeriodically, false);
    assert_eq!(
        configuration.dirty_members(),
        vec!["opacity".to_string(), "refreshing_parameters".to_string()]
    );

    configuration.reset();
    assert!(!configuration.has_unsynced_changes());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_failed_write_keeps_pending_edits() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("widget");
    let config = config_at(&parent.join("preferences.json"));
    let host = Arc::new(CountingHost::default());

    let (mut configuration, _) = open(&config, host.clone()).await;
    configuration.states_mut().opacity.set(0.6);
    // a file where the preferences directory should be
    std::fs::write(&parent, b"").unwrap();

    assert_err!(configuration.sync().await, PersistenceError::Io { .. });
    assert_eq!(*configuration.states().opacity.get(), 0.6);
    assert_eq!(configuration.dirty_members(), vec!["opacity".to_string()]);
    assert_eq!(host.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_worker_follows_committed_interval() {
    let config = assert_ok!(AppConfig::builder()
        .in_memory()
        .synced_notification_delay(Duration::from_millis(500))
        .minimum_refresh_interval(Duration::from_secs(60))
        .build());
    let host = Arc::new(CountingHost::default());
    let (mut configuration, refresh) = open(&config, host.clone()).await;
    let worker = refresh.spawn(host.clone());
    let mut events = configuration.subscribe();

    // below the minimum, clamped to 60s
    configuration.states_mut().refresh_interval.set(Duration::from_secs(10));
    assert_ok!(configuration.sync().await);
    assert!(events.try_recv().is_ok());
    assert_eq!(refresh.schedule().periodic, Some(Duration::from_secs(60)));

    tokio::time::sleep(Duration::from_secs(125)).await;
    // one refresh from the commit, two from the worker
    assert_eq!(host.refreshes.load(Ordering::SeqCst), 3);

    drop(configuration);
    drop(refresh);
    assert_ok!(worker.await);
}

#[tokio::test]
async fn test_config_file_selects_preferences_file() {
    if std::env::var_os("WIFIWIDGET_PREFERENCES").is_some() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let preferences = dir.path().join("prefs.json");
    let config_path = dir.path().join("wifiwidget.toml");
    std::fs::write(
        &config_path,
        format!(
            "preferences_path = {:?}\nsynced_notification_delay_ms = 0\n",
            preferences.display().to_string()
        ),
    )
    .unwrap();

    let config = assert_ok!(AppConfig::from_toml_file(&config_path));
    let (mut configuration, _) = open(&config, Arc::new(CountingHost::default())).await;
    configuration.states_mut().font_size.set(FontSize::Small);
    assert_ok!(configuration.sync().await);
    assert!(preferences.exists());
}

#[tokio::test]
async fn test_non_finite_opacity_never_reaches_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_at(&dir.path().join("preferences.json"));
    let host = Arc::new(CountingHost::default());

    let (mut configuration, _) = open(&config, host.clone()).await;
    assert_ok!(configuration.set_opacity(0.7));
    assert_ok!(configuration.sync().await);

    // bypassing the gate, the port still refuses the value
    configuration.states_mut().opacity.set(f32::NAN);
    assert_err!(configuration.sync().await, PersistenceError::Rejected { .. });
    assert_eq!(configuration.dirty_members(), vec!["opacity".to_string()]);
    assert_eq!(host.refreshes.load(Ordering::SeqCst), 1);

    configuration.reset();
    assert!(!configuration.has_unsynced_changes());
    drop(configuration);

    let (reopened, _) = open(&config, Arc::new(CountingHost::default())).await;
    assert_eq!(*reopened.states().opacity.applied(), 0.7);
}
