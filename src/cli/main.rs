//! Wi-Fi widget configuration CLI.

use std::error::Error;
use std::fmt::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use wifiwidget::shared::logging::init_tracing;
use wifiwidget::shared::{AppConfig, PersistenceError};
use wifiwidget::widget::model::WifiProperty;
use wifiwidget::widget::{
    CheckChangeDenial, LocationAccessState, PreferencesStore, RefreshWorkerManager,
    WidgetConfiguration, WidgetHost, WidgetRepository,
};

mod args;

use crate::args::{Cli, Command};

/// Host without a rendered widget; refresh requests are only logged.
struct LoggingWidgetHost;

#[async_trait]
impl WidgetHost for LoggingWidgetHost {
    async fn trigger_data_refresh(&self) {
        tracing::info!("widget data refresh requested");
    }
}

/// What a command did to the stored configuration
#[derive(Debug, PartialEq)]
enum Outcome {
    Unchanged,
    /// Pending members and the rendered pending configuration, discarded afterwards
    DryRun { dirty: Vec<String>, preview: String },
    Saved,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // no subscriber yet, so configuration errors go straight to stderr
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_filter);

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "command failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut configuration = open(config, Arc::new(LoggingWidgetHost)).await?;
    let mut location = LocationAccessState::new(cli.location_granted);

    match execute(&mut configuration, cli.command, &mut location, cli.dry_run).await? {
        Outcome::Unchanged => print!("{}", render_configuration(&configuration)),
        Outcome::DryRun { dirty, preview } => {
            println!("pending changes: {}", dirty.join(", "));
            print!("{preview}");
        }
        Outcome::Saved => {
            println!("configuration saved");
            print!("{}", render_configuration(&configuration));
        }
    }
    Ok(())
}

async fn open(
    config: &AppConfig,
    host: Arc<dyn WidgetHost>,
) -> Result<WidgetConfiguration, PersistenceError> {
    let store = match &config.preferences_path {
        Some(path) => PreferencesStore::open(path),
        None => PreferencesStore::in_memory(),
    };
    let repository = WidgetRepository::new(Arc::new(store));
    let refresh = Arc::new(RefreshWorkerManager::new(config.minimum_refresh_interval));
    WidgetConfiguration::load(&repository, refresh, host, config).await
}

/// Apply one command and commit it, or discard it on `dry_run`
async fn execute(
    configuration: &mut WidgetConfiguration,
    command: Command,
    location: &mut LocationAccessState,
    dry_run: bool,
) -> Result<Outcome, Box<dyn Error>> {
    apply(configuration, command, location)?;

    if !configuration.has_unsynced_changes() {
        return Ok(Outcome::Unchanged);
    }

    if dry_run {
        let outcome = Outcome::DryRun {
            dirty: configuration.dirty_members(),
            preview: render_configuration(configuration),
        };
        configuration.reset();
        return Ok(outcome);
    }

    configuration.sync().await?;
    Ok(Outcome::Saved)
}

fn apply(
    configuration: &mut WidgetConfiguration,
    command: Command,
    location: &mut LocationAccessState,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Show => {}
        Command::Enable { property } => {
            set_property(configuration, property, true, location)?;
        }
        Command::Disable { property } => {
            set_property(configuration, property, false, location)?;
        }
        Command::Move { from, to } => {
            if !configuration.move_wifi_property(from, to) {
                return Err(format!("position out of range: {from} -> {to}").into());
            }
        }
        Command::Ip {
            sub_property,
            state,
        } => {
            configuration.set_ip_sub_property_enabled(sub_property, state.enabled())?;
        }
        Command::BottomBar { element, state } => {
            configuration
                .states_mut()
                .bottom_bar
                .set(element, state.enabled());
        }
        Command::Refreshing { parameter, state } => {
            configuration
                .states_mut()
                .refreshing_parameters
                .set(parameter, state.enabled());
        }
        Command::Location { parameter, state } => {
            configuration
                .states_mut()
                .location_parameters
                .set(parameter, state.enabled());
        }
        Command::Interval { minutes } => {
            configuration
                .states_mut()
                .refresh_interval
                .set(Duration::from_secs(minutes.saturating_mul(60)));
        }
        Command::Opacity { value } => configuration.set_opacity(value)?,
        Command::FontSize { size } => configuration.states_mut().font_size.set(size),
        Command::Align { alignment } => {
            configuration
                .states_mut()
                .property_value_alignment
                .set(alignment);
        }
    }
    Ok(())
}

fn set_property(
    configuration: &mut WidgetConfiguration,
    property: WifiProperty,
    enabled: bool,
    location: &mut LocationAccessState,
) -> Result<(), CheckChangeDenial> {
    let result = configuration.set_wifi_property_enabled(property, enabled, location);
    if location.pending_request().is_some() {
        eprintln!("{property} needs location access; rerun with --location-granted once granted");
    }
    result
}

fn render_configuration(configuration: &WidgetConfiguration) -> String {
    let states = configuration.states();
    let mut out = String::new();

    let _ = writeln!(out, "properties:");
    for (position, property) in states.wifi_property_order.get().iter().enumerate() {
        let enabled = states.wifi_properties.get(property).copied().unwrap_or(false);
        let _ = writeln!(out, "  {position:>2} [{}] {property}", if enabled { "x" } else { " " });
    }

    let ip_options: Vec<String> = states
        .ip_sub_properties
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(sub_property, _)| sub_property.to_string())
        .collect();
    let _ = writeln!(out, "ip options: {}", ip_options.join(", "));

    let location: Vec<&str> = states
        .location_parameters
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(parameter, _)| parameter.as_str())
        .collect();
    let _ = writeln!(out, "location: {}", location.join(", "));

    let bottom_bar: Vec<&str> = states
        .bottom_bar
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(element, _)| element.as_str())
        .collect();
    let _ = writeln!(out, "bottom bar: {}", bottom_bar.join(", "));

    let refreshing: Vec<&str> = states
        .refreshing_parameters
        .iter()
        .filter(|(_, enabled)| **enabled)
        .map(|(parameter, _)| parameter.as_str())
        .collect();
    let _ = writeln!(
        out,
        "refresh interval: {} min ({})",
        states.refresh_interval.get().as_secs() / 60,
        refreshing.join(", ")
    );
    let _ = writeln!(
        out,
        "appearance: opacity {:.2}, font {}, values aligned {}, coloring {:?}",
        states.opacity.get(),
        states.font_size.get(),
        states.property_value_alignment.get(),
        states.coloring.get().style
    );
    out
}
