//! CLI argument definitions for the widget configuration tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use wifiwidget::widget::model::{
    FontSize, IpSubProperty, LocationParameter, PropertyValueAlignment, WidgetBottomBarElement,
    WidgetRefreshingParameter, WifiProperty,
};

#[derive(Parser)]
#[command(
    name = "wifiwidget-config",
    version,
    about = "Inspect and edit the Wi-Fi widget configuration",
    long_about = "Inspect and edit the Wi-Fi widget configuration.\n\n\
                  Every edit is applied as a pending change and committed in one go;\n\
                  use --dry-run to see the pending result without writing it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file (defaults plus environment overrides otherwise).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Treat location access as granted.
    #[arg(long = "location-granted", global = true)]
    pub location_granted: bool,

    /// Show the pending result and discard it instead of committing.
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the committed configuration.
    Show,

    /// Show a Wi-Fi property on the widget.
    Enable { property: WifiProperty },

    /// Hide a Wi-Fi property from the widget.
    Disable { property: WifiProperty },

    /// Move the property at position FROM to position TO (zero-based).
    Move { from: usize, to: usize },

    /// Toggle an IP sub-property, e.g. `public-ip:v6`.
    Ip {
        #[arg(value_name = "PROPERTY:OPTION")]
        sub_property: IpSubProperty,
        state: Switch,
    },

    /// Toggle a bottom bar element.
    BottomBar {
        element: WidgetBottomBarElement,
        state: Switch,
    },

    /// Toggle a refreshing parameter.
    Refreshing {
        parameter: WidgetRefreshingParameter,
        state: Switch,
    },

    /// Toggle a location detail shown next to the public IP.
    Location {
        parameter: LocationParameter,
        state: Switch,
    },

    /// Set the periodic refresh interval in minutes.
    Interval { minutes: u64 },

    /// Set the background opacity between 0 and 1.
    Opacity { value: f32 },

    /// Set the font size.
    FontSize { size: FontSize },

    /// Set the alignment of property values.
    Align { alignment: PropertyValueAlignment },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}
