//! Widget domain model
//!
//! The configurable pieces of the Wi-Fi widget: which properties it shows
//! and in what order, IP sub-options, the bottom bar, refreshing behaviour,
//! location details and appearance. Every enum has a stable kebab-case name
//! for the command line and `Display`. The preferences file stores serde's
//! variant names (`"LinkSpeed"`, not `"link-speed"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unrecognised name for one of the widget enums
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
}

macro_rules! named_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Stable kebab-case name
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseNameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(ParseNameError { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

/// Which IP versions an IP property reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersions {
    V4Only,
    V6Only,
    V4AndV6,
}

/// A Wi-Fi connection property the widget can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WifiProperty {
    Ssid,
    Bssid,
    Frequency,
    Channel,
    LinkSpeed,
    Rssi,
    SignalStrength,
    Standard,
    Generation,
    Security,
    Gateway,
    Dns,
    Dhcp,
    LinkLocalIp,
    SiteLocalIp,
    UniqueLocalIp,
    GlobalUnicastIp,
    PublicIp,
}

named_enum!(WifiProperty, "wifi property", {
    Ssid => "ssid",
    Bssid => "bssid",
    Frequency => "frequency",
    Channel => "channel",
    LinkSpeed => "link-speed",
    Rssi => "rssi",
    SignalStrength => "signal-strength",
    Standard => "standard",
    Generation => "generation",
    Security => "security",
    Gateway => "gateway",
    Dns => "dns",
    Dhcp => "dhcp",
    LinkLocalIp => "link-local-ip",
    SiteLocalIp => "site-local-ip",
    UniqueLocalIp => "unique-local-ip",
    GlobalUnicastIp => "global-unicast-ip",
    PublicIp => "public-ip",
});

impl WifiProperty {
    /// Properties Android only reveals with location access granted
    pub const LOCATION_ACCESS_REQUIRING: &'static [WifiProperty] =
        &[WifiProperty::Ssid, WifiProperty::Bssid];

    pub fn requires_location_access(&self) -> bool {
        Self::LOCATION_ACCESS_REQUIRING.contains(self)
    }

    /// Address versions of an IP property, `None` for non-IP properties
    pub fn ip_versions(&self) -> Option<IpVersions> {
        match self {
            WifiProperty::LinkLocalIp | WifiProperty::GlobalUnicastIp | WifiProperty::PublicIp => {
                Some(IpVersions::V4AndV6)
            }
            WifiProperty::SiteLocalIp => Some(IpVersions::V4Only),
            WifiProperty::UniqueLocalIp => Some(IpVersions::V6Only),
            _ => None,
        }
    }

    pub fn is_ip(&self) -> bool {
        self.ip_versions().is_some()
    }

    pub fn default_enabled(&self) -> bool {
        !matches!(
            self,
            WifiProperty::Bssid
                | WifiProperty::Rssi
                | WifiProperty::Generation
                | WifiProperty::Dhcp
                | WifiProperty::SiteLocalIp
                | WifiProperty::UniqueLocalIp
        )
    }

    /// Sub-properties configurable beneath an IP property
    pub fn ip_sub_properties(&self) -> Vec<IpSubProperty> {
        let kinds: &[IpSubPropertyKind] = match self.ip_versions() {
            Some(IpVersions::V4AndV6) => &[
                IpSubPropertyKind::V4Enabled,
                IpSubPropertyKind::V6Enabled,
                IpSubPropertyKind::ShowPrefixLength,
            ],
            Some(_) => &[IpSubPropertyKind::ShowPrefixLength],
            None => &[],
        };
        kinds
            .iter()
            .map(|&kind| IpSubProperty { property: *self, kind })
            .collect()
    }
}

/// Option attached to an IP property
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IpSubPropertyKind {
    V4Enabled,
    V6Enabled,
    ShowPrefixLength,
}

named_enum!(IpSubPropertyKind, "ip sub-property", {
    V4Enabled => "v4",
    V6Enabled => "v6",
    ShowPrefixLength => "prefix-length",
});

impl IpSubPropertyKind {
    /// Whether this kind toggles one of the two address versions
    pub fn is_address_version(&self) -> bool {
        matches!(self, IpSubPropertyKind::V4Enabled | IpSubPropertyKind::V6Enabled)
    }
}

/// Sub-property of one specific IP property
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IpSubProperty {
    pub property: WifiProperty,
    pub kind: IpSubPropertyKind,
}

impl IpSubProperty {
    /// The other address version of the same property
    pub fn opposing(&self) -> Option<IpSubProperty> {
        let kind = match self.kind {
            IpSubPropertyKind::V4Enabled => IpSubPropertyKind::V6Enabled,
            IpSubPropertyKind::V6Enabled => IpSubPropertyKind::V4Enabled,
            IpSubPropertyKind::ShowPrefixLength => return None,
        };
        Some(IpSubProperty {
            property: self.property,
            kind,
        })
    }

    /// Every sub-property of every IP property
    pub fn all() -> Vec<IpSubProperty> {
        WifiProperty::ALL
            .iter()
            .flat_map(|property| property.ip_sub_properties())
            .collect()
    }
}

impl fmt::Display for IpSubProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.kind)
    }
}

impl FromStr for IpSubProperty {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseNameError {
            kind: "ip sub-property",
            value: s.to_string(),
        };
        let (property, kind) = s.split_once(':').ok_or_else(invalid)?;
        let candidate = IpSubProperty {
            property: property.parse()?,
            kind: kind.parse()?,
        };
        if candidate.property.ip_sub_properties().contains(&candidate) {
            Ok(candidate)
        } else {
            Err(invalid())
        }
    }
}

/// Element of the widget's bottom bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WidgetBottomBarElement {
    LastRefreshTimeDisplay,
    RefreshButton,
    GoToWifiSettingsButton,
    GoToWidgetSettingsButton,
}

named_enum!(WidgetBottomBarElement, "bottom bar element", {
    LastRefreshTimeDisplay => "last-refresh-time",
    RefreshButton => "refresh-button",
    GoToWifiSettingsButton => "wifi-settings-button",
    GoToWidgetSettingsButton => "widget-settings-button",
});

/// Switch controlling when the widget refreshes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WidgetRefreshingParameter {
    RefreshPeriodically,
    RefreshOnLowBattery,
}

named_enum!(WidgetRefreshingParameter, "refreshing parameter", {
    RefreshPeriodically => "refresh-periodically",
    RefreshOnLowBattery => "refresh-on-low-battery",
});

impl WidgetRefreshingParameter {
    pub fn default_enabled(&self) -> bool {
        true
    }
}

/// Location detail the widget can show next to the public IP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LocationParameter {
    ZipCode,
    District,
    City,
    Region,
    Country,
    Continent,
}

named_enum!(LocationParameter, "location parameter", {
    ZipCode => "zip-code",
    District => "district",
    City => "city",
    Region => "region",
    Country => "country",
    Continent => "continent",
});

impl LocationParameter {
    pub fn default_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    VeryLarge,
}

named_enum!(FontSize, "font size", {
    Small => "small",
    Medium => "medium",
    Large => "large",
    VeryLarge => "very-large",
});

impl FontSize {
    /// Text scale relative to `Medium`
    pub fn scale(&self) -> f32 {
        match self {
            FontSize::Small => 0.85,
            FontSize::Medium => 1.0,
            FontSize::Large => 1.15,
            FontSize::VeryLarge => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValueAlignment {
    Left,
    #[default]
    Right,
}

named_enum!(PropertyValueAlignment, "alignment", {
    Left => "left",
    Right => "right",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    DeviceDefault,
}

named_enum!(Theme, "theme", {
    Light => "light",
    Dark => "dark",
    DeviceDefault => "device-default",
});

/// Which of the two coloring setups the widget uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColoringStyle {
    #[default]
    Preset,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetColoring {
    pub theme: Theme,
    pub use_dynamic_colors: bool,
}

impl Default for PresetColoring {
    fn default() -> Self {
        Self {
            theme: Theme::DeviceDefault,
            use_dynamic_colors: true,
        }
    }
}

/// ARGB colors of the custom coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomColoring {
    pub background: u32,
    pub primary: u32,
    pub secondary: u32,
}

impl Default for CustomColoring {
    fn default() -> Self {
        Self {
            background: 0xFF1B1B1F,
            primary: 0xFF8AB4F8,
            secondary: 0xFFE3E2E6,
        }
    }
}

/// Both coloring setups plus the selection between them.
///
/// Switching `style` keeps the other setup so switching back restores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoringConfig {
    pub style: ColoringStyle,
    pub preset: PresetColoring,
    pub custom: CustomColoring,
}
