//! Location access permission state
//!
//! SSID and BSSID are only readable with location access. The configuration
//! refuses to enable them while access is missing and records a permission
//! request instead; the platform layer answers that request and reports the
//! grant back together with the trigger that caused it.

use super::model::WifiProperty;

/// Why a location access permission request was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAccessPermissionRequestTrigger {
    /// Asked once on first launch, enabling all dependent properties on grant
    InitialAppLaunch,
    /// The user tried to enable a location-requiring property
    PropertyCheckChange(WifiProperty),
}

/// Permission status plus the request waiting for an answer
#[derive(Debug, Clone, Default)]
pub struct LocationAccessState {
    granted: bool,
    pending_request: Option<LocationAccessPermissionRequestTrigger>,
}

impl LocationAccessState {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            pending_request: None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Record that a permission request should be shown
    pub fn launch_request(&mut self, trigger: LocationAccessPermissionRequestTrigger) {
        tracing::info!(?trigger, "location access permission request launched");
        self.pending_request = Some(trigger);
    }

    pub fn pending_request(&self) -> Option<LocationAccessPermissionRequestTrigger> {
        self.pending_request
    }

    /// Answer the pending request, returning its trigger when access was granted
    pub fn on_permission_result(&mut self, granted: bool) -> Option<LocationAccessPermissionRequestTrigger> {
        self.granted = granted;
        let trigger = self.pending_request.take();
        if granted {
            trigger
        } else {
            tracing::info!(?trigger, "location access denied");
            None
        }
    }
}
