// ── Live status types ──
//
// Derived from exchange telemetry every collection cycle; never
// persisted and never merged with the previous cycle's values.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Registration state of a single SIP identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegistrationState {
    Available,
    Unavailable,
    #[default]
    Unknown,
}

/// Per-identity live status joined from both telemetry feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub registration: RegistrationState,
    pub busy_channels: u32,
}

impl StatusEntry {
    pub fn is_online(&self) -> bool {
        self.registration == RegistrationState::Available
    }

    pub fn is_busy(&self) -> bool {
        self.busy_channels > 0
    }
}
