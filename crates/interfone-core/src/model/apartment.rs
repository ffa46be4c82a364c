// ── Apartment / resident domain types ──

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{ApartmentId, Extension, ResidentId};

/// Ring times below this are clamped / rejected everywhere.
pub const MIN_RING_SECONDS: u32 = 5;

/// Default total ring time for a new apartment.
pub const DEFAULT_RING_SECONDS: u32 = 20;

// ── RingStrategy ────────────────────────────────────────────────────

/// How an apartment's residents are dialed when the apartment
/// extension rings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RingStrategy {
    /// One resident at a time, the total ring time sliced between them.
    #[default]
    Sequential,
    /// All residents at once for the full ring time.
    Parallel,
}

// ── Resident ────────────────────────────────────────────────────────

/// An individually addressable SIP identity living in an apartment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub name: String,
    /// Exchange username, and the key joined against live telemetry.
    /// Unique across the entire directory.
    pub sip_identity: String,
    pub secret: String,
    /// Lower rings first under the sequential strategy.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
}

impl Resident {
    /// Canonical resident ordering: priority ascending, then name.
    /// Used identically for display and sequential dial generation.
    pub fn ring_order(a: &Self, b: &Self) -> Ordering {
        a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name))
    }
}

// ── Apartment ───────────────────────────────────────────────────────

/// A dial target reachable from the front desk, owning its residents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    pub id: ApartmentId,
    /// Display name (e.g. "Block A / Apt 101").
    pub label: String,
    /// The identity a front desk dials. Unique across the directory.
    pub extension: Extension,
    pub strategy: RingStrategy,
    /// Total ring time in seconds, at least [`MIN_RING_SECONDS`].
    pub ring_seconds: u32,
    /// Kept in canonical ring order at all times.
    pub residents: Vec<Resident>,
    pub created_at: DateTime<Utc>,
}

impl Apartment {
    /// Restore the canonical resident order after a mutation or load.
    pub(crate) fn sort_residents(&mut self) {
        self.residents.sort_by(Resident::ring_order);
    }

    pub fn resident(&self, id: ResidentId) -> Option<&Resident> {
        self.residents.iter().find(|r| r.id == id)
    }
}

// ── Operator drafts ─────────────────────────────────────────────────

/// Operator input for a "create apartment" action.
#[derive(Debug, Clone)]
pub struct ApartmentDraft {
    pub label: String,
    pub extension: String,
    pub strategy: RingStrategy,
    pub ring_seconds: u32,
}

/// Operator input for an "add resident" action.
///
/// `sip_identity` and `secret` are optional -- the repository
/// synthesizes an identity and generates a secret when omitted.
#[derive(Debug, Clone, Default)]
pub struct ResidentDraft {
    pub name: String,
    pub sip_identity: Option<String>,
    pub secret: Option<String>,
    pub priority: i32,
}
