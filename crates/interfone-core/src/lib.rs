//! Directory-to-configuration synthesis and live-status reconciliation
//! for a SIP intercom directory.
//!
//! This crate owns the engine behind the interfone tools:
//!
//! - **[`Directory`] / [`DirectoryStore`]** — the apartment/resident
//!   entity graph with its structural invariants (global identity
//!   namespace, canonical ordering) and atomic JSON persistence.
//!
//! - **[`synth`]** — the pure synthesizer turning a directory snapshot
//!   into the two exchange-consumable artifacts (credential/address
//!   triads, routing rules). Deterministic: identical snapshots yield
//!   byte-identical text.
//!
//! - **[`status`]** — tolerant line parsers over the exchange's two
//!   telemetry feeds, collected into full-replacement
//!   [`StatusSnapshot`]s.
//!
//! - **[`dashboard`]** — the read-only join of directory and status
//!   into per-apartment rows and directory-wide totals.
//!
//! - **[`ApplyController`]** — the synthesize → write → reload state
//!   machine with atomic artifact replacement and a single restart
//!   fallback.
//!
//! - **[`ControlInterface`]** — the exchange control surface as a
//!   capability trait, implemented by [`AsteriskControl`] over the
//!   remote console, faked freely in tests.

pub mod apply;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod exchange;
pub mod model;
pub mod monitor;
pub mod status;
pub mod synth;

// ── Primary re-exports ──────────────────────────────────────────────
pub use apply::{ApplyController, ApplyOutcome, ApplyPhase, ApplyReport, ArtifactWriter};
pub use directory::{Directory, DirectoryStore};
pub use error::{ApplyError, DirectoryError, ExchangeError, StoreError};
pub use exchange::{AsteriskControl, ControlInterface};
pub use model::{
    Apartment, ApartmentDraft, ApartmentId, Extension, RegistrationState, Resident, ResidentDraft,
    ResidentId, RingStrategy, StatusEntry,
};
pub use monitor::spawn_monitor;
pub use status::StatusSnapshot;
pub use synth::{Artifacts, SynthOptions, synthesize};
