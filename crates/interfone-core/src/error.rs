// ── Core error types ──
//
// User-facing errors from interfone-core. Validation errors are raised
// before any mutation is committed, so a rejected operation always
// leaves the directory exactly as it was.

use thiserror::Error;

use crate::model::ApartmentId;

/// Validation errors from the directory repository.
///
/// Every variant is rejected up front -- the directory is unchanged
/// whenever one of these is returned.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("extension '{extension}' is already assigned to another apartment")]
    DuplicateExtension { extension: String },

    #[error("SIP identity '{identity}' is already in use")]
    DuplicateIdentity { identity: String },

    #[error("'{identity}' is reserved for the exchange gateway")]
    ReservedIdentity { identity: String },

    #[error("invalid extension '{value}': expected a non-empty string of digits")]
    InvalidExtension { value: String },

    #[error("invalid SIP identity '{value}': expected letters, digits, '-', '_' or '.'")]
    InvalidIdentity { value: String },

    #[error("invalid ring strategy '{value}': expected 'sequential' or 'parallel'")]
    InvalidStrategy { value: String },

    #[error("ring time of {value}s is below the {min}s minimum")]
    InvalidRingSeconds { value: u32, min: u32 },

    #[error("no free identity under apartment {extension} after {attempts} attempts")]
    IdentitySpaceExhausted { extension: String, attempts: u32 },

    #[error("apartment {id} does not exist")]
    ApartmentNotFound { id: ApartmentId },
}

/// Persistence errors from the directory store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("directory I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory file is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Failures talking to the exchange control interface.
///
/// Every external call resolves to exactly one of these or to output
/// text -- there is no catch-all suppression, callers handle both arms.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("failed to launch control client: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("control command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("control command exited with status {code}: {output}")]
    CommandFailed { code: i32, output: String },
}

/// Errors from the apply controller itself.
///
/// Failures *inside* a cycle (write, reload, restart) are reported
/// through [`ApplyOutcome`](crate::apply::ApplyOutcome); this type only
/// covers requests that never start a cycle at all.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("an apply cycle is already in flight")]
    InProgress,
}
