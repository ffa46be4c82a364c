//! Canonical domain types for the intercom directory.

mod apartment;
mod ids;
mod status;

pub use apartment::{
    Apartment, ApartmentDraft, DEFAULT_RING_SECONDS, MIN_RING_SECONDS, Resident, ResidentDraft,
    RingStrategy,
};
pub use ids::{ApartmentId, Extension, ResidentId};
pub use status::{RegistrationState, StatusEntry};
