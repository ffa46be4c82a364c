// ── Directory repository ──
//
// Owns the apartment/resident entity graph and enforces the structural
// invariants: one global namespace shared by apartment extensions,
// resident SIP identities, and the reserved gateway identities. Every
// operation validates before it mutates, so a returned error always
// means "directory unchanged".

mod store;

use std::collections::BTreeSet;

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::DirectoryError;
use crate::model::{
    Apartment, ApartmentDraft, ApartmentId, Extension, MIN_RING_SECONDS, Resident, ResidentDraft,
    ResidentId, RingStrategy,
};

pub use store::DirectoryStore;

/// Bounded search width for synthesized resident identities.
const IDENTITY_SUFFIX_ATTEMPTS: u32 = 99;

/// Generated secret length and alphabet (ambiguous glyphs excluded).
const SECRET_LEN: usize = 14;
const SECRET_ALPHABET: &[u8] = b"abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// The in-memory apartment/resident graph.
///
/// Apartments are held in canonical order (extension ascending, numeric
/// first) and each apartment's residents in canonical ring order, so
/// every reader -- display, synthesis, aggregation -- sees the same
/// sequence.
#[derive(Debug, Clone)]
pub struct Directory {
    apartments: Vec<Apartment>,
    /// Identities owned by the exchange gateway (front desk etc.) that
    /// no apartment or resident may claim.
    reserved: BTreeSet<String>,
}

impl Directory {
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            apartments: Vec::new(),
            reserved: reserved.into_iter().collect(),
        }
    }

    /// Rebuild from persisted records, restoring canonical order.
    pub(crate) fn from_records(
        mut apartments: Vec<Apartment>,
        reserved: impl IntoIterator<Item = String>,
    ) -> Self {
        for apartment in &mut apartments {
            apartment.sort_residents();
        }
        apartments.sort_by(|a, b| a.extension.cmp(&b.extension));
        Self {
            apartments,
            reserved: reserved.into_iter().collect(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All apartments in canonical order.
    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn apartment(&self, id: ApartmentId) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.id == id)
    }

    /// Look up an apartment by its own extension or by one of its
    /// residents' SIP identities. A miss is an empty result, not an
    /// error.
    pub fn find_by_identity(&self, needle: &str) -> Option<&Apartment> {
        self.apartments.iter().find(|a| {
            a.extension.as_str() == needle || a.residents.iter().any(|r| r.sip_identity == needle)
        })
    }

    pub fn resident_count(&self) -> usize {
        self.apartments.iter().map(|a| a.residents.len()).sum()
    }

    pub fn is_reserved(&self, identity: &str) -> bool {
        self.reserved.contains(identity)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create an apartment from an operator draft.
    pub fn create_apartment(&mut self, draft: ApartmentDraft) -> Result<ApartmentId, DirectoryError> {
        let extension =
            Extension::parse(&draft.extension).ok_or_else(|| DirectoryError::InvalidExtension {
                value: draft.extension.clone(),
            })?;
        self.check_ring_seconds(draft.ring_seconds)?;
        self.check_identity_free(extension.as_str())?;

        let id = ApartmentId::new();
        let apartment = Apartment {
            id,
            label: draft.label,
            extension,
            strategy: draft.strategy,
            ring_seconds: draft.ring_seconds,
            residents: Vec::new(),
            created_at: Utc::now(),
        };
        let at = self
            .apartments
            .partition_point(|a| a.extension < apartment.extension);
        self.apartments.insert(at, apartment);
        debug!(%id, "apartment created");
        Ok(id)
    }

    /// Remove an apartment, cascading to its residents. Returns the
    /// removed record, or `None` if the id is unknown.
    pub fn remove_apartment(&mut self, id: ApartmentId) -> Option<Apartment> {
        let at = self.apartments.iter().position(|a| a.id == id)?;
        let removed = self.apartments.remove(at);
        debug!(%id, residents = removed.residents.len(), "apartment removed");
        Some(removed)
    }

    /// Add a resident to an apartment. A missing identity is
    /// synthesized from the apartment extension; a missing secret is
    /// generated. Returns the complete resident record.
    pub fn add_resident(
        &mut self,
        apartment_id: ApartmentId,
        draft: ResidentDraft,
    ) -> Result<Resident, DirectoryError> {
        let at = self
            .apartments
            .iter()
            .position(|a| a.id == apartment_id)
            .ok_or(DirectoryError::ApartmentNotFound { id: apartment_id })?;

        let sip_identity = match draft.sip_identity {
            Some(identity) => {
                let identity = identity.trim().to_owned();
                if !is_valid_identity(&identity) {
                    return Err(DirectoryError::InvalidIdentity { value: identity });
                }
                self.check_identity_free(&identity)?;
                identity
            }
            None => self.synthesize_identity(at)?,
        };

        let resident = Resident {
            id: ResidentId::new(),
            name: draft.name,
            sip_identity,
            secret: draft.secret.unwrap_or_else(generate_secret),
            priority: draft.priority,
            created_at: Utc::now(),
        };

        let apartment = &mut self.apartments[at];
        apartment.residents.push(resident.clone());
        apartment.sort_residents();
        debug!(identity = %resident.sip_identity, apartment = %apartment.extension, "resident added");
        Ok(resident)
    }

    /// Remove a resident by id. Returns the removed record, or `None`
    /// if the id is unknown.
    pub fn remove_resident(&mut self, id: ResidentId) -> Option<Resident> {
        for apartment in &mut self.apartments {
            if let Some(at) = apartment.residents.iter().position(|r| r.id == id) {
                let removed = apartment.residents.remove(at);
                debug!(identity = %removed.sip_identity, "resident removed");
                return Some(removed);
            }
        }
        None
    }

    /// Change an apartment's ring strategy and, optionally, its total
    /// ring time.
    pub fn update_strategy(
        &mut self,
        apartment_id: ApartmentId,
        strategy: RingStrategy,
        ring_seconds: Option<u32>,
    ) -> Result<(), DirectoryError> {
        if let Some(secs) = ring_seconds {
            self.check_ring_seconds(secs)?;
        }
        let apartment = self
            .apartments
            .iter_mut()
            .find(|a| a.id == apartment_id)
            .ok_or(DirectoryError::ApartmentNotFound { id: apartment_id })?;
        apartment.strategy = strategy;
        if let Some(secs) = ring_seconds {
            apartment.ring_seconds = secs;
        }
        Ok(())
    }

    // ── Invariant checks ─────────────────────────────────────────────

    fn check_ring_seconds(&self, value: u32) -> Result<(), DirectoryError> {
        if value < MIN_RING_SECONDS {
            return Err(DirectoryError::InvalidRingSeconds {
                value,
                min: MIN_RING_SECONDS,
            });
        }
        Ok(())
    }

    /// Reject an identity already claimed anywhere in the shared
    /// namespace: reserved gateway identities, apartment extensions,
    /// or resident SIP identities.
    fn check_identity_free(&self, identity: &str) -> Result<(), DirectoryError> {
        if self.reserved.contains(identity) {
            return Err(DirectoryError::ReservedIdentity {
                identity: identity.to_owned(),
            });
        }
        for apartment in &self.apartments {
            if apartment.extension.as_str() == identity {
                return Err(DirectoryError::DuplicateExtension {
                    extension: identity.to_owned(),
                });
            }
            if apartment.residents.iter().any(|r| r.sip_identity == identity) {
                return Err(DirectoryError::DuplicateIdentity {
                    identity: identity.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Concatenate the apartment extension with an increasing suffix
    /// until a free identity turns up. Bounded search.
    fn synthesize_identity(&self, apartment_at: usize) -> Result<String, DirectoryError> {
        let extension = self.apartments[apartment_at].extension.clone();
        for suffix in 1..=IDENTITY_SUFFIX_ATTEMPTS {
            let candidate = format!("{extension}{suffix:02}");
            if self.check_identity_free(&candidate).is_ok() {
                return Ok(candidate);
            }
        }
        Err(DirectoryError::IdentitySpaceExhausted {
            extension: extension.to_string(),
            attempts: IDENTITY_SUFFIX_ATTEMPTS,
        })
    }
}

fn is_valid_identity(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_LEN)
        .map(|_| {
            let byte = SECRET_ALPHABET
                .choose(&mut rng)
                .copied()
                .unwrap_or(b'x');
            char::from(byte)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(ext: &str) -> ApartmentDraft {
        ApartmentDraft {
            label: format!("Apt {ext}"),
            extension: ext.into(),
            strategy: RingStrategy::Sequential,
            ring_seconds: 20,
        }
    }

    fn resident(name: &str, identity: Option<&str>, priority: i32) -> ResidentDraft {
        ResidentDraft {
            name: name.into(),
            sip_identity: identity.map(Into::into),
            secret: None,
            priority,
        }
    }

    #[test]
    fn duplicate_extension_rejected() {
        let mut dir = Directory::new([]);
        dir.create_apartment(draft("101")).unwrap();
        let err = dir.create_apartment(draft("101")).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateExtension { .. }));
        assert_eq!(dir.apartments().len(), 1);
    }

    #[test]
    fn reserved_identity_rejected_for_apartment_and_resident() {
        let mut dir = Directory::new(["100".to_owned()]);
        let err = dir.create_apartment(draft("100")).unwrap_err();
        assert!(matches!(err, DirectoryError::ReservedIdentity { .. }));

        let ap = dir.create_apartment(draft("101")).unwrap();
        let err = dir
            .add_resident(ap, resident("Alice", Some("100"), 10))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ReservedIdentity { .. }));
    }

    #[test]
    fn identity_unique_across_whole_directory() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        let b = dir.create_apartment(draft("102")).unwrap();
        dir.add_resident(a, resident("Alice", Some("1011"), 10))
            .unwrap();

        // Same identity under a *different* apartment still collides.
        let err = dir
            .add_resident(b, resident("Bob", Some("1011"), 10))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateIdentity { .. }));

        // A resident may not claim an apartment extension either.
        let err = dir
            .add_resident(b, resident("Bob", Some("101"), 10))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateExtension { .. }));
    }

    #[test]
    fn extension_disjoint_from_resident_identities() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        dir.add_resident(a, resident("Alice", Some("2001"), 10))
            .unwrap();
        let err = dir.create_apartment(draft("2001")).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateIdentity { .. }));
    }

    #[test]
    fn synthesized_identities_skip_taken_slots() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        let first = dir.add_resident(a, resident("Alice", None, 10)).unwrap();
        assert_eq!(first.sip_identity, "10101");
        let second = dir.add_resident(a, resident("Bob", None, 10)).unwrap();
        assert_eq!(second.sip_identity, "10102");
    }

    #[test]
    fn identity_synthesis_exhaustion_is_reported() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("7")).unwrap();
        for n in 1..=IDENTITY_SUFFIX_ATTEMPTS {
            dir.add_resident(a, resident(&format!("r{n}"), Some(&format!("7{n:02}")), 0))
                .unwrap();
        }
        let err = dir.add_resident(a, resident("overflow", None, 0)).unwrap_err();
        assert!(matches!(err, DirectoryError::IdentitySpaceExhausted { .. }));
    }

    #[test]
    fn residents_keep_canonical_ring_order() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        dir.add_resident(a, resident("Bob", Some("1011"), 20)).unwrap();
        dir.add_resident(a, resident("Carol", Some("1012"), 5)).unwrap();
        dir.add_resident(a, resident("Alice", Some("1013"), 5)).unwrap();

        let names: Vec<&str> = dir.apartment(a).unwrap().residents
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["Alice", "Carol", "Bob"]);
    }

    #[test]
    fn apartments_ordered_by_extension_value() {
        let mut dir = Directory::new([]);
        dir.create_apartment(draft("1010")).unwrap();
        dir.create_apartment(draft("9")).unwrap();
        dir.create_apartment(draft("101")).unwrap();
        let order: Vec<&str> = dir
            .apartments()
            .iter()
            .map(|a| a.extension.as_str())
            .collect();
        assert_eq!(order, ["9", "101", "1010"]);
    }

    #[test]
    fn remove_apartment_cascades_and_frees_identities() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        dir.add_resident(a, resident("Alice", Some("1011"), 10))
            .unwrap();
        let removed = dir.remove_apartment(a).unwrap();
        assert_eq!(removed.residents.len(), 1);
        assert_eq!(dir.resident_count(), 0);

        // The cascade released the identity for reuse.
        let b = dir.create_apartment(draft("102")).unwrap();
        dir.add_resident(b, resident("Bob", Some("1011"), 10))
            .unwrap();
    }

    #[test]
    fn remove_missing_records_is_an_empty_result() {
        let mut dir = Directory::new([]);
        assert!(dir.remove_apartment(ApartmentId::new()).is_none());
        assert!(dir.remove_resident(ResidentId::new()).is_none());
        assert!(dir.find_by_identity("nope").is_none());
    }

    #[test]
    fn find_by_identity_matches_extension_and_resident() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        dir.add_resident(a, resident("Alice", Some("1011"), 10))
            .unwrap();
        assert_eq!(dir.find_by_identity("101").unwrap().id, a);
        assert_eq!(dir.find_by_identity("1011").unwrap().id, a);
    }

    #[test]
    fn ring_seconds_below_minimum_rejected() {
        let mut dir = Directory::new([]);
        let mut d = draft("101");
        d.ring_seconds = 4;
        let err = dir.create_apartment(d).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRingSeconds { .. }));
    }

    #[test]
    fn generated_secret_has_expected_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_LEN);
        assert!(secret.bytes().all(|b| SECRET_ALPHABET.contains(&b)));
    }

    #[test]
    fn update_strategy_validates_ring_seconds_first() {
        let mut dir = Directory::new([]);
        let a = dir.create_apartment(draft("101")).unwrap();
        let err = dir
            .update_strategy(a, RingStrategy::Parallel, Some(2))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRingSeconds { .. }));
        // Unchanged on rejection.
        assert_eq!(
            dir.apartment(a).unwrap().strategy,
            RingStrategy::Sequential
        );

        dir.update_strategy(a, RingStrategy::Parallel, Some(30)).unwrap();
        let ap = dir.apartment(a).unwrap();
        assert_eq!(ap.strategy, RingStrategy::Parallel);
        assert_eq!(ap.ring_seconds, 30);
    }
}
