// ── Dashboard aggregator ──
//
// Read-only projection joining the directory with the latest status
// snapshot. Counts are computed per apartment in canonical order plus
// directory-wide totals; nothing here mutates either input.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Apartment, ApartmentId, RegistrationState, RingStrategy};
use crate::status::StatusSnapshot;

/// One apartment-level dashboard row.
#[derive(Debug, Clone, Serialize)]
pub struct ApartmentRow {
    pub id: ApartmentId,
    pub label: String,
    pub extension: String,
    pub strategy: RingStrategy,
    pub residents: u32,
    /// Residents whose registration state is `available`.
    pub online: u32,
    /// Residents with at least one busy channel.
    pub busy: u32,
}

/// One resident-level row for apartment detail views.
#[derive(Debug, Clone, Serialize)]
pub struct ResidentRow {
    pub name: String,
    pub identity: String,
    pub priority: i32,
    pub registration: RegistrationState,
    pub busy_channels: u32,
}

/// Directory-wide totals (sums of the apartment rows).
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Totals {
    pub apartments: u32,
    pub residents: u32,
    pub online: u32,
    pub busy: u32,
}

/// The complete display model for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub rows: Vec<ApartmentRow>,
    pub totals: Totals,
    pub collected_at: Option<DateTime<Utc>>,
}

/// Join the directory snapshot with live status into a display model.
pub fn build_view(apartments: &[Apartment], status: &StatusSnapshot) -> DashboardView {
    let mut totals = Totals::default();
    let rows: Vec<ApartmentRow> = apartments
        .iter()
        .map(|apartment| {
            let row = apartment_row(apartment, status);
            totals.apartments += 1;
            totals.residents += row.residents;
            totals.online += row.online;
            totals.busy += row.busy;
            row
        })
        .collect();

    DashboardView {
        rows,
        totals,
        collected_at: status.collected_at,
    }
}

fn apartment_row(apartment: &Apartment, status: &StatusSnapshot) -> ApartmentRow {
    let mut online = 0;
    let mut busy = 0;
    for resident in &apartment.residents {
        let entry = status.entry(&resident.sip_identity);
        if entry.is_online() {
            online += 1;
        }
        if entry.is_busy() {
            busy += 1;
        }
    }
    ApartmentRow {
        id: apartment.id,
        label: apartment.label.clone(),
        extension: apartment.extension.to_string(),
        strategy: apartment.strategy,
        residents: u32::try_from(apartment.residents.len()).unwrap_or(u32::MAX),
        online,
        busy,
    }
}

/// Resident rows for one apartment, in canonical ring order.
pub fn resident_rows(apartment: &Apartment, status: &StatusSnapshot) -> Vec<ResidentRow> {
    apartment
        .residents
        .iter()
        .map(|resident| {
            let entry = status.entry(&resident.sip_identity);
            ResidentRow {
                name: resident.name.clone(),
                identity: resident.sip_identity.clone(),
                priority: resident.priority,
                registration: entry.registration,
                busy_channels: entry.busy_channels,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::directory::Directory;
    use crate::model::{ApartmentDraft, ResidentDraft};

    fn directory_with_residents() -> Directory {
        let mut dir = Directory::new([]);
        let a = dir
            .create_apartment(ApartmentDraft {
                label: "Apt 101".into(),
                extension: "101".into(),
                strategy: RingStrategy::Sequential,
                ring_seconds: 20,
            })
            .unwrap();
        let b = dir
            .create_apartment(ApartmentDraft {
                label: "Apt 102".into(),
                extension: "102".into(),
                strategy: RingStrategy::Parallel,
                ring_seconds: 20,
            })
            .unwrap();
        for (ap, name, identity) in [
            (a, "Alice", "1011"),
            (a, "Bob", "1012"),
            (b, "Carol", "1021"),
        ] {
            dir.add_resident(
                ap,
                ResidentDraft {
                    name: name.into(),
                    sip_identity: Some(identity.into()),
                    secret: Some("s".into()),
                    priority: 10,
                },
            )
            .unwrap();
        }
        dir
    }

    fn status() -> StatusSnapshot {
        let mut snapshot = StatusSnapshot::empty();
        snapshot
            .registrations
            .insert("1011".into(), RegistrationState::Available);
        snapshot
            .registrations
            .insert("1012".into(), RegistrationState::Unavailable);
        snapshot
            .registrations
            .insert("1021".into(), RegistrationState::Available);
        snapshot.busy.insert("1021".into(), 1);
        snapshot
    }

    #[test]
    fn rows_follow_canonical_order_with_counts() {
        let dir = directory_with_residents();
        let view = build_view(dir.apartments(), &status());

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].extension, "101");
        assert_eq!(view.rows[0].residents, 2);
        assert_eq!(view.rows[0].online, 1);
        assert_eq!(view.rows[0].busy, 0);
        assert_eq!(view.rows[1].extension, "102");
        assert_eq!(view.rows[1].online, 1);
        assert_eq!(view.rows[1].busy, 1);
    }

    #[test]
    fn totals_sum_apartment_rows() {
        let dir = directory_with_residents();
        let view = build_view(dir.apartments(), &status());
        assert_eq!(
            view.totals,
            Totals {
                apartments: 2,
                residents: 3,
                online: 2,
                busy: 1,
            }
        );
    }

    #[test]
    fn unknown_identities_count_as_offline() {
        let dir = directory_with_residents();
        let view = build_view(dir.apartments(), &StatusSnapshot::empty());
        assert_eq!(view.totals.online, 0);
        assert_eq!(view.totals.busy, 0);
        assert_eq!(view.totals.residents, 3);
    }

    #[test]
    fn resident_rows_join_status_in_ring_order() {
        let dir = directory_with_residents();
        let apartment = dir.find_by_identity("101").unwrap();
        let rows = resident_rows(apartment, &status());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].registration, RegistrationState::Available);
        assert_eq!(rows[1].name, "Bob");
        assert_eq!(rows[1].registration, RegistrationState::Unavailable);
    }
}
