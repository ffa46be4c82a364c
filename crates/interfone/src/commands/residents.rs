//! Resident command handlers.

use serde::Serialize;
use tabled::Tabled;

use interfone_core::dashboard::{ResidentRow, resident_rows};
use interfone_core::status::collect;
use interfone_core::ResidentDraft;

use crate::cli::{GlobalOpts, ResidentsArgs, ResidentsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct ResidentListRow {
    #[tabled(rename = "Identity")]
    identity: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Busy")]
    busy_channels: u32,
}

impl From<ResidentRow> for ResidentListRow {
    fn from(r: ResidentRow) -> Self {
        Self {
            identity: r.identity,
            name: r.name,
            priority: r.priority,
            state: r.registration.to_string(),
            busy_channels: r.busy_channels,
        }
    }
}

/// Echoed once after `residents add` -- the operator hands these to
/// the device being provisioned.
#[derive(Serialize)]
struct CreatedResident {
    name: String,
    identity: String,
    secret: String,
    priority: i32,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ResidentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;

    match args.command {
        ResidentsCommand::List { extension } => {
            let store = crate::config::open_store(&config)?;
            let apartment = util::resolve_apartment(store.directory(), &extension)?;

            // Join live telemetry; degrades to unknown if the exchange
            // is unreachable.
            let control = crate::config::control(&config);
            let snapshot = collect(&control).await;

            let rows: Vec<ResidentListRow> = resident_rows(apartment, &snapshot)
                .into_iter()
                .map(Into::into)
                .collect();
            let out = output::render_list(&global.output, &rows, |r| r.identity.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResidentsCommand::Add {
            extension,
            name,
            identity,
            secret,
            priority,
        } => {
            let mut store = crate::config::open_store(&config)?;
            let apartment_id = util::resolve_apartment(store.directory(), &extension)?.id;
            let resident = store.directory_mut().add_resident(
                apartment_id,
                ResidentDraft {
                    name,
                    sip_identity: identity,
                    secret,
                    priority,
                },
            )?;
            store.save()?;

            let created = CreatedResident {
                name: resident.name.clone(),
                identity: resident.sip_identity.clone(),
                secret: resident.secret.clone(),
                priority: resident.priority,
            };
            let out = output::render_value(&global.output, &created, |c| {
                format!(
                    "Resident {} added to apartment {extension}\n  identity: {}\n  secret:   {}",
                    c.name, c.identity, c.secret
                )
            });
            output::print_output(&out, global.quiet);
            util::note(
                global.quiet,
                "Run `interfone apply` to push the new credentials live",
            );
            Ok(())
        }

        ResidentsCommand::Remove { identity } => {
            let mut store = crate::config::open_store(&config)?;
            let (id, name) = util::resolve_resident(store.directory(), &identity)?;

            if !util::confirm(&format!("Remove resident {identity} ({name})?"), global.yes)? {
                return Ok(());
            }

            store.directory_mut().remove_resident(id);
            store.save()?;
            util::note(global.quiet, &format!("Resident {identity} removed"));
            Ok(())
        }
    }
}
