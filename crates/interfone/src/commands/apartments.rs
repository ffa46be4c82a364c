//! Apartment command handlers.

use serde::Serialize;
use tabled::Tabled;

use interfone_core::{Apartment, ApartmentDraft};

use crate::cli::{ApartmentsArgs, ApartmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct ApartmentRow {
    #[tabled(rename = "Extension")]
    extension: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Ring")]
    ring_seconds: u32,
    #[tabled(rename = "Residents")]
    residents: usize,
}

impl From<&Apartment> for ApartmentRow {
    fn from(a: &Apartment) -> Self {
        Self {
            extension: a.extension.to_string(),
            label: a.label.clone(),
            strategy: a.strategy.to_string(),
            ring_seconds: a.ring_seconds,
            residents: a.residents.len(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ApartmentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;

    match args.command {
        ApartmentsCommand::List => {
            let store = crate::config::open_store(&config)?;
            let rows: Vec<ApartmentRow> = store
                .directory()
                .apartments()
                .iter()
                .map(ApartmentRow::from)
                .collect();
            let out = output::render_list(&global.output, &rows, |r| r.extension.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ApartmentsCommand::Create {
            label,
            extension,
            strategy,
            ring_seconds,
        } => {
            let mut store = crate::config::open_store(&config)?;
            let strategy = util::parse_strategy(&strategy)?;
            let draft = ApartmentDraft {
                label,
                extension: extension.clone(),
                strategy,
                ring_seconds: ring_seconds.unwrap_or(config.default_ring_seconds),
            };
            store.directory_mut().create_apartment(draft)?;
            store.save()?;
            util::note(
                global.quiet,
                &format!("Apartment {extension} created -- run `interfone apply` to push it live"),
            );
            Ok(())
        }

        ApartmentsCommand::SetStrategy {
            extension,
            strategy,
            ring_seconds,
        } => {
            let mut store = crate::config::open_store(&config)?;
            let strategy = util::parse_strategy(&strategy)?;
            let id = util::resolve_apartment(store.directory(), &extension)?.id;
            store
                .directory_mut()
                .update_strategy(id, strategy, ring_seconds)?;
            store.save()?;
            util::note(
                global.quiet,
                &format!("Apartment {extension} now rings {strategy}"),
            );
            Ok(())
        }

        ApartmentsCommand::Remove { extension } => {
            let mut store = crate::config::open_store(&config)?;
            let apartment = util::resolve_apartment(store.directory(), &extension)?;
            let (id, label, residents) =
                (apartment.id, apartment.label.clone(), apartment.residents.len());

            if !util::confirm(
                &format!("Remove apartment {extension} ({label}) and its {residents} resident(s)?"),
                global.yes,
            )? {
                return Ok(());
            }

            store.directory_mut().remove_apartment(id);
            store.save()?;
            util::note(global.quiet, &format!("Apartment {extension} removed"));
            Ok(())
        }
    }
}
