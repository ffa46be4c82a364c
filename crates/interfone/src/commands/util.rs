//! Shared helpers for command handlers.

use std::str::FromStr;

use interfone_core::{Apartment, Directory, DirectoryError, ResidentId, RingStrategy};

use crate::error::CliError;

/// Resolve an apartment by its extension or by one of its residents'
/// SIP identities.
pub fn resolve_apartment<'a>(
    directory: &'a Directory,
    identity: &str,
) -> Result<&'a Apartment, CliError> {
    directory
        .find_by_identity(identity)
        .ok_or_else(|| CliError::NotFound {
            resource: "apartment",
            identifier: identity.to_owned(),
            list_command: "apartments list",
        })
}

/// Resolve a resident by SIP identity, returning `(id, name)`.
pub fn resolve_resident(
    directory: &Directory,
    identity: &str,
) -> Result<(ResidentId, String), CliError> {
    for apartment in directory.apartments() {
        for resident in &apartment.residents {
            if resident.sip_identity == identity {
                return Ok((resident.id, resident.name.clone()));
            }
        }
    }
    Err(CliError::NotFound {
        resource: "resident",
        identifier: identity.to_owned(),
        list_command: "residents list <extension>",
    })
}

/// Parse an operator-supplied ring strategy string.
pub fn parse_strategy(value: &str) -> Result<RingStrategy, CliError> {
    RingStrategy::from_str(value).map_err(|_| {
        CliError::Directory(DirectoryError::InvalidStrategy {
            value: value.to_owned(),
        })
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|err| CliError::Io(std::io::Error::other(err)))?;
    Ok(confirmed)
}

/// Status line for the operator, kept off stdout so it never mixes
/// with `--output` payloads.
pub fn note(quiet: bool, message: &str) {
    if !quiet {
        eprintln!("{message}");
    }
}
