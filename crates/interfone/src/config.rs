//! CLI configuration resolution and shared construction helpers.
//!
//! Thin layer over `interfone_config`: applies `GlobalOpts` overrides,
//! then builds the store / control / apply-controller the handlers
//! share.

use interfone_config::{Config, load_config_or_default};

use interfone_core::{
    ApplyController, ArtifactWriter, AsteriskControl, DirectoryStore, SynthOptions,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the configuration, honoring `--config` and `--data-file`.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = load_config_or_default(global.config.as_deref())?;
    if let Some(ref path) = global.data_file {
        config.data_file = path.clone();
    }
    Ok(config)
}

/// Open the directory store at the configured path.
pub fn open_store(config: &Config) -> Result<DirectoryStore, CliError> {
    Ok(DirectoryStore::open(
        &config.data_file,
        config.reserved_identities.iter().cloned(),
    )?)
}

/// Build the exchange control client.
pub fn control(config: &Config) -> AsteriskControl {
    AsteriskControl::new(&config.asterisk_bin, config.command_timeout())
}

/// Build the apply controller over the configured artifact paths.
pub fn apply_controller(config: &Config) -> ApplyController {
    ApplyController::new(
        ArtifactWriter::new(&config.endpoints_file, &config.dialplan_file),
        SynthOptions {
            dial_context: config.dial_context.clone(),
        },
    )
}
