//! CLI error type -- everything a command handler can surface.

use miette::Diagnostic;
use thiserror::Error;

use interfone_core::{ApplyError, DirectoryError, ExchangeError, StoreError};

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error(transparent)]
    Config(#[from] interfone_config::ConfigError),

    #[error("{resource} '{identifier}' not found (see `interfone {list_command}`)")]
    NotFound {
        resource: &'static str,
        identifier: String,
        list_command: &'static str,
    },

    #[error("apply failed: {reason}")]
    ApplyFailed { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
