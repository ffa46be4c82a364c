//! `interfone apply` -- synthesize, write, reload (restart fallback).

use interfone_core::ApplyOutcome;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;
    let store = crate::config::open_store(&config)?;
    let control = crate::config::control(&config);
    let controller = crate::config::apply_controller(&config);

    let report = controller
        .run(store.directory().apartments(), &control)
        .await?;

    match report.outcome {
        ApplyOutcome::Applied { via_restart } => {
            let how = if via_restart {
                "via restart fallback"
            } else {
                "via reload"
            };
            util::note(
                global.quiet,
                &format!(
                    "Applied: {} apartment(s), {} resident(s) synthesized {how}",
                    store.directory().apartments().len(),
                    store.directory().resident_count(),
                ),
            );
            if !report.detail.is_empty() {
                tracing::info!(detail = %report.detail, "exchange output");
            }
            Ok(())
        }
        ApplyOutcome::WriteFailed { reason } => Err(CliError::ApplyFailed {
            reason: format!("artifact write failed ({reason}); previous config left in place"),
        }),
        ApplyOutcome::RestartFailed {
            reload_error,
            restart_error,
        } => Err(CliError::ApplyFailed {
            reason: format!("reload failed ({reload_error}); restart failed ({restart_error})"),
        }),
    }
}
