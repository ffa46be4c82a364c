//! `interfone status` -- exchange reachability and telemetry summary.

use owo_colors::OwoColorize;
use serde::Serialize;

use interfone_core::status::collect;
use interfone_core::{ControlInterface, RegistrationState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusSummary {
    online: bool,
    version: Option<String>,
    registered: usize,
    contacts: usize,
    busy_identities: usize,
    busy_channels: u32,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;
    let control = crate::config::control(&config);

    let version = control
        .run("core show version")
        .await
        .ok()
        .map(|out| out.lines().next().unwrap_or_default().to_owned());
    let snapshot = collect(&control).await;

    let summary = StatusSummary {
        online: version.is_some(),
        version,
        registered: snapshot
            .registrations
            .values()
            .filter(|state| **state == RegistrationState::Available)
            .count(),
        contacts: snapshot.registrations.len(),
        busy_identities: snapshot.busy.len(),
        busy_channels: snapshot.busy.values().sum(),
    };

    let color = output::should_color(&global.color);
    let out = output::render_value(&global.output, &summary, |s| {
        let state = if s.online {
            if color {
                "ONLINE".green().to_string()
            } else {
                "ONLINE".to_owned()
            }
        } else if color {
            "OFFLINE".red().to_string()
        } else {
            "OFFLINE".to_owned()
        };
        let version = s.version.as_deref().unwrap_or("-");
        format!(
            "exchange:   {state} ({version})\n\
             registered: {} of {} contact(s) available\n\
             busy:       {} identity(ies) on {} channel(s)",
            s.registered, s.contacts, s.busy_identities, s.busy_channels,
        )
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
