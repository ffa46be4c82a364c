//! Dashboard rendering: one-shot and live watch mode.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use interfone_core::dashboard::{ApartmentRow, DashboardView, build_view};
use interfone_core::status::collect;
use interfone_core::{ControlInterface, spawn_monitor};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct DashRow {
    #[tabled(rename = "Extension")]
    extension: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Residents")]
    residents: u32,
    #[tabled(rename = "Online")]
    online: u32,
    #[tabled(rename = "Busy")]
    busy: u32,
}

impl From<&ApartmentRow> for DashRow {
    fn from(r: &ApartmentRow) -> Self {
        Self {
            extension: r.extension.clone(),
            label: r.label.clone(),
            strategy: r.strategy.to_string(),
            residents: r.residents,
            online: r.online,
            busy: r.busy,
        }
    }
}

fn render_view(view: &DashboardView, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<DashRow> = view.rows.iter().map(DashRow::from).collect();
            let table = output::render_list(&OutputFormat::Table, &rows, |r| r.extension.clone());
            let totals = format!(
                "{} apartment(s) · {} resident(s) · {} online · {} busy",
                view.totals.apartments, view.totals.residents, view.totals.online, view.totals.busy,
            );
            let totals = if color {
                totals.bold().to_string()
            } else {
                totals
            };
            let stamp = view.collected_at.map_or_else(
                || "telemetry: not collected yet".to_owned(),
                |at| format!("telemetry: {}", at.format("%H:%M:%S UTC")),
            );
            format!("{table}\n{totals}\n{stamp}")
        }
        OutputFormat::Plain => view
            .rows
            .iter()
            .map(|r| format!("{} {}/{} online", r.extension, r.online, r.residents))
            .collect::<Vec<_>>()
            .join("\n"),
        other => output::render_value(other, view, |_| String::new()),
    }
}

// ── One-shot ────────────────────────────────────────────────────────

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;
    let store = crate::config::open_store(&config)?;
    let control = crate::config::control(&config);

    let snapshot = collect(&control).await;
    let view = build_view(store.directory().apartments(), &snapshot);

    let color = output::should_color(&global.color);
    let out = render_view(&view, &global.output, color);
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Watch mode ──────────────────────────────────────────────────────

/// Re-render the dashboard on every status snapshot until Ctrl-C.
///
/// The directory is re-read each tick so edits from another terminal
/// show up live; the atomic persistence rules mean a read never sees a
/// half-written file.
pub async fn watch(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = crate::config::resolve(global)?;
    let interval = args
        .interval
        .map_or_else(|| config.refresh_interval(), Duration::from_secs);
    let color = output::should_color(&global.color);

    let control: Arc<dyn ControlInterface> = Arc::new(crate::config::control(&config));
    let cancel = CancellationToken::new();
    let (mut snapshots, handle) = spawn_monitor(control, interval, cancel.clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let store = crate::config::open_store(&config)?;
                let view = build_view(store.directory().apartments(), &snapshot);

                let mut stdout = std::io::stdout().lock();
                // Clear screen, repaint in place.
                let _ = write!(stdout, "\x1b[2J\x1b[H");
                let header = "interfone — live dashboard (Ctrl-C to quit)";
                let header = if color {
                    header.cyan().to_string()
                } else {
                    header.to_owned()
                };
                let _ = writeln!(stdout, "{header}\n");
                let _ = writeln!(stdout, "{}", render_view(&view, &global.output, color));
            }
        }
    }

    cancel.cancel();
    let _ = handle.await;
    Ok(())
}
