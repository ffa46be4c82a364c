//! Output formatting: table, JSON, YAML, plain.
//!
//! Row structs derive both `Tabled` (table rendering) and `Serialize`
//! (structured formats), so one row type feeds every format.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Render a list of rows in the chosen format.
///
/// `id_fn` supplies the one-value-per-line identifier used by `plain`.
pub fn render_list<R>(format: &OutputFormat, rows: &[R], id_fn: impl Fn(&R) -> String) -> String
where
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        OutputFormat::Json => render_json(rows, false),
        OutputFormat::JsonCompact => render_json(rows, true),
        OutputFormat::Yaml => render_yaml(rows),
        OutputFormat::Plain => rows.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serializable value; `detail_fn` supplies the
/// human-readable form used for both `table` and `plain`.
pub fn render_value<T>(format: &OutputFormat, value: &T, detail_fn: impl Fn(&T) -> String) -> String
where
    T: Serialize,
{
    match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(value),
        OutputFormat::Json => render_json(value, false),
        OutputFormat::JsonCompact => render_json(value, true),
        OutputFormat::Yaml => render_yaml(value),
    }
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|err| format!("serialization failed: {err}"))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|err| format!("serialization failed: {err}"))
}
