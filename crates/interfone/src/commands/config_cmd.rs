//! Config inspection commands.

use interfone_config::{Config, config_path, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config_path);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let config = crate::config::resolve(global)?;
            let out = output::render_value(&global.output, &config, |c| {
                toml::to_string_pretty(c).unwrap_or_else(|err| format!("render failed: {err}"))
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let path = global.config.clone().unwrap_or_else(config_path);
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    global.yes,
                )?
            {
                return Ok(());
            }
            save_config(&Config::default(), &path)?;
            util::note(global.quiet, &format!("Wrote {}", path.display()));
            Ok(())
        }
    }
}
