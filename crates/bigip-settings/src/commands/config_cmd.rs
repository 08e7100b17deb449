//! Config subcommand handlers.

use super::effective_config;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = global
                .config
                .clone()
                .unwrap_or_else(bigip_config::config_path);
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = effective_config(global)?;
            print!("{}", bigip_config::redacted(&cfg)?);
            Ok(())
        }
    }
}
