use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use libdesk_client::ClientConfig;
use libdesk_client::config::{default_config_path, set_file_value};

use crate::cli::{ConfigCommands, OutputFormat};
use crate::output::{print_json, print_success};

fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    Ok(match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    })
}

/// Print the effective configuration.
pub fn show(config: &ClientConfig, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            println!("{}: {}", "Base URL".cyan(), config.base_url);
            println!("{}: {}", "Profile".cyan(), config.profile);
            println!("{}: {}s", "Timeout".cyan(), config.request_timeout_secs);
            println!("{}: {}", "Auth retries".cyan(), config.max_auth_retries);
            println!("{}: {}", "Log level".cyan(), config.log_level);
            println!(
                "{}: {}",
                "Credentials".cyan(),
                config
                    .credentials_dir()
                    .map(|d| d.display().to_string())
                    .unwrap_or_else(|_| "(unknown)".to_string())
            );
        }
    }
}

/// Edit or locate the config file. These never load the current
/// configuration, so a file holding an invalid value can still be repaired.
/// Returns `false` for commands that need the loaded configuration.
pub fn edit(command: &ConfigCommands, explicit: Option<&Path>) -> Result<bool> {
    match command {
        ConfigCommands::Show => Ok(false),
        ConfigCommands::Set(args) => {
            let path = config_file(explicit)?;
            set_file_value(&path, &args.key, &args.value)?;
            print_success(&format!("Set {} = {} in {}", args.key, args.value, path.display()));
            Ok(true)
        }
        ConfigCommands::Path => {
            println!("{}", config_file(explicit)?.display());
            Ok(true)
        }
    }
}
