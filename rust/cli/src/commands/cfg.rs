//! Configuration command handler.
//!
//! This module implements the `cfg` command, which displays the current
//! Holdem configuration settings with their sources (default, environment,
//! or configuration file).
//!
//! # Example Output
//!
//! ```json
//! {
//!   "starting_stack": {
//!     "value": 10000,
//!     "source": "default"
//!   },
//!   "level": {
//!     "value": 1,
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config;
use crate::error::CliError;
use crate::ui;
use std::io::Write;

/// Handle the cfg command.
///
/// Loads the current configuration with source tracking and displays it
/// as formatted JSON to the output stream.
///
/// # Arguments
///
/// * `out` - Output stream for command output
/// * `err` - Error stream for error messages
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(CliError)` if configuration loading fails or output writing fails
///
/// # Errors
///
/// Returns `CliError::Config` if configuration loading fails.
/// Returns `CliError::Io` if writing to output stream fails.
pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let resolved = match config::load_with_sources() {
        Ok(r) => r,
        Err(e) => {
            ui::write_error(err, &format!("Invalid configuration: {}", e))?;
            return Err(CliError::Config(format!("Invalid configuration: {}", e)));
        }
    };

    let config::ConfigResolved { config, sources } = resolved;
    let display = serde_json::json!({
        "starting_stack": {
            "value": config.starting_stack,
            "source": sources.starting_stack,
        },
        "level": {
            "value": config.level,
            "source": sources.level,
        },
        "seed": {
            "value": config.seed,
            "source": sources.seed,
        },
        "adaptive": {
            "value": config.adaptive,
            "source": sources.adaptive,
        },
        "ai_version": {
            "value": config.ai_version,
            "source": sources.ai_version,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
