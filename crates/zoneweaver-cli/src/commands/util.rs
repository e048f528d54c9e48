//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use zoneweaver_core::{CommandResult, CoreError, Inventory};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, global: &GlobalOpts) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Load a saved inventory for `--from-file`.
pub fn read_inventory_file(path: &Path) -> Result<Inventory, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("{}: {e}", path.display()),
    })
}

/// Spinner on stderr while a slow request runs. Hidden when quiet or
/// when stderr is not a terminal.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Report a write command outcome on stderr.
pub fn report(done: &str, result: &CommandResult, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    match result {
        CommandResult::Accepted { task_id, .. } => {
            eprintln!("{done} (task {task_id} queued)");
        }
        CommandResult::Ok { message } => match message {
            Some(m) => eprintln!("{done}: {m}"),
            None => eprintln!("{done}"),
        },
    }
}

/// Name the resource in a not-found reported by the host.
pub fn not_found_as(
    err: CoreError,
    resource_type: &str,
    identifier: &str,
    list_command: &str,
) -> CliError {
    match err {
        CoreError::NotFound { .. } => CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        },
        other => other.into(),
    }
}

/// `-` for missing values in table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}
