// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The host's
// command processor routes each variant to one API call.

pub mod requests;

use serde::Serialize;
use zoneweaver_api::models::{ActionOutcome, ApplyMethod};

use crate::error::CoreError;

pub use requests::{ArcTuning, NewBootEnvironment, PackageChange, RepositorySpec, TimeSyncSettings};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against a Zoneweaver host.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Repositories ─────────────────────────────────────────────────
    AddRepository(RepositorySpec),
    UpdateRepository {
        name: String,
        update: RepositorySpec,
    },
    RemoveRepository {
        name: String,
    },

    // ── Boot environments ────────────────────────────────────────────
    CreateBootEnvironment(NewBootEnvironment),
    DeleteBootEnvironment {
        name: String,
        force: bool,
    },
    ActivateBootEnvironment {
        name: String,
    },
    MountBootEnvironment {
        name: String,
        mountpoint: String,
        shared_mode: Option<String>,
    },
    UnmountBootEnvironment {
        name: String,
        force: bool,
    },

    // ── ZFS ARC ──────────────────────────────────────────────────────
    UpdateArcConfig(ArcTuning),
    ResetArcConfig {
        apply_method: ApplyMethod,
    },

    // ── Packages ─────────────────────────────────────────────────────
    InstallPackages(PackageChange),
    UninstallPackages(PackageChange),

    // ── Time ─────────────────────────────────────────────────────────
    UpdateTimeSyncConfig(TimeSyncSettings),
    SyncTime {
        server: Option<String>,
    },
    SetTimezone {
        timezone: String,
    },
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddRepository(_) => "add-repository",
            Self::UpdateRepository { .. } => "update-repository",
            Self::RemoveRepository { .. } => "remove-repository",
            Self::CreateBootEnvironment(_) => "create-boot-environment",
            Self::DeleteBootEnvironment { .. } => "delete-boot-environment",
            Self::ActivateBootEnvironment { .. } => "activate-boot-environment",
            Self::MountBootEnvironment { .. } => "mount-boot-environment",
            Self::UnmountBootEnvironment { .. } => "unmount-boot-environment",
            Self::UpdateArcConfig(_) => "update-arc-config",
            Self::ResetArcConfig { .. } => "reset-arc-config",
            Self::InstallPackages(_) => "install-packages",
            Self::UninstallPackages(_) => "uninstall-packages",
            Self::UpdateTimeSyncConfig(_) => "update-time-sync-config",
            Self::SyncTime { .. } => "sync-time",
            Self::SetTimezone { .. } => "set-timezone",
        }
    }

    /// Checks that can fail before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::AddRepository(spec) => spec.validate_new(),
            Self::UpdateArcConfig(tuning) => tuning.validate(),
            Self::InstallPackages(change) | Self::UninstallPackages(change) => change.validate(),
            Self::UpdateTimeSyncConfig(settings) => settings.validate(),
            Self::SetTimezone { timezone } if timezone.trim().is_empty() => {
                Err(CoreError::validation("timezone is required"))
            }
            Self::MountBootEnvironment { mountpoint, .. } if !mountpoint.starts_with('/') => {
                Err(CoreError::validation(format!(
                    "mountpoint must be an absolute path, got {mountpoint:?}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandResult {
    /// Completed synchronously.
    Ok { message: Option<String> },
    /// Queued on the host; poll the task for completion.
    Accepted {
        task_id: String,
        message: Option<String>,
    },
}

impl From<ActionOutcome> for CommandResult {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome.task_id() {
            Some(task_id) => Self::Accepted {
                task_id,
                message: outcome.message,
            },
            None => Self::Ok {
                message: outcome.message,
            },
        }
    }
}

impl CommandResult {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ok { message } | Self::Accepted { message, .. } => message.as_deref(),
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::Accepted { task_id, .. } => Some(task_id),
            Self::Ok { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn outcome_with_task_is_accepted() {
        let outcome: ActionOutcome = serde_json::from_value(serde_json::json!({
            "message": "Package installation task created",
            "data": { "task_id": "7f3c" }
        }))
        .unwrap();
        let result = CommandResult::from(outcome);
        assert_eq!(result.task_id(), Some("7f3c"));
        assert_eq!(result.message(), Some("Package installation task created"));
    }

    #[test]
    fn outcome_without_task_is_ok() {
        let outcome: ActionOutcome =
            serde_json::from_value(serde_json::json!({ "message": "done" })).unwrap();
        assert_eq!(
            CommandResult::from(outcome),
            CommandResult::Ok {
                message: Some("done".into())
            }
        );
    }

    #[test]
    fn validation_catches_bad_input_early() {
        assert!(
            Command::SetTimezone {
                timezone: " ".into()
            }
            .validate()
            .is_err()
        );
        assert!(
            Command::MountBootEnvironment {
                name: "be1".into(),
                mountpoint: "mnt".into(),
                shared_mode: None,
            }
            .validate()
            .is_err()
        );
        Command::RemoveRepository {
            name: "extra".into(),
        }
        .validate()
        .unwrap();
    }
}
