//! Boot environment command handlers.

use tabled::Tabled;
use zoneweaver_core::{BootEnvironment, Command as CoreCommand, Host, NewBootEnvironment};

use crate::cli::{BeArgs, BeCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Mountpoint")]
    mountpoint: String,
    #[tabled(rename = "Space")]
    space: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// beadm's flag column: N = active now, R = active on reboot.
fn active_flags(be: &BootEnvironment) -> String {
    match (be.active_now, be.active_on_reboot) {
        (true, true) => "NR".into(),
        (true, false) => "N".into(),
        (false, true) => "R".into(),
        (false, false) => "-".into(),
    }
}

impl From<&BootEnvironment> for BeRow {
    fn from(be: &BootEnvironment) -> Self {
        Self {
            name: be.name.clone(),
            active: active_flags(be),
            mountpoint: util::or_dash(be.mountpoint.as_deref()),
            space: util::or_dash(be.space.as_deref()),
            created: util::or_dash(be.created.as_deref()),
        }
    }
}

fn be_not_found(name: &str) -> impl FnOnce(zoneweaver_core::CoreError) -> CliError + '_ {
    move |e| util::not_found_as(e, "boot environment", name, "be list")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(host: &Host, args: BeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        BeCommand::List => {
            let bes = host.boot_environments().await?;
            let out = output::render_list(
                global.output,
                &bes,
                |b| BeRow::from(b),
                |b| b.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BeCommand::Create {
            name,
            description,
            source,
            snapshot,
            activate,
        } => {
            let result = host
                .execute(CoreCommand::CreateBootEnvironment(NewBootEnvironment {
                    name,
                    description,
                    source_be: source,
                    snapshot,
                    activate,
                }))
                .await?;
            util::report("Boot environment creation started", &result, global);
            Ok(())
        }

        BeCommand::Delete { name, force } => {
            if !util::confirm(&format!("Delete boot environment '{name}'?"), global)? {
                return Ok(());
            }
            let result = host
                .execute(CoreCommand::DeleteBootEnvironment {
                    name: name.clone(),
                    force,
                })
                .await
                .map_err(be_not_found(&name))?;
            util::report("Boot environment deletion started", &result, global);
            Ok(())
        }

        BeCommand::Activate { name } => {
            let result = host
                .execute(CoreCommand::ActivateBootEnvironment { name: name.clone() })
                .await
                .map_err(be_not_found(&name))?;
            util::report(&format!("'{name}' will be active on next boot"), &result, global);
            Ok(())
        }

        BeCommand::Mount {
            name,
            mountpoint,
            shared_mode,
        } => {
            let result = host
                .execute(CoreCommand::MountBootEnvironment {
                    name: name.clone(),
                    mountpoint,
                    shared_mode,
                })
                .await
                .map_err(be_not_found(&name))?;
            util::report("Boot environment mount started", &result, global);
            Ok(())
        }

        BeCommand::Unmount { name, force } => {
            let result = host
                .execute(CoreCommand::UnmountBootEnvironment {
                    name: name.clone(),
                    force,
                })
                .await
                .map_err(be_not_found(&name))?;
            util::report("Boot environment unmount started", &result, global);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_flags_follow_beadm() {
        let mut be = BootEnvironment {
            name: "omnios-r151050".into(),
            active_now: true,
            active_on_reboot: true,
            mountpoint: Some("/".into()),
            space: None,
            policy: None,
            created: None,
        };
        assert_eq!(active_flags(&be), "NR");
        be.active_on_reboot = false;
        assert_eq!(active_flags(&be), "N");
        be.active_now = false;
        assert_eq!(active_flags(&be), "-");
    }
}
