//! Time sync and timezone command handlers.

use zoneweaver_core::{Command as CoreCommand, Host, TimeSyncSettings};

use crate::cli::{GlobalOpts, TimeArgs, TimeCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(host: &Host, args: TimeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TimeCommand::Status => {
            let status = host.time_sync_status().await?;
            let out = output::render_value(global.output, &status)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TimeCommand::Config => {
            let config = host.time_sync_config().await?;
            let out = output::render_value(global.output, &config)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TimeCommand::SetConfig {
            servers,
            file,
            no_backup,
            no_restart,
        } => {
            let config_content = file.map(std::fs::read_to_string).transpose()?;
            let result = host
                .execute(CoreCommand::UpdateTimeSyncConfig(TimeSyncSettings {
                    config_content,
                    servers,
                    backup_existing: !no_backup,
                    restart_service: !no_restart,
                }))
                .await?;
            util::report("Time sync configuration updated", &result, global);
            Ok(())
        }

        TimeCommand::Sync { server } => {
            let result = host.execute(CoreCommand::SyncTime { server }).await?;
            util::report("Time sync started", &result, global);
            Ok(())
        }

        TimeCommand::Timezone => {
            let tz = host.timezone().await?;
            let out = output::render_value(global.output, &tz)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TimeCommand::SetTimezone { timezone } => {
            let result = host
                .execute(CoreCommand::SetTimezone {
                    timezone: timezone.clone(),
                })
                .await?;
            util::report(&format!("Timezone set to {timezone}"), &result, global);
            Ok(())
        }

        TimeCommand::Timezones => {
            let zones = host.timezones().await?;
            let out = output::render_single(
                global.output,
                &zones,
                |z| z.join("\n"),
                |z| z.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
