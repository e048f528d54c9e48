//! ZFS ARC command handlers.

use zoneweaver_core::{ApplyMethod, ArcTuning, Command as CoreCommand, Host};

use crate::cli::{ApplyMethodArg, ArcArgs, ArcCommand, ArcTuningArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn map_apply(method: ApplyMethodArg) -> ApplyMethod {
    match method {
        ApplyMethodArg::Runtime => ApplyMethod::Runtime,
        ApplyMethodArg::Persistent => ApplyMethod::Persistent,
        ApplyMethodArg::Both => ApplyMethod::Both,
    }
}

fn tuning(args: &ArcTuningArgs) -> ArcTuning {
    ArcTuning {
        arc_max_gb: args.max_gb,
        arc_min_gb: args.min_gb,
        arc_max_percent: args.max_percent,
        user_reserve_hint_pct: args.user_reserve_hint_pct,
        vdev_max_pending: args.vdev_max_pending,
        prefetch_disable: args.prefetch_disable,
        apply_method: map_apply(args.apply_method),
    }
}

pub async fn handle(host: &Host, args: ArcArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ArcCommand::Show => {
            let config = host.arc_config().await?;
            let out = output::render_value(global.output, &config)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ArcCommand::Set(args) => {
            let result = host.execute(CoreCommand::UpdateArcConfig(tuning(&args))).await?;
            util::report("ARC settings applied", &result, global);
            Ok(())
        }

        ArcCommand::Validate(args) => {
            let report = host.validate_arc(&tuning(&args)).await?;
            let out = output::render_value(global.output, &report)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ArcCommand::Reset { apply_method } => {
            if !util::confirm("Reset ARC tunables to defaults?", global)? {
                return Ok(());
            }
            let result = host
                .execute(CoreCommand::ResetArcConfig {
                    apply_method: map_apply(apply_method),
                })
                .await?;
            util::report("ARC settings reset", &result, global);
            Ok(())
        }
    }
}
