//! Package command handlers.

use tabled::Tabled;
use zoneweaver_core::{Command as CoreCommand, Host, Package, PackageChange};

use crate::cli::{GlobalOpts, PackageChangeArgs, PackagesArgs, PackagesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Publisher")]
    publisher: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl From<&Package> for PackageRow {
    fn from(p: &Package) -> Self {
        Self {
            name: p.name.clone(),
            version: util::or_dash(p.version.as_deref()),
            publisher: util::or_dash(p.publisher.as_deref()),
            flags: util::or_dash(p.flags.as_deref()),
        }
    }
}

fn change(args: PackageChangeArgs) -> PackageChange {
    PackageChange {
        packages: args.packages,
        accept_licenses: args.accept_licenses.then_some(true),
        dry_run: args.dry_run,
        be_name: args.be_name,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(host: &Host, args: PackagesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PackagesCommand::List { filter } => {
            let packages = host.packages(filter.as_deref()).await?;
            print_packages(&packages, global)
        }

        PackagesCommand::Search { query } => {
            let bar = util::spinner(&format!("Searching for {query}"), global);
            let packages = host.search_packages(&query).await;
            bar.finish_and_clear();
            print_packages(&packages?, global)
        }

        PackagesCommand::Info { package } => {
            let info = host
                .package_info(&package)
                .await
                .map_err(|e| util::not_found_as(e, "package", &package, "packages list"))?;
            let out = output::render_value(global.output, &info)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PackagesCommand::Install(args) => {
            let result = host.execute(CoreCommand::InstallPackages(change(args))).await?;
            util::report("Package installation started", &result, global);
            Ok(())
        }

        PackagesCommand::Uninstall(args) => {
            let names = args.packages.join(", ");
            if !args.dry_run && !util::confirm(&format!("Uninstall {names}?"), global)? {
                return Ok(());
            }
            let result = host
                .execute(CoreCommand::UninstallPackages(change(args)))
                .await?;
            util::report("Package removal started", &result, global);
            Ok(())
        }
    }
}

fn print_packages(packages: &[Package], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        global.output,
        packages,
        |p| PackageRow::from(p),
        |p| p.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
