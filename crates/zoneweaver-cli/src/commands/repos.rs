//! Package repository (publisher) command handlers.

use tabled::Tabled;
use zoneweaver_core::{Command as CoreCommand, Host, Repository, RepositorySpec};

use crate::cli::{GlobalOpts, RepoOptions, ReposArgs, ReposCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Sticky")]
    sticky: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Repository> for RepoRow {
    fn from(r: &Repository) -> Self {
        Self {
            name: r.name.clone(),
            origin: r.origins.first().cloned().unwrap_or_else(|| "-".into()),
            enabled: if r.enabled { "yes" } else { "no" }.into(),
            sticky: if r.sticky { "yes" } else { "no" }.into(),
            status: util::or_dash(r.status.as_deref()),
        }
    }
}

fn spec(name: Option<String>, origin: Option<String>, options: RepoOptions) -> RepositorySpec {
    RepositorySpec {
        name,
        origin,
        mirrors: options.mirrors,
        enabled: options.enabled,
        sticky: options.sticky,
        search_first: options.search_first.then_some(true),
        search_before: options.search_before,
        search_after: options.search_after,
        proxy: options.proxy,
        ..RepositorySpec::default()
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(host: &Host, args: ReposArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ReposCommand::List => {
            let repos = host.repositories().await?;
            let out = output::render_list(
                global.output,
                &repos,
                |r| RepoRow::from(r),
                |r| r.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReposCommand::Add {
            name,
            origin,
            options,
        } => {
            let result = host
                .execute(CoreCommand::AddRepository(spec(
                    Some(name.clone()),
                    Some(origin),
                    options,
                )))
                .await?;
            util::report(&format!("Publisher '{name}' added"), &result, global);
            Ok(())
        }

        ReposCommand::Update {
            name,
            origin,
            options,
        } => {
            let result = host
                .execute(CoreCommand::UpdateRepository {
                    name: name.clone(),
                    update: spec(None, origin, options),
                })
                .await
                .map_err(|e| util::not_found_as(e, "repository", &name, "repos list"))?;
            util::report(&format!("Publisher '{name}' updated"), &result, global);
            Ok(())
        }

        ReposCommand::Remove { name } => {
            if !util::confirm(&format!("Remove publisher '{name}'?"), global)? {
                return Ok(());
            }
            let result = host
                .execute(CoreCommand::RemoveRepository { name: name.clone() })
                .await
                .map_err(|e| util::not_found_as(e, "repository", &name, "repos list"))?;
            util::report(&format!("Publisher '{name}' removed"), &result, global);
            Ok(())
        }
    }
}
