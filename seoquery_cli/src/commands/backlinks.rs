use anyhow::{anyhow, Result};
use clap::Args;
use seoquery_lib::{validation, BacklinkMode, Locale, Report};

use super::{build_executor, finish, FilterArgs, PageArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct BacklinksArgs {
    /// Domain or page URL the links point to
    pub target: String,

    /// Grouping: as-is, one-per-domain, one-per-anchor
    #[arg(long, default_value = "as-is")]
    pub mode: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

pub async fn run(args: &BacklinksArgs, format: OutputFormat) -> Result<()> {
    let mode: BacklinkMode = args.mode.parse().map_err(|_| {
        anyhow!(
            "Invalid mode '{}'. Use as-is, one-per-domain or one-per-anchor",
            args.mode
        )
    })?;
    let target = validation::normalize_target(&args.target)?;
    let request = args.page.request(args.filters.to_state()?)?;
    let executor = build_executor(Locale::default())?;
    let fetched = executor.backlinks(&target, mode, &request).await?;
    finish(Report::Backlinks, &target, &request, &fetched, &args.page, format)
}
