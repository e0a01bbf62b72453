use anyhow::Result;
use clap::Args;
use seoquery_lib::{validation, Report};

use super::{build_executor, finish, FilterArgs, LocaleArgs, PageArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RankedArgs {
    /// Domain to analyse (scheme and www. are ignored)
    pub target: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub locale: LocaleArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

pub async fn run(args: &RankedArgs, format: OutputFormat) -> Result<()> {
    let target = validation::normalize_target(&args.target)?;
    let request = args.page.request(args.filters.to_state()?)?;
    let executor = build_executor(args.locale.locale()?)?;
    let fetched = executor.ranked_keywords(&target, &request).await?;
    finish(Report::RankedKeywords, &target, &request, &fetched, &args.page, format)
}
