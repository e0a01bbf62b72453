use anyhow::Result;
use clap::Args;
use seoquery_lib::{validation, Report};

use super::{build_executor, finish, FilterArgs, LocaleArgs, PageArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct GapArgs {
    /// Domain whose keywords are listed (e.g. a competitor)
    pub first: String,

    /// Domain to compare against (e.g. your own site)
    pub second: String,

    /// Show keywords the first domain ranks for and the second does not,
    /// instead of the keywords both rank for
    #[arg(long)]
    pub missing: bool,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub locale: LocaleArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

pub async fn run(args: &GapArgs, format: OutputFormat) -> Result<()> {
    let first = validation::normalize_target(&args.first)?;
    let second = validation::normalize_target(&args.second)?;
    let request = args.page.request(args.filters.to_state()?)?;
    let executor = build_executor(args.locale.locale()?)?;
    let fetched = executor
        .keyword_gap(&first, &second, !args.missing, &request)
        .await?;
    let target = format!("{} vs {}", first, second);
    finish(Report::KeywordGap, &target, &request, &fetched, &args.page, format)
}
