use anyhow::Result;
use clap::Args;
use seoquery_lib::Report;

use super::{build_executor, finish, FilterArgs, LocaleArgs, PageArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct KeywordsArgs {
    /// Seed keywords (up to 200)
    #[arg(required = true)]
    pub seeds: Vec<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub locale: LocaleArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

pub async fn run(args: &KeywordsArgs, format: OutputFormat) -> Result<()> {
    let request = args.page.request(args.filters.to_state()?)?;
    let executor = build_executor(args.locale.locale()?)?;
    let fetched = executor.keyword_ideas(&args.seeds, &request).await?;
    finish(
        Report::KeywordIdeas,
        &args.seeds.join(", "),
        &request,
        &fetched,
        &args.page,
        format,
    )
}
