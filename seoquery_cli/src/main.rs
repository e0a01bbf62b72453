mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "seoquery")]
#[command(about = "Filter, page and export SEO keyword and backlink reports")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keyword ideas for one or more seed keywords
    Keywords(Box<commands::keywords::KeywordsArgs>),
    /// Keywords a domain or page ranks for
    Ranked(Box<commands::ranked::RankedArgs>),
    /// Keywords one domain ranks for compared to another
    Gap(Box<commands::gap::GapArgs>),
    /// Backlinks pointing at a domain or page
    Backlinks(Box<commands::backlinks::BacklinksArgs>),
    /// Saved report snapshots
    History(commands::history::HistoryArgs),
    /// Saved keyword lists
    Lists(commands::lists::ListsArgs),
    /// Run the billing webhook endpoint
    ServeWebhooks(commands::serve_webhooks::ServeWebhooksArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("seoquery=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format: OutputFormat = cli.output.parse()?;

    match &cli.command {
        Commands::Keywords(args) => commands::keywords::run(args.as_ref(), format).await?,
        Commands::Ranked(args) => commands::ranked::run(args.as_ref(), format).await?,
        Commands::Gap(args) => commands::gap::run(args.as_ref(), format).await?,
        Commands::Backlinks(args) => commands::backlinks::run(args.as_ref(), format).await?,
        Commands::History(args) => commands::history::run(args, format)?,
        Commands::Lists(args) => commands::lists::run(args, format)?,
        Commands::ServeWebhooks(args) => commands::serve_webhooks::run(args).await?,
    }

    Ok(())
}
