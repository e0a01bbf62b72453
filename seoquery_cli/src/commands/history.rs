use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use seoquery_lib::{config, BacklinkRow, GapRow, KeywordRow, RankedKeywordRow, Report, ViewRow};

use super::open_db;
use crate::output::{print_rows, print_snapshots, OutputFormat};

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List saved snapshots, newest first
    List,
    /// Print the rows of a saved snapshot
    Show {
        /// Snapshot ID
        id: i64,
    },
    /// Delete a saved snapshot
    Delete {
        /// Snapshot ID
        id: i64,
    },
}

pub fn run(args: &HistoryArgs, format: OutputFormat) -> Result<()> {
    let db = open_db()?;
    let user = config::user_id();

    match &args.command {
        HistoryCommand::List => {
            let snapshots = db.list_snapshots(&user)?;
            print_snapshots(&snapshots, format)?;
        }
        HistoryCommand::Show { id } => {
            let snapshot = db
                .get_snapshot(&user, *id)?
                .ok_or_else(|| anyhow!("Snapshot {} not found", id))?;
            let report: Report = snapshot.report.parse()?;
            eprintln!(
                "{} for {} saved {}",
                report, snapshot.target, snapshot.created_at
            );
            for line in snapshot.filters.describe() {
                eprintln!("  filter: {}", line);
            }
            let rows = snapshot.rows;
            match report {
                Report::KeywordIdeas => show_rows::<KeywordRow>(rows, snapshot.total_count, format)?,
                Report::RankedKeywords => {
                    show_rows::<RankedKeywordRow>(rows, snapshot.total_count, format)?
                }
                Report::KeywordGap => show_rows::<GapRow>(rows, snapshot.total_count, format)?,
                Report::Backlinks => show_rows::<BacklinkRow>(rows, snapshot.total_count, format)?,
            }
        }
        HistoryCommand::Delete { id } => {
            db.delete_snapshot(&user, *id)?;
            eprintln!("Deleted snapshot {}", id);
        }
    }
    Ok(())
}

fn show_rows<R>(rows: serde_json::Value, total_count: i64, format: OutputFormat) -> Result<()>
where
    R: ViewRow + Serialize + DeserializeOwned,
{
    let rows: Vec<R> = serde_json::from_value(rows)?;
    eprintln!("{} saved rows of {} results", rows.len(), total_count);
    print_rows(&rows, format)
}
