use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};
use seoquery_lib::{config, validation, Db, KeywordList, KeywordRow, Report};

use super::open_db;
use crate::output::{print_keyword_lists, print_rows, OutputFormat};

#[derive(Args)]
pub struct ListsArgs {
    #[command(subcommand)]
    pub command: ListsCommand,
}

#[derive(Subcommand)]
pub enum ListsCommand {
    /// Create an empty keyword list
    Create {
        name: String,
    },
    /// Print the keywords of a list
    Show {
        name: String,
    },
    /// Add keywords to a list
    Add {
        name: String,

        /// Keywords to add
        keywords: Vec<String>,

        /// Also add every row of a saved keyword-ideas snapshot, with metrics
        #[arg(long)]
        snapshot: Option<i64>,
    },
    /// Remove one keyword from a list
    Remove {
        name: String,
        keyword: String,
    },
    /// Delete a list and its keywords
    Delete {
        name: String,
    },
    /// Show all lists
    All,
}

pub fn run(args: &ListsArgs, format: OutputFormat) -> Result<()> {
    let db = open_db()?;
    let user = config::user_id();

    match &args.command {
        ListsCommand::Create { name } => {
            let name = validation::validate_list_name(name)?;
            db.create_keyword_list(&user, &name)?;
            eprintln!("Created list '{}'", name);
        }
        ListsCommand::Show { name } => {
            let list = find_list(&db, &user, name)?;
            let rows = db.list_keywords(list.id)?;
            eprintln!("{} ({} keywords)", list.name, list.item_count);
            print_rows(&rows, format)?;
        }
        ListsCommand::Add {
            name,
            keywords,
            snapshot,
        } => {
            let list = find_list(&db, &user, name)?;
            let mut rows: Vec<KeywordRow> = Vec::new();
            if let Some(id) = snapshot {
                rows.extend(snapshot_keywords(&db, &user, *id)?);
            }
            for keyword in keywords {
                let keyword = validation::validate_keyword(keyword)?;
                rows.push(KeywordRow {
                    keyword,
                    search_volume: None,
                    cpc: None,
                    competition: None,
                    difficulty: None,
                    intent: None,
                });
            }
            if rows.is_empty() {
                bail!("Nothing to add: pass keywords or --snapshot");
            }
            let written = db.add_keywords(list.id, &rows)?;
            eprintln!("Added {} keyword(s) to '{}'", written, list.name);
        }
        ListsCommand::Remove { name, keyword } => {
            let list = find_list(&db, &user, name)?;
            let keyword = validation::validate_keyword(keyword)?;
            db.remove_keyword(list.id, &keyword)?;
            eprintln!("Removed '{}' from '{}'", keyword, list.name);
        }
        ListsCommand::Delete { name } => {
            db.delete_keyword_list(&user, name)?;
            eprintln!("Deleted list '{}'", name);
        }
        ListsCommand::All => {
            let lists = db.keyword_lists(&user)?;
            print_keyword_lists(&lists, format)?;
        }
    }
    Ok(())
}

fn find_list(db: &Db, user: &str, name: &str) -> Result<KeywordList> {
    db.find_keyword_list(user, name)?
        .ok_or_else(|| anyhow!("No keyword list named '{}'", name))
}

fn snapshot_keywords(db: &Db, user: &str, id: i64) -> Result<Vec<KeywordRow>> {
    let snapshot = db
        .get_snapshot(user, id)?
        .ok_or_else(|| anyhow!("Snapshot {} not found", id))?;
    let report: Report = snapshot.report.parse()?;
    if report != Report::KeywordIdeas {
        bail!(
            "Snapshot {} is a {} report; only keyword-ideas snapshots can be added",
            id,
            report
        );
    }
    Ok(serde_json::from_value(snapshot.rows)?)
}
