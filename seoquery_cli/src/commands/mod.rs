//! CLI subcommand implementations.

pub mod backlinks;
pub mod gap;
pub mod history;
pub mod keywords;
pub mod lists;
pub mod ranked;
pub mod serve_webhooks;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde::Serialize;
use seoquery_lib::types::SearchIntent;
use seoquery_lib::{export, validation};
use seoquery_lib::{
    config, ApiConfig, Connective, Db, DbError, FetchRequest, Fetched, FilterSession, FilterState,
    Locale, OrderBy, PatternClause, QueryExecutor, Range, Report, SortDirection, ViewRow,
};

use crate::output::{print_page_summary, print_rows, OutputFormat};

/// Filter flags shared by every report. Flags a report does not support
/// are rejected when the query is built.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Minimum monthly search volume
    #[arg(long)]
    pub min_volume: Option<i64>,

    /// Maximum monthly search volume
    #[arg(long)]
    pub max_volume: Option<i64>,

    /// Minimum cost per click
    #[arg(long)]
    pub min_cpc: Option<f64>,

    /// Maximum cost per click
    #[arg(long)]
    pub max_cpc: Option<f64>,

    /// Minimum keyword difficulty (0-100)
    #[arg(long)]
    pub min_difficulty: Option<i64>,

    /// Maximum keyword difficulty (0-100)
    #[arg(long)]
    pub max_difficulty: Option<i64>,

    /// Best SERP position (or page rank for backlinks)
    #[arg(long)]
    pub min_rank: Option<i64>,

    /// Worst SERP position (or page rank for backlinks)
    #[arg(long)]
    pub max_rank: Option<i64>,

    /// Minimum referring domain rank (backlinks)
    #[arg(long)]
    pub min_domain_rank: Option<i64>,

    /// Maximum referring domain rank (backlinks)
    #[arg(long)]
    pub max_domain_rank: Option<i64>,

    /// Search intent: informational, navigational, commercial, transactional
    #[arg(long)]
    pub intent: Option<String>,

    /// Only dofollow (true) or nofollow (false) links
    #[arg(long)]
    pub dofollow: Option<bool>,

    /// Keyword (or anchor) pattern. Repeatable. Prefix with `or:` to join
    /// with the previous pattern by OR, and with `!` to exclude matches.
    #[arg(long = "keyword-like", value_name = "PATTERN")]
    pub keyword_like: Vec<String>,

    /// URL pattern. Same syntax as --keyword-like.
    #[arg(long = "url-like", value_name = "PATTERN")]
    pub url_like: Vec<String>,
}

impl FilterArgs {
    pub fn to_state(&self) -> Result<FilterState> {
        let intent = match &self.intent {
            Some(raw) => Some(raw.parse::<SearchIntent>().map_err(|_| {
                anyhow!(
                    "Invalid intent '{}'. Use informational, navigational, commercial or transactional",
                    raw
                )
            })?),
            None => None,
        };
        Ok(FilterState {
            volume: Range::new(self.min_volume, self.max_volume),
            cpc: Range::new(self.min_cpc, self.max_cpc),
            difficulty: Range::new(self.min_difficulty, self.max_difficulty),
            rank: Range::new(self.min_rank, self.max_rank),
            domain_rank: Range::new(self.min_domain_rank, self.max_domain_rank),
            intent,
            dofollow: self.dofollow,
            keyword_patterns: parse_patterns(&self.keyword_like)?,
            url_patterns: parse_patterns(&self.url_like)?,
        })
    }
}

/// Parses `[and:|or:][!]text`. Text without `%` becomes a contains-match.
pub fn parse_pattern(raw: &str) -> Result<PatternClause> {
    let (connective, rest) = if let Some(rest) = raw.strip_prefix("or:") {
        (Connective::Or, rest)
    } else if let Some(rest) = raw.strip_prefix("and:") {
        (Connective::And, rest)
    } else {
        (Connective::And, raw)
    };
    let (negate, text) = match rest.strip_prefix('!') {
        Some(text) => (true, text),
        None => (false, rest),
    };
    let pattern = validation::validate_pattern(text)?;
    let clause = if negate {
        PatternClause::excludes(&pattern)
    } else {
        PatternClause::contains(&pattern)
    };
    Ok(clause.joined_by(connective))
}

fn parse_patterns(raw: &[String]) -> Result<Vec<PatternClause>> {
    raw.iter().map(|r| parse_pattern(r)).collect()
}

/// Paging, sorting and persistence flags shared by every report.
#[derive(Args, Debug)]
pub struct PageArgs {
    /// Page number (100 results per page)
    #[arg(long, default_value = "1")]
    pub page: i64,

    /// Sort column, optionally with direction: volume, cpc, difficulty,
    /// position, traffic, keyword, rank, domain-rank, first-seen (e.g. cpc,asc)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,

    /// Save the fetched page to local history
    #[arg(long)]
    pub save: bool,

    /// Also write the page as CSV into this directory
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

impl PageArgs {
    pub fn sort_rule(&self) -> Result<Option<OrderBy>> {
        let mut rule = match &self.sort {
            Some(raw) => raw
                .parse::<OrderBy>()
                .map_err(|_| anyhow!("Invalid sort '{}'. Expected column or column,asc|desc", raw))?,
            None if self.asc => bail!("--asc needs --sort"),
            None => return Ok(None),
        };
        if self.asc {
            rule.direction = SortDirection::Asc;
        }
        Ok(Some(rule))
    }

    /// Applies filters through a session and moves to the requested page and
    /// sort, yielding the request for the final state.
    pub fn request(&self, filters: FilterState) -> Result<FetchRequest> {
        let page = validation::validate_page(self.page)?;
        let mut session = FilterSession::default();
        session.edit(|pending| *pending = filters);
        let mut request = session.apply()?;
        if let Some(sort) = self.sort_rule()? {
            request = session.set_sort(sort);
        }
        if page > 1 {
            request = session.set_page(page);
        }
        Ok(request)
    }
}

/// Location and language flags for keyword reports.
#[derive(Args, Debug)]
pub struct LocaleArgs {
    /// Location code (2840 = United States, 2826 = United Kingdom)
    #[arg(long, default_value = "2840")]
    pub location: i64,

    /// Language code (e.g. en, de, pt-br)
    #[arg(long, default_value = "en")]
    pub language: String,
}

impl LocaleArgs {
    pub fn locale(&self) -> Result<Locale> {
        Ok(Locale::parse(self.location, &self.language)?)
    }
}

pub fn build_executor(locale: Locale) -> Result<QueryExecutor> {
    let config = ApiConfig::from_env()?;
    Ok(QueryExecutor::new(config.build_client()?, locale))
}

pub fn open_db() -> Result<Db, DbError> {
    let db = Db::open(config::db_path())?;
    db.init()?;
    Ok(db)
}

/// Prints a fetched page, then exports and saves it when asked. A failed
/// save is logged and does not fail the command.
pub fn finish<R: ViewRow + Serialize>(
    report: Report,
    target: &str,
    request: &FetchRequest,
    fetched: &Fetched<R>,
    page: &PageArgs,
    format: OutputFormat,
) -> Result<()> {
    print_page_summary(&fetched.pagination());
    for line in request.filters.describe() {
        eprintln!("  filter: {}", line);
    }
    print_rows(&fetched.rows, format)?;

    if let Some(dir) = &page.export {
        let path = export_csv(dir, report, target, &fetched.rows)?;
        eprintln!("Exported {} rows to {}", fetched.rows.len(), path.display());
    }

    if page.save {
        let saved = open_db().and_then(|db| {
            db.save_snapshot(
                &config::user_id(),
                report,
                target,
                &request.filters,
                &fetched.rows,
                fetched.total_count,
            )
        });
        match saved {
            Ok(id) => eprintln!("Saved as snapshot {}", id),
            Err(e) => tracing::warn!("Could not save snapshot: {}", e),
        }
    }
    Ok(())
}

/// Writes rows to `<dir>/<report>_<target>_<date>.csv`.
pub fn export_csv<R: ViewRow>(
    dir: &Path,
    report: Report,
    target: &str,
    rows: &[R],
) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    let path = dir.join(export::csv_file_name(report, target, today));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("could not create {}", path.display()))?;
    export::write_csv(rows, std::io::BufWriter::new(file))?;
    Ok(path)
}
