use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;
use seoquery_lib::export;
use seoquery_lib::{KeywordList, Pagination, SnapshotSummary, ViewRow};
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const PAGE_WINDOW: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => bail!("unknown output format '{}'. Use table, json, csv or markdown", other),
        }
    }
}

#[derive(Tabled, Serialize)]
struct SnapshotRow {
    #[tabled(rename = "ID")]
    #[serde(rename = "ID")]
    id: i64,
    #[tabled(rename = "Report")]
    #[serde(rename = "Report")]
    report: String,
    #[tabled(rename = "Target")]
    #[serde(rename = "Target")]
    target: String,
    #[tabled(rename = "Rows")]
    #[serde(rename = "Rows")]
    rows: i64,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: i64,
    #[tabled(rename = "Saved")]
    #[serde(rename = "Saved")]
    saved: String,
}

#[derive(Tabled, Serialize)]
struct ListRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Keywords")]
    #[serde(rename = "Keywords")]
    keywords: i64,
    #[tabled(rename = "Created")]
    #[serde(rename = "Created")]
    created: String,
}

fn build_snapshot_rows(snapshots: &[SnapshotSummary]) -> Vec<SnapshotRow> {
    snapshots
        .iter()
        .map(|s| SnapshotRow {
            id: s.id,
            report: s.report.clone(),
            target: s.target.clone(),
            rows: s.row_count,
            total: s.total_count,
            saved: s.created_at.clone(),
        })
        .collect()
}

fn build_list_rows(lists: &[KeywordList]) -> Vec<ListRow> {
    lists
        .iter()
        .map(|l| ListRow {
            name: l.name.clone(),
            keywords: l.item_count,
            created: l.created_at.clone(),
        })
        .collect()
}

/// Table with the row type's headers and cell strings.
pub fn build_table<R: ViewRow>(rows: &[R]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(R::headers().iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row.cells());
    }
    builder.build()
}

// -- Report rows --

pub fn print_rows<R: ViewRow + Serialize>(rows: &[R], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", build_table(rows)),
        OutputFormat::Markdown => {
            let mut table = build_table(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => export::write_csv(rows, std::io::stdout())?,
    }
    Ok(())
}

/// Page summary on stderr so stdout stays machine-readable.
pub fn print_page_summary(pagination: &Pagination) {
    eprintln!("{}", page_summary(pagination));
}

fn page_summary(pagination: &Pagination) -> String {
    let pages: Vec<String> = pagination
        .window(PAGE_WINDOW)
        .into_iter()
        .map(|p| {
            if p == pagination.page {
                format!("[{}]", p)
            } else {
                p.to_string()
            }
        })
        .collect();
    let mut line = format!(
        "Page {}/{} ({})",
        pagination.page,
        pagination.total_pages().max(1),
        pagination.label()
    );
    if pages.len() > 1 {
        line.push_str(&format!("  pages: {}", pages.join(" ")));
        if pagination.has_next() {
            line.push_str(&format!("  next: --page {}", pagination.page + 1));
        }
    }
    line
}

// -- Saved snapshots and keyword lists --

pub fn print_snapshots(snapshots: &[SnapshotSummary], format: OutputFormat) -> Result<()> {
    let rows = build_snapshot_rows(snapshots);
    print_tabled(&rows, format)
}

pub fn print_keyword_lists(lists: &[KeywordList], format: OutputFormat) -> Result<()> {
    let rows = build_list_rows(lists);
    print_tabled(&rows, format)
}

fn print_tabled<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Csv => {
            let mut wtr = csv_writer();
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

fn csv_writer() -> export::CsvWriter<std::io::Stdout> {
    export::csv_writer(std::io::stdout())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seoquery_lib::{BacklinkRow, KeywordRow};

    fn keyword_rows() -> Vec<KeywordRow> {
        vec![
            KeywordRow {
                keyword: "best running shoes".into(),
                search_volume: Some(74000),
                cpc: Some(1.42),
                competition: Some(1.0),
                difficulty: Some(71),
                intent: Some("commercial".into()),
            },
            KeywordRow {
                keyword: "running shoes, women".into(),
                search_volume: Some(880),
                cpc: None,
                competition: None,
                difficulty: None,
                intent: None,
            },
        ]
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn table_has_headers_and_cells() {
        let table = build_table(&keyword_rows()).to_string();
        assert!(table.contains("Keyword"));
        assert!(table.contains("Difficulty"));
        assert!(table.contains("best running shoes"));
        assert!(table.contains("74000"));
    }

    #[test]
    fn markdown_table_structure() {
        let mut table = build_table(&keyword_rows());
        table.with(Style::markdown());
        let md = table.to_string();

        assert!(md.contains('|'));
        assert!(md.contains("---"));
        let header_line = md.lines().next().unwrap();
        assert!(header_line.contains("Volume"));
        assert!(header_line.contains("Intent"));
        assert_eq!(md.lines().count(), 4);
    }

    #[test]
    fn markdown_empty_produces_headers_only() {
        let rows: Vec<BacklinkRow> = Vec::new();
        let mut table = build_table(&rows);
        table.with(Style::markdown());
        let md = table.to_string();
        let lines: Vec<&str> = md.lines().collect();
        assert!(lines.len() <= 2, "expected at most 2 lines, got {}", lines.len());
        assert!(lines[0].contains("Anchor"));
    }

    #[test]
    fn snapshot_rows_mapping() {
        let rows = build_snapshot_rows(&[SnapshotSummary {
            id: 7,
            report: "backlinks".into(),
            target: "example.com".into(),
            row_count: 100,
            total_count: 315,
            created_at: "2024-08-01T10:00:00Z".into(),
        }]);
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[0].total, 315);
        let table = Table::new(&rows).to_string();
        assert!(table.contains("Saved"));
    }

    #[test]
    fn page_summary_marks_current_page() {
        let line = page_summary(&Pagination::new(2, 450));
        assert!(line.starts_with("Page 2/5 (101-200 of 450)"));
        assert!(line.contains("1 [2] 3 4 5"));
        assert!(line.ends_with("next: --page 3"));

        let single = page_summary(&Pagination::new(1, 40));
        assert_eq!(single, "Page 1/1 (1-40 of 40)");
    }

    #[test]
    fn json_rows_serializable() {
        let json = serde_json::to_value(keyword_rows()).unwrap();
        assert_eq!(json[0]["search_volume"], 74000);
        assert!(json[1]["cpc"].is_null());
    }
}
