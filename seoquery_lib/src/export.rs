//! CSV export shared by every report.
//!
//! All exports go through [`csv_writer`], a `csv::Writer` with RFC 4180
//! quoting: fields containing a comma, a double quote, or a
//! line break are wrapped in quotes and inner quotes are doubled.

use std::io::Write;

use chrono::NaiveDate;

use crate::error::SeoQueryError;
use crate::rows::ViewRow;
use crate::schema::Report;

pub type CsvWriter<W> = csv::Writer<W>;

/// The one CSV writer configuration every export goes through.
pub fn csv_writer<W: Write>(out: W) -> CsvWriter<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out)
}

/// Write a header line followed by one record per row.
pub fn write_csv<R: ViewRow, W: Write>(rows: &[R], out: W) -> Result<(), SeoQueryError> {
    let mut wtr = csv_writer(out);
    wtr.write_record(R::headers())?;
    for row in rows {
        wtr.write_record(row.cells())?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Encode rows into an in-memory CSV document.
pub fn to_csv_string<R: ViewRow>(rows: &[R]) -> Result<String, SeoQueryError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| SeoQueryError::InvalidInput(format!("CSV output is not UTF-8: {}", e)))
}

/// Download name for an export: `<report>_<target>_<date>.csv`, with any
/// character outside `[A-Za-z0-9.-]` in the target replaced by `_`.
pub fn csv_file_name(report: Report, target: &str, date: NaiveDate) -> String {
    let safe: String = target
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_{}_{}.csv", report.as_str(), safe, date.format("%Y-%m-%d"))
}
