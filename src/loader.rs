use anyhow::{ensure, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use flate2::read::GzDecoder;
use indicatif::ProgressBar;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::db::{Database, Scalar};
use crate::ident::clean_name;

/// Datetime layouts seen in the snapshot exports, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p", // NYC 311 export style
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Outcome of one snapshot load.
#[derive(Debug)]
pub struct LoadReport {
    /// Final (normalized) table name.
    pub table: String,
    /// Total rows written across all chunks.
    pub rows: u64,
}

/// Stream a CSV file into a table in fixed-size row chunks.
///
/// The header is normalized with [`clean_name`] and the table of that name is
/// replaced wholesale before the first chunk; every chunk then appends inside
/// its own transaction. Columns named in `parse_dates` are rewritten into
/// SQLite-friendly `%Y-%m-%d %H:%M:%S` text. A `.gz` extension switches on
/// gzip decompression. Any read or write error aborts the whole run.
pub fn load_csv(
    db: &mut Database,
    path: &Path,
    table: &str,
    parse_dates: &[&str],
    chunk_size: usize,
) -> Result<LoadReport> {
    ensure!(chunk_size >= 1, "chunk size must be at least 1");
    let table = clean_name(table);
    println!("[load] {} -> table '{}'", path.display(), table);

    let mut reader = csv::ReaderBuilder::new().from_reader(open_source(path)?);
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read CSV header of {}", path.display()))?
        .clone();
    let columns: Vec<String> = headers.iter().map(clean_name).collect();
    let date_cols: Vec<bool> = columns
        .iter()
        .map(|c| parse_dates.iter().any(|d| clean_name(d) == *c))
        .collect();
    debug!("normalized columns: {columns:?}");

    // Replacing up front also materializes a header-only file as an empty
    // table with the normalized column set.
    db.replace_table(&table, &columns)?;

    let pb = ProgressBar::new_spinner();
    let mut total: u64 = 0;
    let mut chunk: Vec<Vec<Scalar>> = Vec::with_capacity(chunk_size);

    for record in reader.records() {
        let record =
            record.with_context(|| format!("malformed CSV record in {}", path.display()))?;
        let mut row = Vec::with_capacity(columns.len());
        for (i, cell) in record.iter().enumerate() {
            row.push(if date_cols[i] {
                parse_date_cell(cell)
            } else {
                sniff_cell(cell)
            });
        }
        chunk.push(row);

        if chunk.len() == chunk_size {
            total += flush_chunk(db, &table, &columns, &mut chunk, total, &pb)?;
        }
    }
    if !chunk.is_empty() {
        total += flush_chunk(db, &table, &columns, &mut chunk, total, &pb)?;
    }
    pb.finish_and_clear();

    Ok(LoadReport { table, rows: total })
}

fn flush_chunk(
    db: &mut Database,
    table: &str,
    columns: &[String],
    chunk: &mut Vec<Vec<Scalar>>,
    written_so_far: u64,
    pb: &ProgressBar,
) -> Result<u64> {
    let n = chunk.len() as u64;
    db.append_rows(table, columns, chunk)?;
    chunk.clear();
    let total = written_so_far + n;
    pb.set_message(format!("{table}: {total} rows"));
    pb.println(format!("  + {n} rows (total {total})"));
    Ok(n)
}

fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open source file {}", path.display()))?;
    // Compression is keyed off the extension, like the snapshot filenames.
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Normalize a date-designated cell. Empty or unparseable cells become NULL.
fn parse_date_cell(raw: &str) -> Scalar {
    let raw = raw.trim();
    if raw.is_empty() {
        return Scalar::Null;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Scalar::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Scalar::Text(format!("{} 00:00:00", d.format("%Y-%m-%d")));
        }
    }
    Scalar::Null
}

/// Convert one CSV cell into a typed scalar. Empty cells become NULL, and
/// numeric-looking cells keep numeric affinity so the templates' aggregates
/// behave the same as on the original load.
fn sniff_cell(raw: &str) -> Scalar {
    if raw.is_empty() {
        return Scalar::Null;
    }
    // Only digit-leading cells are candidates, which keeps text like "nan"
    // and "inf" out of the float parser.
    let numeric_lead = raw
        .strip_prefix(['+', '-'])
        .unwrap_or(raw)
        .starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if numeric_lead {
        if let Ok(i) = raw.parse::<i64>() {
            return Scalar::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Scalar::Real(f);
        }
    }
    Scalar::Text(raw.to_string())
}
