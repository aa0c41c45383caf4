use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use super::error::DataError;
use super::model::{IntegralTable, Quantity};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the integral file of `quantity` from the run's data directory and
/// check that it carries every column the diagnostic needs.
pub fn load_quantity(data_dir: &Path, quantity: Quantity) -> Result<IntegralTable> {
    let path = data_dir.join(quantity.file_name());
    let table = load_table(&path)?;

    if table.width() < quantity.min_columns() {
        return Err(DataError::TooFewColumns {
            expected: quantity.min_columns(),
            found: table.width(),
        })
        .with_context(|| format!("checking {}", path.display()));
    }

    log::info!(
        "Loaded {} samples x {} columns from {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// Read a whitespace-delimited numeric table from disk.
pub fn load_table(path: &Path) -> Result<IntegralTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_table(file).with_context(|| format!("parsing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Table layout: one sample per line, fields separated by tabs (as the model
/// writes them) or runs of spaces. Empty lines are skipped, and a `#` starts
/// a comment that runs to the end of the line, wherever it sits.
pub fn parse_table<R: Read>(reader: R) -> Result<IntegralTable> {
    // `"` is plain data; every line is one record.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width = 0;

    for result in reader.records() {
        let record = result.context("reading table record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row = record
            .iter()
            .flat_map(str::split_whitespace)
            .take_while(|tok| !tok.starts_with('#'))
            .enumerate()
            .map(|(column, tok)| {
                tok.parse::<f64>().map_err(|_| DataError::NotANumber {
                    line,
                    column,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, DataError>>()?;

        if row.is_empty() {
            continue;
        }
        if rows.is_empty() {
            width = row.len();
        } else if row.len() != width {
            return Err(DataError::RaggedRow {
                line,
                expected: width,
                found: row.len(),
            }
            .into());
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DataError::Empty.into());
    }
    Ok(IntegralTable::from_rows(rows))
}
