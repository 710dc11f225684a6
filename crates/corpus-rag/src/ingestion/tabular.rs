//! Row-oriented tabular loading
//!
//! Retrieval runs over prose, so numeric tables are translated into
//! natural-language statements at three granularities per sheet: one sheet
//! summary, one description per year row, and one rollup per decade. A query
//! like "inflation in the 1950s" then has a directly matching unit, as does
//! "CPI in 1987".

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Data, Reader};

use crate::error::{Error, Result};
use crate::types::{Locator, RawUnit, RowRef};

use super::pdf::file_name;

/// Valid year range for data rows; anything outside is treated as header
/// residue and skipped
const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A sheet's raw cell grid as display strings
type Grid = Vec<Vec<String>>;

/// Loads a spreadsheet (or CSV) of year-indexed numeric tables
pub struct TabularLoader;

impl TabularLoader {
    /// Extract summary, per-year and per-decade units for every sheet.
    ///
    /// Unparseable years, non-numeric cells and missing columns are
    /// tolerated per row; a failure to read the workbook itself is fatal for
    /// this document and propagates.
    pub fn load(path: &Path, min_chars: usize) -> Result<Vec<RawUnit>> {
        let source = file_name(path);
        tracing::info!(%source, "loading tabular data");

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let sheets = if extension == "csv" {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.clone());
            vec![(name, read_csv_grid(path, &source)?)]
        } else {
            read_workbook_grids(path, &source)?
        };
        tracing::info!(%source, sheets = sheets.len(), "sheets found");

        let mut units = Vec::new();
        for (sheet, grid) in &sheets {
            let sheet_units = sheet_units(sheet, grid, &source, min_chars);
            tracing::debug!(%source, %sheet, units = sheet_units.len(), "processed sheet");
            units.extend(sheet_units);
        }
        Ok(units)
    }
}

fn read_workbook_grids(path: &Path, source: &str) -> Result<Vec<(String, Grid)>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| Error::file_parse(source, format!("failed to open workbook: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            Error::file_parse(source, format!("failed to read sheet '{name}': {e}"))
        })?;
        let grid = range
            .rows()
            .map(|row| row.iter().map(format_cell).collect())
            .collect();
        sheets.push((name, grid));
    }
    Ok(sheets)
}

fn read_csv_grid(path: &Path, source: &str) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::file_parse(source, format!("failed to open CSV: {e}")))?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| Error::file_parse(source, format!("failed to read CSV row: {e}")))?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(grid)
}

fn format_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        _ => String::new(),
    }
}

/// Years arrive as floats from spreadsheet engines; render whole numbers
/// without the trailing fraction
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Locate the cell exactly equal to "Year" (row-major scan, first match)
fn find_year_header(grid: &Grid) -> Option<(usize, usize)> {
    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.trim() == "Year" {
                return Some((r, c));
            }
        }
    }
    None
}

fn parse_year(cell: &str) -> Option<i32> {
    let value: f64 = cell.trim().parse().ok()?;
    let year = value as i32;
    (YEAR_MIN..=YEAR_MAX).contains(&year).then_some(year)
}

/// Generate the per-sheet unit sequence: summary, year rows, then decades
fn sheet_units(sheet: &str, grid: &Grid, source: &str, min_chars: usize) -> Vec<RawUnit> {
    // The data region is everything below-and-right of the "Year" header
    // cell; without one, the sheet's first row is taken as the header.
    let (header, data_rows): (Vec<String>, Vec<(usize, &[String])>) = match find_year_header(grid) {
        Some((r, c)) => (
            grid[r].get(c..).unwrap_or(&[]).to_vec(),
            grid[r + 1..]
                .iter()
                .enumerate()
                .map(|(i, row)| (r + 1 + i, row.get(c..).unwrap_or(&[])))
                .collect(),
        ),
        None => {
            if grid.is_empty() {
                return Vec::new();
            }
            (
                grid[0].clone(),
                grid[1..]
                    .iter()
                    .enumerate()
                    .map(|(i, row)| (1 + i, row.as_slice()))
                    .collect(),
            )
        }
    };

    let month_columns: Vec<Option<usize>> = MONTHS
        .iter()
        .map(|month| {
            header
                .iter()
                .position(|col| col.trim().eq_ignore_ascii_case(month))
        })
        .collect();
    let average_column = header.iter().position(|col| {
        let name = col.trim().to_lowercase();
        name.contains("average") || name.contains("avg")
    });

    let mut units = Vec::new();

    // Sheet summary with year range and available columns.
    let valid_years: Vec<i32> = data_rows
        .iter()
        .filter_map(|(_, row)| row.first().and_then(|cell| parse_year(cell)))
        .collect();
    let (start_year, end_year) = match (valid_years.first(), valid_years.last()) {
        (Some(first), Some(last)) => (first.to_string(), last.to_string()),
        _ => ("unknown".to_string(), "unknown".to_string()),
    };
    let columns: Vec<&str> = header
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect();
    let summary = format!(
        "Sheet: {sheet}\n\
         This is an inflation calculator with historical CPI data from {start_year} to {end_year}.\n\
         Available data columns: {}.\n\
         This data can be used to calculate inflation-adjusted values between any two years.",
        columns.join(", ")
    );
    units.push(RawUnit::new(
        summary,
        source,
        Locator::Row {
            sheet: sheet.to_string(),
            row: RowRef::Summary,
            year: None,
            decade: None,
        },
    ));

    // Pass 1: one descriptive unit per valid year row, recording
    // (year, average) pairs for the decade rollups.
    let mut decade_pairs: Vec<(i32, String)> = Vec::new(); // (year, average)
    for (grid_row, row) in &data_rows {
        let Some(year) = row.first().and_then(|cell| parse_year(cell)) else {
            continue;
        };

        let mut description = format!("Inflation data for year {year}:\n");

        let monthly: Vec<String> = MONTHS
            .iter()
            .zip(&month_columns)
            .filter_map(|(month, column)| {
                let value = column.and_then(|c| row.get(c))?;
                (!value.is_empty()).then(|| format!("{month}: {value}"))
            })
            .collect();
        if !monthly.is_empty() {
            description.push_str(&format!("Monthly CPI values: {}\n", monthly.join(", ")));
        }

        if let Some(average) = average_column
            .and_then(|c| row.get(c))
            .filter(|v| !v.is_empty())
        {
            description.push_str(&format!("Average annual CPI for {year}: {average}\n"));
            decade_pairs.push((year, average.clone()));
        }

        description.push_str(&format!(
            "Year {year} inflation data can be used to calculate inflation-adjusted values.\n\
             To adjust a value from {year} to another year, use the CPI ratio between those years."
        ));

        units.push(RawUnit::new(
            description,
            source,
            Locator::Row {
                sheet: sheet.to_string(),
                row: RowRef::Line(*grid_row as u32 + 1),
                year: Some(year),
                decade: None,
            },
        ));
    }

    // Pass 2: group the recorded pairs by decade and emit one rollup per
    // decade, years sorted ascending.
    let mut decades: BTreeMap<i32, Vec<(i32, String)>> = BTreeMap::new();
    for (year, average) in decade_pairs {
        decades.entry((year / 10) * 10).or_default().push((year, average));
    }
    for (decade, mut entries) in decades {
        entries.sort();
        let first = entries.first().map(|(y, _)| *y).unwrap_or(decade);
        let last = entries.last().map(|(y, _)| *y).unwrap_or(decade);
        let mut rollup = format!(
            "Inflation data summary for the {decade}s:\n\
             Years covered: {first} to {last}\n\
             Year-by-year average CPI:\n"
        );
        for (year, average) in &entries {
            rollup.push_str(&format!("  {year}: {average}\n"));
        }
        units.push(RawUnit::new(
            rollup.trim_end(),
            source,
            Locator::Row {
                sheet: sheet.to_string(),
                row: RowRef::Decade(decade),
                year: None,
                decade: Some(decade),
            },
        ));
    }

    units.retain(|unit| unit.text.trim().chars().count() >= min_chars);
    units
}
