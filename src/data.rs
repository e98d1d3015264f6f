use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::StringRecord;
use duckdb::Connection;
use log::{debug, info};

use crate::warehouse::store::ingest_db;
use crate::warehouse::table::{is_na, Table};
use crate::warehouse::{DataError, WarehouseError};

#[derive(Debug, PartialEq)]
pub struct LoadedTable {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub tables: Vec<LoadedTable>,
    pub elapsed_minutes: f64,
}

/// Blank headers become `Unnamed: <index>`, repeated headers get a `.<n>` suffix.
/// Names are compared case-insensitively since the database folds identifier case.
fn column_names(headers: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 0;
        while names.iter().any(|taken| taken.eq_ignore_ascii_case(&name)) {
            suffix += 1;
            name = format!("{}.{}", base, suffix);
        }
        names.push(name);
    }

    names
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Table, WarehouseError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = column_names(csv_reader.headers()?);
    let width = headers.len();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() > width {
            return Err(DataError::TooManyFields {
                line: record.position().map(|pos| pos.line()).unwrap_or_default(),
                expected: width,
                found: record.len(),
            }
            .into());
        }

        // Short records are padded with nulls.
        let mut cells: Vec<Option<String>> = record
            .iter()
            .map(|cell| if is_na(cell) { None } else { Some(cell.to_string()) })
            .collect();
        cells.resize(width, None);
        records.push(cells);
    }

    Ok(Table::from_records(headers, &records)?)
}

pub fn read_csv(path: &Path) -> Result<Table, WarehouseError> {
    let file = File::open(path)?;
    parse_csv(file)
}

fn is_csv(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("csv")
}

/// Loads every `.csv` file of `data_dir` into a table named after the file, replacing
/// whatever the table held before. Files are visited in name order.
pub fn load_raw_data(data_dir: &Path, conn: &mut Connection) -> Result<LoadReport, WarehouseError> {
    let start = Instant::now();

    let mut paths = fs::read_dir(data_dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    paths.sort();

    let mut report = LoadReport::default();
    for path in paths.iter().filter(|path| is_csv(path)) {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        let table_name = path.file_stem().unwrap_or_default().to_string_lossy();

        let table = read_csv(path)?;
        let (rows, columns) = table.shape();
        info!("Ingesting {} into DB", file_name);
        println!("{}: ({}, {})", file_name, rows, columns);

        ingest_db(conn, &table_name, &table)?;
        report.tables.push(LoadedTable {
            name: table_name.to_string(),
            rows,
            columns,
        });
    }

    if report.tables.is_empty() {
        debug!("no csv files found in {}", data_dir.display());
    }

    report.elapsed_minutes = start.elapsed().as_secs_f64() / 60.0;
    info!("Ingestion Complete");
    info!("Total Time Taken: {:.2} minutes", report.elapsed_minutes);

    Ok(report)
}
