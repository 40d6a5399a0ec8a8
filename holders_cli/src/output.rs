use std::io::Write;

use anyhow::Result;
use holders_lib::Table;
use serde_json::{Map, Value as JsonValue};
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "md" | "markdown" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

// -- Row builders --

fn build_records(table: &Table) -> Vec<Vec<String>> {
    let mut records = Vec::with_capacity(table.len() + 1);
    records.push(table.columns().to_vec());
    for row in table.rows() {
        records.push(row.iter().map(ToString::to_string).collect());
    }
    records
}

fn build_grid(table: &Table) -> tabled::Table {
    let mut builder = Builder::default();
    for record in build_records(table) {
        builder.push_record(record);
    }
    builder.build()
}

// -- Renderers --

pub fn render_table(table: &Table) -> String {
    build_grid(table).to_string()
}

pub fn render_markdown(table: &Table) -> String {
    let mut grid = build_grid(table);
    grid.with(Style::markdown());
    grid.to_string()
}

pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in build_records(table) {
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Named datasets as one JSON object; absent datasets are `null`.
fn datasets_to_json(datasets: &[(&str, Option<&Table>)]) -> Result<JsonValue> {
    let mut map = Map::new();
    for (name, table) in datasets {
        map.insert(name.to_string(), serde_json::to_value(table)?);
    }
    Ok(JsonValue::Object(map))
}

// -- Dispatch --

fn print_one(table: &Table, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_table(table)),
        OutputFormat::Markdown => println!("{}", render_markdown(table)),
        OutputFormat::Csv => write_csv(table, std::io::stdout())?,
        OutputFormat::Json => print_json(table),
    }
    Ok(())
}

/// Prints each named dataset. With several datasets, titles go to stderr
/// (or become keys of one JSON object) so stdout stays machine-readable.
pub fn print_datasets(datasets: &[(&str, Option<&Table>)], format: &OutputFormat) -> Result<()> {
    if matches!(format, OutputFormat::Json) && datasets.len() > 1 {
        print_json(&datasets_to_json(datasets)?);
        return Ok(());
    }

    for (name, table) in datasets {
        if datasets.len() > 1 {
            eprintln!("{}", name);
        }
        match table {
            Some(table) => print_one(table, format)?,
            None => eprintln!("No data for {}", name),
        }
    }
    Ok(())
}
