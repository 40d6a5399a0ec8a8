//! HTML table tokenizer: every `<table>` on a page, in document order.

use scraper::{ElementRef, Html, Selector};

use crate::error::HoldersError;
use crate::table::{Table, Value};

/// Extracts every table in `html`, in document order.
///
/// The header comes from `<thead>` or, failing that, a leading row made only
/// of `<th>` cells; headerless tables get positional column names. Empty
/// cells are missing, and columns whose cells are all numeric become floats.
pub fn parse_tables(html: &str) -> Result<Vec<Table>, HoldersError> {
    let doc = Html::parse_document(html);
    let sel_table = selector("table")?;
    let sel_tr = selector("tr")?;

    let mut tables = Vec::new();
    for table in doc.select(&sel_table) {
        let rows: Vec<ElementRef> = table
            .select(&sel_tr)
            .filter(|tr| owned_by(table, *tr))
            .collect();

        let header_row = rows
            .iter()
            .find(|tr| in_thead(**tr))
            .or_else(|| rows.first().filter(|tr| is_header_row(**tr)))
            .copied();

        let mut body: Vec<Vec<Value>> = Vec::new();
        for tr in &rows {
            if in_thead(*tr) || header_row.map(|h| h.id()) == Some(tr.id()) {
                continue;
            }
            let cells = row_cells(*tr);
            if !cells.is_empty() {
                body.push(cells.into_iter().map(text_value).collect());
            }
        }

        let width = body.iter().map(Vec::len).max().unwrap_or(0);
        let mut columns = header_row.map(row_cells).unwrap_or_default();
        for idx in columns.len()..width {
            columns.push(idx.to_string());
        }
        for (idx, name) in columns.iter_mut().enumerate() {
            if name.is_empty() {
                *name = idx.to_string();
            }
        }

        let mut parsed = Table::new(columns);
        for row in body {
            parsed.push_row(row);
        }
        infer_numeric_columns(&mut parsed);
        tables.push(parsed);
    }

    Ok(tables)
}

fn selector(css: &str) -> Result<Selector, HoldersError> {
    Selector::parse(css).map_err(|e| HoldersError::Parse(format!("selector {}: {}", css, e)))
}

/// True when `tr` belongs to `table` itself rather than a table nested inside it.
fn owned_by(table: ElementRef<'_>, tr: ElementRef<'_>) -> bool {
    tr.ancestors()
        .find(|n| n.value().as_element().map(|e| e.name()) == Some("table"))
        .map(|n| n.id())
        == Some(table.id())
}

fn in_thead(tr: ElementRef<'_>) -> bool {
    tr.parent()
        .and_then(|p| p.value().as_element().map(|e| e.name() == "thead"))
        .unwrap_or(false)
}

fn is_header_row(tr: ElementRef<'_>) -> bool {
    let mut cells = cell_elements(tr).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

fn cell_elements(tr: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
}

/// Largest `colspan` honored; HTML caps the attribute at 1000.
const MAX_COLSPAN: usize = 1000;

/// Cell texts of one row, with `colspan` cells repeated.
fn row_cells(tr: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    for cell in cell_elements(tr) {
        let text = norm_text(&cell.text().collect::<String>());
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .map_or(1, |n| n.min(MAX_COLSPAN));
        for _ in 0..span {
            out.push(text.clone());
        }
    }
    out
}

fn text_value(text: String) -> Value {
    if text.is_empty() {
        Value::Missing
    } else {
        Value::Text(text)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn infer_numeric_columns(table: &mut Table) {
    for idx in 0..table.columns().len() {
        let mut any = false;
        let numeric = table.rows().iter().all(|row| match &row[idx] {
            Value::Text(s) => {
                any = true;
                parse_number(s).is_some()
            }
            _ => true,
        });
        if numeric && any {
            table.map_column_at(idx, |cell| match cell {
                Value::Text(s) => parse_number(s).map_or(Value::Missing, Value::Float),
                other => other.clone(),
            });
        }
    }
}

/// Collapse whitespace & trim
fn norm_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
