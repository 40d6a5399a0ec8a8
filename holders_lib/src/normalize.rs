//! Field normalization for holder and insider tables.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::table::{Table, Value};

/// Marker written into empty cells of the insider transaction tables.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DATE_REPORTED: &str = "Date Reported";
pub const PERCENT_OUT: &str = "% Out";
pub const INSIDER: &str = "Insider";
pub const INDIVIDUAL_OR_ENTITY: &str = "Individual or Entity";
pub const POSITION: &str = "Position";

const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

fn title_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]+\.*-*[A-Z]*$").expect("valid title token regex"))
}

/// Whether a single space-separated token matches the all-caps token pattern.
pub fn is_title_token(token: &str) -> bool {
    title_token_re().is_match(token)
}

/// Splits a combined "NAME TITLE" cell at the first token that fails
/// [`is_title_token`]: the name is everything before it, the title
/// everything from it on. When every token matches, the input comes back
/// whole as the name with no title.
pub fn split_name_title(input: &str) -> (String, Option<String>) {
    let parts: Vec<&str> = input.split(' ').collect();
    for (i, part) in parts.iter().enumerate() {
        if !is_title_token(part) {
            let name = parts[..i].join(" ");
            let title = parts[i..].join(" ");
            return (name.trim().to_string(), Some(title.trim().to_string()));
        }
    }
    (input.to_string(), None)
}

/// "12.5%" becomes 0.125. Numbers already parsed are divided by 100 too.
pub fn parse_percent(value: &Value) -> Value {
    match value {
        Value::Text(s) => match s.replace('%', "").trim().parse::<f64>() {
            Ok(v) => Value::Float(v / 100.0),
            Err(_) => {
                tracing::debug!("unparsable percentage {:?}", s);
                Value::Missing
            }
        },
        Value::Float(v) => Value::Float(v / 100.0),
        Value::Date(_) | Value::Missing => Value::Missing,
    }
}

/// Parses a display date such as "Dec 30, 2023".
pub fn parse_report_date(value: &Value) -> Value {
    match value {
        Value::Text(s) => {
            let s = s.trim();
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map_or_else(
                    || {
                        tracing::debug!("unparsable report date {:?}", s);
                        Value::Missing
                    },
                    Value::Date,
                )
        }
        Value::Date(d) => Value::Date(*d),
        Value::Float(_) | Value::Missing => Value::Missing,
    }
}

/// Types the "Date Reported" and "% Out" columns of an institutional or
/// mutual fund holder table, whichever are present.
pub fn normalize_holder_table(table: &mut Table) {
    table.map_column(DATE_REPORTED, parse_report_date);
    table.map_column(PERCENT_OUT, parse_percent);
}

/// Splits `column` into name and "Position", and moves both to the front.
fn split_column(table: &mut Table, column: &str) {
    let Some(cells) = table.column(column) else {
        return;
    };
    let (names, titles): (Vec<Value>, Vec<Value>) = cells
        .map(|cell| match cell {
            Value::Text(s) => {
                let (name, title) = split_name_title(s);
                (Value::Text(name), Value::from(title))
            }
            other => (other.clone(), Value::Missing),
        })
        .unzip();
    table.set_column(column, names);
    table.set_column(POSITION, titles);
    table.move_to_front(&[column, POSITION]);
}

/// Splits "Insider" into "Insider" and "Position", then fills empty cells.
pub fn normalize_insider_transactions(table: &mut Table) {
    split_column(table, INSIDER);
    table.fill_missing(NOT_AVAILABLE);
}

pub fn normalize_insider_purchases(table: &mut Table) {
    table.fill_missing(NOT_AVAILABLE);
}

/// Drops the trailing footer row and splits "Individual or Entity".
/// Empty cells are left as they are.
pub fn normalize_insider_roster(table: &mut Table) {
    table.drop_last_row();
    split_column(table, INDIVIDUAL_OR_ENTITY);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_token_pattern() {
        for tok in ["CEO", "SVP", "V.P", "CEO-CFO", "A", "DIR.", "JR.", "SMITH-JONES"] {
            assert!(is_title_token(tok), "{} should match", tok);
        }
        // One run of dots then one run of hyphens: "V.P." has a trailing dot too many.
        for tok in ["John", "ceo", "", "10%", "V.P.", "V.P.-CFO", "O'BRIEN", "A-B-C"] {
            assert!(!is_title_token(tok), "{} should not match", tok);
        }
    }

    #[test]
    fn split_mixed_case_name_splits_at_start() {
        assert_eq!(
            split_name_title("John Smith CEO"),
            (String::new(), Some("John Smith CEO".to_string()))
        );
    }

    #[test]
    fn split_all_caps_returns_whole() {
        assert_eq!(
            split_name_title("JOHN SMITH CEO"),
            ("JOHN SMITH CEO".to_string(), None)
        );
    }

    #[test]
    fn split_name_then_title() {
        assert_eq!(
            split_name_title("COOK TIMOTHY D Chief Executive Officer"),
            (
                "COOK TIMOTHY D".to_string(),
                Some("Chief Executive Officer".to_string())
            )
        );
        assert_eq!(
            split_name_title("LEVINSON ARTHUR D Director"),
            ("LEVINSON ARTHUR D".to_string(), Some("Director".to_string()))
        );
    }

    #[test]
    fn split_double_space_breaks_at_empty_token() {
        assert_eq!(
            split_name_title("SMITH  JOHN"),
            ("SMITH".to_string(), Some("JOHN".to_string()))
        );
    }

    #[test]
    fn split_single_token() {
        assert_eq!(split_name_title("VANGUARD"), ("VANGUARD".to_string(), None));
    }

    #[test]
    fn percent_values() {
        assert_eq!(parse_percent(&"12.5%".into()), Value::Float(0.125));
        assert_eq!(parse_percent(&"0.5%".into()), Value::Float(0.005));
        assert_eq!(parse_percent(&Value::Float(50.0)), Value::Float(0.5));
        assert_eq!(parse_percent(&"--".into()), Value::Missing);
        assert_eq!(parse_percent(&Value::Missing), Value::Missing);
    }

    #[test]
    fn report_dates() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        assert_eq!(parse_report_date(&"Dec 30, 2023".into()), Value::Date(d));
        assert_eq!(parse_report_date(&"December 30, 2023".into()), Value::Date(d));
        assert_eq!(parse_report_date(&"2023-12-30".into()), Value::Date(d));
        assert_eq!(parse_report_date(&"12/30/2023".into()), Value::Date(d));
        assert_eq!(
            parse_report_date(&"Mar 1, 2024".into()),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(parse_report_date(&"soon".into()), Value::Missing);
    }

    #[test]
    fn holder_table_typing() {
        let mut t = Table::new(["Holder", "Shares", "Date Reported", "% Out", "Value"]);
        t.push_row(vec![
            "Vanguard Group Inc".into(),
            1_303_688_506.0.into(),
            "Dec 30, 2023".into(),
            "8.47%".into(),
            Value::Missing,
        ]);
        normalize_holder_table(&mut t);
        assert_eq!(
            t.dates(DATE_REPORTED).unwrap(),
            vec![NaiveDate::from_ymd_opt(2023, 12, 30)]
        );
        let pct = t.floats(PERCENT_OUT).unwrap()[0].unwrap();
        assert!((pct - 0.0847).abs() < 1e-12);
        assert_eq!(t.get(0, "Value"), Some(&Value::Missing));
    }

    #[test]
    fn holder_table_without_typed_columns_is_untouched() {
        let mut t = Table::new(["Holder", "Shares"]);
        t.push_row(vec!["X".into(), 1.0.into()]);
        let before = t.clone();
        normalize_holder_table(&mut t);
        assert_eq!(t, before);
    }

    #[test]
    fn insider_transactions_split_and_fill() {
        let mut t = Table::new(["Shares", "Insider", "Transaction", "Value"]);
        t.push_row(vec![
            100.0.into(),
            "COOK TIMOTHY D Chief Executive Officer".into(),
            "Sale".into(),
            Value::Missing,
        ]);
        t.push_row(vec![
            5.0.into(),
            "ADAMS KATHERINE L".into(),
            "Stock Gift".into(),
            Value::Missing,
        ]);
        normalize_insider_transactions(&mut t);
        assert_eq!(
            t.columns(),
            &["Insider", "Position", "Shares", "Transaction", "Value"]
        );
        assert_eq!(t.get(0, INSIDER), Some(&Value::from("COOK TIMOTHY D")));
        assert_eq!(
            t.get(0, POSITION),
            Some(&Value::from("Chief Executive Officer"))
        );
        assert_eq!(t.get(1, INSIDER), Some(&Value::from("ADAMS KATHERINE L")));
        assert_eq!(t.get(1, POSITION), Some(&Value::from(NOT_AVAILABLE)));
        assert_eq!(t.get(0, "Value"), Some(&Value::from(NOT_AVAILABLE)));
        assert_eq!(t.get(0, "Shares"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn insider_transactions_without_insider_column_still_fills() {
        let mut t = Table::new(["A"]);
        t.push_row(vec![Value::Missing]);
        normalize_insider_transactions(&mut t);
        assert_eq!(t.columns(), &["A"]);
        assert_eq!(t.get(0, "A"), Some(&Value::from(NOT_AVAILABLE)));
    }

    #[test]
    fn insider_purchases_only_fill() {
        let mut t = Table::new(["Insider Purchases Last 6m", "Shares", "Trans"]);
        t.push_row(vec!["Purchases".into(), Value::Missing, 3.0.into()]);
        normalize_insider_purchases(&mut t);
        assert_eq!(
            t.columns(),
            &["Insider Purchases Last 6m", "Shares", "Trans"]
        );
        assert_eq!(t.get(0, "Shares"), Some(&Value::from(NOT_AVAILABLE)));
    }

    #[test]
    fn insider_roster_drops_footer_and_keeps_missing() {
        let mut t = Table::new([
            "Most Recent Transaction",
            "Individual or Entity",
            "Date",
            "Shares Owned Directly",
        ]);
        t.push_row(vec![
            "Sale".into(),
            "WILLIAMS JEFFREY E Chief Operating Officer".into(),
            "Oct 1, 2024".into(),
            Value::Missing,
        ]);
        t.push_row(vec![
            "Conversion".into(),
            "SUGAR RONALD D Director".into(),
            "Aug 9, 2024".into(),
            4_000.0.into(),
        ]);
        t.push_row(vec![Value::Missing; 4]);
        normalize_insider_roster(&mut t);
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.columns(),
            &[
                "Individual or Entity",
                "Position",
                "Most Recent Transaction",
                "Date",
                "Shares Owned Directly"
            ]
        );
        assert_eq!(
            t.get(0, INDIVIDUAL_OR_ENTITY),
            Some(&Value::from("WILLIAMS JEFFREY E"))
        );
        assert_eq!(t.get(1, POSITION), Some(&Value::from("Director")));
        assert_eq!(t.get(0, "Shares Owned Directly"), Some(&Value::Missing));
    }

    #[test]
    fn insider_roster_single_row_becomes_empty() {
        let mut t = Table::new(["Individual or Entity"]);
        t.push_row(vec!["FOOTER".into()]);
        normalize_insider_roster(&mut t);
        assert!(t.is_empty());
        assert_eq!(t.columns(), &["Individual or Entity", "Position"]);
    }
}
