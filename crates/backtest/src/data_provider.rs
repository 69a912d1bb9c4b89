use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::record::MatchRecord;

const MATCH_ID: &str = "match_id";
const DATE: &str = "date";
const LABEL: &str = "label";
const P1_ODD: &str = "p1_odd";
const P2_ODD: &str = "p2_odd";

/// Columns every dataset must carry; all other columns are features.
pub const REQUIRED_COLUMNS: [&str; 5] = [MATCH_ID, DATE, LABEL, P1_ODD, P2_ODD];

/// Loads match records from a CSV file.
///
/// Expected format: a header row with `match_id`, `date` (`YYYY-MM-DD`),
/// `label` (`1`/`0`), `p1_odd` and `p2_odd`; every other column is read as
/// a numeric feature. Empty cells are missing values. Rows are stably
/// sorted by date.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The header lacks a required column
/// - The CSV structure is malformed
pub fn load_matches_csv(path: impl AsRef<Path>) -> Result<Vec<MatchRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let records = read_matches(file)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    debug!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Reads match records from any CSV source.
///
/// Rows with an unparsable id, date, feature or label are dropped with a
/// warning; unparsable odds are read as missing.
///
/// # Errors
///
/// Returns an error if the header lacks a required column or the CSV
/// structure is malformed.
pub fn read_matches<R: Read>(source: R) -> Result<Vec<MatchRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().context("failed to read CSV header")?;
    let layout = Layout::from_headers(headers)?;

    let mut matches = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("malformed CSV at data row {}", line + 1))?;
        match layout.parse(&row) {
            Ok(record) => matches.push(record),
            Err(err) => warn!(row = line + 1, error = %err, "dropping unparsable row"),
        }
    }

    // Stable, so same-day matches keep their file order
    matches.sort_by_key(|record| record.date);
    Ok(matches)
}

/// Column positions of a dataset.
struct Layout {
    match_id: usize,
    date: usize,
    label: usize,
    p1_odd: usize,
    p2_odd: usize,
    features: Vec<(usize, String)>,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let column = |name: &str| match headers.iter().position(|h| h == name) {
            Some(index) => Ok(index),
            None => Err(anyhow!("missing required column '{name}'")),
        };

        Ok(Self {
            match_id: column(MATCH_ID)?,
            date: column(DATE)?,
            label: column(LABEL)?,
            p1_odd: column(P1_ODD)?,
            p2_odd: column(P2_ODD)?,
            features: headers
                .iter()
                .enumerate()
                .filter(|(_, name)| !REQUIRED_COLUMNS.contains(name))
                .map(|(index, name)| (index, name.to_string()))
                .collect(),
        })
    }

    fn parse(&self, row: &StringRecord) -> Result<MatchRecord> {
        let cell = |index: usize| row.get(index).unwrap_or("");

        let match_id: i64 = cell(self.match_id)
            .parse()
            .with_context(|| format!("invalid match_id '{}'", cell(self.match_id)))?;
        let date = NaiveDate::parse_from_str(cell(self.date), "%Y-%m-%d")
            .with_context(|| format!("invalid date '{}'", cell(self.date)))?;

        let mut features = BTreeMap::new();
        for (index, name) in &self.features {
            if let Some(value) = optional_f64(cell(*index), name)? {
                features.insert(name.clone(), value);
            }
        }

        Ok(MatchRecord {
            match_id,
            date,
            features,
            label: parse_label(cell(self.label))?,
            p1_odd: odds_cell(cell(self.p1_odd), P1_ODD, match_id),
            p2_odd: odds_cell(cell(self.p2_odd), P2_ODD, match_id),
        })
    }
}

fn optional_f64(value: &str, column: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    let parsed: f64 = value
        .parse()
        .with_context(|| format!("invalid {column} '{value}'"))?;
    Ok(Some(parsed))
}

/// Reads an odds cell; unreadable values count as missing.
fn odds_cell(value: &str, column: &str, match_id: i64) -> Option<f64> {
    match optional_f64(value, column) {
        Ok(odds) => odds,
        Err(err) => {
            warn!(match_id, error = %err, "treating unreadable odds as missing");
            None
        }
    }
}

fn parse_label(value: &str) -> Result<Option<bool>> {
    match value {
        "" => Ok(None),
        "1" | "1.0" | "true" | "True" => Ok(Some(true)),
        "0" | "0.0" | "false" | "False" => Ok(Some(false)),
        other => bail!("invalid label '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
match_id,date,elo_diff,form_p1,label,p1_odd,p2_odd
3,2024-01-03,12.5,0.6,1,1.85,2.05
1,2024-01-01,-40,0.4,0,2.40,1.60
2,2024-01-01,,0.5,,1.90,
";

    #[test]
    fn reads_and_sorts_by_date() {
        let records = read_matches(SAMPLE.as_bytes()).unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.match_id).collect();
        // Same-day rows keep file order
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn parses_fields_and_features() {
        let records = read_matches(SAMPLE.as_bytes()).unwrap();
        let first = &records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.label, Some(false));
        assert_eq!(first.p1_odd, Some(2.40));
        assert_eq!(first.features.get("elo_diff"), Some(&-40.0));
        assert_eq!(first.features.len(), 2);
        assert!(!first.features.contains_key("label"));
    }

    #[test]
    fn empty_cells_are_missing() {
        let records = read_matches(SAMPLE.as_bytes()).unwrap();
        let sparse = &records[1];
        assert_eq!(sparse.label, None);
        assert_eq!(sparse.p2_odd, None);
        assert!(!sparse.features.contains_key("elo_diff"));
        assert_eq!(sparse.features.get("form_p1"), Some(&0.5));
    }

    #[test]
    fn unparsable_rows_are_dropped() {
        let data = "\
match_id,date,x,label,p1_odd,p2_odd
1,2024-01-01,1.0,1,2.0,2.0
2,not-a-date,1.0,1,2.0,2.0
3,2024-01-02,abc,1,2.0,2.0
4,2024-01-03,1.0,maybe,2.0,2.0
5,2024-01-04,1.0,0,2.0,2.0
";
        let records = read_matches(data.as_bytes()).unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.match_id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn unreadable_odds_keep_the_row() {
        let data = "\
match_id,date,x,label,p1_odd,p2_odd
1,2024-01-01,1.0,1,N/A,2.0
2,2024-01-02,1.0,0,1.9,-
";
        let records = read_matches(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].p1_odd, None);
        assert_eq!(records[0].p2_odd, Some(2.0));
        assert_eq!(records[0].label, Some(true));
        assert_eq!(records[1].p2_odd, None);
        assert!(records[0].market_odds().is_none());
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let data = "match_id,date,label,p1_odd\n1,2024-01-01,1,2.0\n";
        let err = read_matches(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("p2_odd"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let records = load_matches_csv(file.path()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_matches_csv("/nonexistent/matches.csv").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/matches.csv"));
    }
}
