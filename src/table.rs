// In-memory table of string cells, as uploaded by the caller.
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

// Mirrors a dataframe description: numeric columns get distribution
// statistics, text columns get counts and the most frequent value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Text(TextStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    // Sample standard deviation; undefined for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub name: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl ColumnStats {
    pub fn name(&self) -> &str {
        match self {
            ColumnStats::Numeric(s) => &s.name,
            ColumnStats::Text(s) => &s.name,
        }
    }
}

impl Table {
    // Rows shorter than the header are padded with empty cells, longer ones truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, mut row)| {
                if row.len() > width {
                    warn!(row = idx, dropped = row.len() - width, "truncating cells beyond the header");
                }
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { headers, rows }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.len() > headers.len() {
                return Err(PipelineError::RaggedRow {
                    line,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            if record.len() < headers.len() {
                debug!(line, "short csv row padded");
            }
            rows.push(record.iter().map(String::from).collect());
        }
        Ok(Table::new(headers, rows))
    }

    pub fn from_csv_path(path: &Path) -> Result<Table> {
        Table::from_csv_reader(std::fs::File::open(path)?)
    }

    // Cells that are not JSON strings are coerced to text; null or absent cells become empty.
    pub fn from_json_records(records: &[Map<String, Value>]) -> Table {
        let mut headers: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Table { headers, rows }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Table> {
        let records: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
        Ok(Table::from_json_records(&records))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        match self.headers.iter().position(|h| h == name) {
            Some(idx) => Ok(idx),
            None => {
                warn!(column = name, "comment column missing from table");
                Err(PipelineError::MissingColumn {
                    column: name.to_string(),
                    available: self.headers.clone(),
                })
            }
        }
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    // Like a dataframe description: when any column is numeric only those are
    // described, otherwise every column gets text statistics.
    pub fn describe(&self) -> Vec<ColumnStats> {
        let numeric: Vec<ColumnStats> = (0..self.headers.len())
            .filter_map(|idx| self.numeric_stats(idx))
            .map(ColumnStats::Numeric)
            .collect();
        if !numeric.is_empty() {
            return numeric;
        }
        (0..self.headers.len())
            .map(|idx| ColumnStats::Text(self.text_stats(idx)))
            .collect()
    }

    // A column is numeric when it has at least one value and every non-empty cell is a finite number.
    fn numeric_stats(&self, idx: usize) -> Option<NumericStats> {
        let mut values = Vec::new();
        for row in &self.rows {
            let cell = row[idx].trim();
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => values.push(v),
                _ => return None,
            }
        }
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            Some((values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt())
        } else {
            None
        };
        Some(NumericStats {
            name: self.headers[idx].clone(),
            count: values.len(),
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }

    fn text_stats(&self, idx: usize) -> TextStats {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for row in &self.rows {
            let cell = row[idx].as_str();
            if cell.is_empty() {
                continue;
            }
            let count = counts.entry(cell).or_insert(0);
            if *count == 0 {
                order.push(cell);
            }
            *count += 1;
        }
        // Ties go to the value seen first.
        let mut top: Option<(&str, usize)> = None;
        for &value in &order {
            let freq = counts[value];
            if top.map_or(true, |(_, best)| freq > best) {
                top = Some((value, freq));
            }
        }
        TextStats {
            name: self.headers[idx].clone(),
            count: counts.values().sum(),
            unique: order.len(),
            top: top.map(|(v, _)| v.to_string()),
            freq: top.map(|(_, f)| f).unwrap_or(0),
        }
    }
}

// Linear interpolation between closest ranks over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
