//! In-memory table built from a newline-delimited JSON file.

use crate::error::{EtlError, EtlResult, FieldProblem};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Type of a column, inferred from the JSON values it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Null,
    Bool,
    Integer,
    Float,
    Text,
    Mixed,
}

impl ColumnType {
    fn of(value: &Value) -> ColumnType {
        match value {
            Value::Null => ColumnType::Null,
            Value::Bool(_) => ColumnType::Bool,
            Value::Number(n) if n.is_f64() => ColumnType::Float,
            Value::Number(_) => ColumnType::Integer,
            Value::String(_) => ColumnType::Text,
            Value::Array(_) | Value::Object(_) => ColumnType::Mixed,
        }
    }

    /// Combine the type seen so far with the type of one more value. Nulls
    /// don't change a column's type and integers widen to floats.
    fn merge(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, b) => b,
            (a, Null) => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Mixed,
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Default)]
pub struct RecordTable {
    columns: Vec<ColumnInfo>,
    column_index: HashMap<String, usize>,
    rows: Vec<Map<String, Value>>,
}

impl RecordTable {
    /// Read one JSON object per line. Blank lines are skipped; anything else
    /// that is not an object fails the whole file.
    pub fn read_json_lines(path: &Path) -> EtlResult<Self> {
        let file = File::open(path)?;
        let mut table = RecordTable::default();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parse_error = |reason: String| EtlError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                reason,
            };
            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(row)) => table.push_row(row),
                Ok(other) => {
                    return Err(parse_error(format!(
                        "expected an object, found {}",
                        json_type_name(&other)
                    )))
                }
                Err(e) => return Err(parse_error(e.to_string())),
            }
        }
        Ok(table)
    }

    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut table = RecordTable::default();
        for row in rows {
            table.push_row(row);
        }
        table
    }

    fn push_row(&mut self, row: Map<String, Value>) {
        for (name, value) in &row {
            let value_type = ColumnType::of(value);
            match self.column_index.get(name) {
                Some(&i) => {
                    let column = &mut self.columns[i];
                    column.column_type = column.column_type.merge(value_type);
                }
                None => {
                    self.column_index.insert(name.clone(), self.columns.len());
                    self.columns.push(ColumnInfo {
                        name: name.clone(),
                        column_type: value_type,
                    });
                }
            }
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index
            .get(name)
            .map(|&i| self.columns[i].column_type)
    }

    pub fn row(&self, index: usize) -> EtlResult<RecordRow<'_>> {
        self.rows
            .get(index)
            .map(|values| RecordRow { index, values })
            .ok_or(EtlError::NoSuchRow {
                index,
                len: self.rows.len(),
            })
    }

    pub fn first(&self) -> EtlResult<RecordRow<'_>> {
        self.row(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = RecordRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, values)| RecordRow { index, values })
    }
}

/// Borrowed view of one row with typed field accessors.
///
/// Required accessors fail on missing or null values; `opt_*` accessors map
/// both to `None` and still fail on a wrong type.
#[derive(Clone, Copy, Debug)]
pub struct RecordRow<'a> {
    index: usize,
    values: &'a Map<String, Value>,
}

impl<'a> RecordRow<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    fn error(&self, field: &str, problem: FieldProblem) -> EtlError {
        EtlError::field(self.index, field, problem)
    }

    fn present(&self, field: &str) -> EtlResult<Option<&'a Value>> {
        match self.values.get(field) {
            None => Err(self.error(field, FieldProblem::Missing)),
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
        }
    }

    fn required(&self, field: &str) -> EtlResult<&'a Value> {
        self.present(field)?
            .ok_or_else(|| self.error(field, FieldProblem::Null))
    }

    fn optional(&self, field: &str) -> Option<&'a Value> {
        match self.values.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn as_str(&self, field: &str, value: &'a Value) -> EtlResult<&'a str> {
        value.as_str().ok_or_else(|| {
            self.error(
                field,
                FieldProblem::WrongType {
                    expected: "string",
                    found: json_type_name(value),
                },
            )
        })
    }

    /// Integral numbers and strings holding an integer are both accepted.
    fn as_i64(&self, field: &str, value: &Value) -> EtlResult<i64> {
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| {
            self.error(
                field,
                FieldProblem::WrongType {
                    expected: "integer",
                    found: json_type_name(value),
                },
            )
        })
    }

    fn as_f64(&self, field: &str, value: &Value) -> EtlResult<f64> {
        value.as_f64().ok_or_else(|| {
            self.error(
                field,
                FieldProblem::WrongType {
                    expected: "number",
                    found: json_type_name(value),
                },
            )
        })
    }

    pub fn has(&self, field: &str) -> bool {
        self.optional(field).is_some()
    }

    pub fn get_str(&self, field: &str) -> EtlResult<&'a str> {
        let value = self.required(field)?;
        self.as_str(field, value)
    }

    pub fn get_i64(&self, field: &str) -> EtlResult<i64> {
        let value = self.required(field)?;
        self.as_i64(field, value)
    }

    pub fn get_f64(&self, field: &str) -> EtlResult<f64> {
        let value = self.required(field)?;
        self.as_f64(field, value)
    }

    pub fn opt_str(&self, field: &str) -> EtlResult<Option<&'a str>> {
        self.optional(field)
            .map(|value| self.as_str(field, value))
            .transpose()
    }

    pub fn opt_i64(&self, field: &str) -> EtlResult<Option<i64>> {
        self.optional(field)
            .map(|value| self.as_i64(field, value))
            .transpose()
    }

    pub fn opt_f64(&self, field: &str) -> EtlResult<Option<f64>> {
        self.optional(field)
            .map(|value| self.as_f64(field, value))
            .transpose()
    }
}
