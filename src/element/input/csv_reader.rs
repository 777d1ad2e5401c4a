use crate::element::{InputElement, InputSpec};
use crate::error::ElementError;
use crate::project::Project;
use crate::value::{Value, ValueType};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// CSV source declared by path, resolved into `{file, columns}`.
///
/// Only the header line is read at resolution; the runtime value carries
/// the resolved path and the column names so downstream expressions can
/// reference `$key$.columns` without loading the table.
#[derive(Debug, Clone)]
pub struct CsvReader {
    spec: InputSpec,
}

impl CsvReader {
    pub fn new(spec: InputSpec) -> CsvReader {
        CsvReader { spec }
    }

    fn read_header(&self, path: &str) -> Result<Vec<Value>, ElementError> {
        let file = File::open(path).map_err(|e| {
            ElementError::invalid(self.spec.key(), format!("Failed to open CSV file {path}: {e}"))
        })?;
        let mut header = String::new();
        BufReader::new(file).read_line(&mut header).map_err(|e| {
            ElementError::invalid(self.spec.key(), format!("Failed to read CSV file {path}: {e}"))
        })?;
        let header = header.trim_end();
        // An empty or blank header line means the file has no columns.
        if header.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(header
            .split(',')
            .map(|column| Value::Text(column.trim().trim_matches('"').to_string()))
            .collect())
    }
}

impl InputElement for CsvReader {
    fn spec(&self) -> &InputSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut InputSpec {
        &mut self.spec
    }

    fn kind(&self) -> &'static str {
        "CsvReader"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Object
    }

    fn resolve(&self, project: &Project) -> Result<Value, ElementError> {
        match self.spec.raw_value() {
            Value::Text(path) => {
                let resolved = project.get_input_path(path).to_string_lossy().into_owned();
                let columns = self.read_header(&resolved)?;
                let mut table = BTreeMap::new();
                table.insert("file".to_string(), Value::Text(resolved));
                table.insert("columns".to_string(), Value::List(columns));
                Ok(Value::Object(table))
            }
            // Replayed values arrive already resolved.
            other => Ok(other.clone()),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), ElementError> {
        let columns = value
            .as_object()
            .and_then(|table| table.get("columns"))
            .and_then(Value::as_list);
        match columns {
            Some(columns) if !columns.is_empty() => Ok(()),
            _ => Err(ElementError::invalid(
                self.spec.key(),
                "CSV source has no columns",
            )),
        }
    }
}
