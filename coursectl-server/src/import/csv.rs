//! Minimal CSV reader for the roster exports
//!
//! Handles a header row, comma separators, and double-quoted fields with
//! `""` escapes and embedded commas or newlines. Cells are trimmed, and a
//! blank cell reads as absent.

use super::ImportError;

/// Parsed file: header names plus data records
#[derive(Debug)]
pub struct CsvTable {
    file: &'static str,
    headers: Vec<String>,
    records: Vec<(usize, Vec<String>)>,
}

/// One data record with its 1-based starting line
pub struct CsvRecord<'a> {
    table: &'a CsvTable,
    line: usize,
    fields: &'a [String],
}

impl CsvTable {
    /// Parse `text`. `file` names the source in errors.
    pub fn parse(file: &'static str, text: &str) -> Result<Self, ImportError> {
        let mut records = split_records(file, text)?;
        if records.is_empty() {
            return Err(ImportError::Csv {
                file,
                line: 1,
                message: "missing header row".into(),
            });
        }

        let (_, headers) = records.remove(0);
        let headers = headers
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
            .collect();

        // Skip blank trailing lines and rows of empty cells.
        records.retain(|(_, fields)| fields.iter().any(|f| !f.trim().is_empty()));

        Ok(Self {
            file,
            headers,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail unless every named column is present in the header.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), ImportError> {
        for column in columns {
            if self.column_index(column).is_none() {
                return Err(ImportError::MissingColumn {
                    file: self.file,
                    column: (*column).to_owned(),
                });
            }
        }
        Ok(())
    }

    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> {
        self.records.iter().map(move |(line, fields)| CsvRecord {
            table: self,
            line: *line,
            fields,
        })
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

impl<'a> CsvRecord<'a> {
    pub fn line(&self) -> usize {
        self.line
    }

    /// Trimmed cell, `None` when the column is absent or the cell is blank.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.table.column_index(column)?;
        let value = self.fields.get(idx)?.trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn require(&self, column: &str) -> Result<&'a str, ImportError> {
        self.get(column)
            .ok_or_else(|| self.field_error(column, "required value is blank"))
    }

    /// Integer cell. Accepts `3` and `3.0`, the latter as spreadsheets emit it.
    pub fn int(&self, column: &str) -> Result<Option<i64>, ImportError> {
        let Some(raw) = self.get(column) else {
            return Ok(None);
        };
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Some(n));
        }
        match raw.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(Some(f as i64))
            }
            _ => Err(self.field_error(column, "expected a whole number")),
        }
    }

    pub fn require_int(&self, column: &str) -> Result<i64, ImportError> {
        self.int(column)?
            .ok_or_else(|| self.field_error(column, "required value is blank"))
    }

    pub fn float(&self, column: &str) -> Result<Option<f64>, ImportError> {
        let Some(raw) = self.get(column) else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Some(f)),
            _ => Err(self.field_error(column, "expected a number")),
        }
    }

    pub fn field_error(&self, column: &str, reason: impl Into<String>) -> ImportError {
        ImportError::Field {
            file: self.table.file,
            line: self.line,
            column: column.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Split text into records of raw fields, keeping each record's start line.
fn split_records(file: &'static str, text: &str) -> Result<Vec<(usize, Vec<String>)>, ImportError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_start = 1;
    let mut quote_start = 1;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => {
                in_quotes = true;
                quote_start = line;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                records.push((record_start, std::mem::take(&mut fields)));
                line += 1;
                record_start = line;
            }
            '\n' => {
                field.push('\n');
                line += 1;
            }
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err(ImportError::Csv {
            file,
            line: quote_start,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_start, fields));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let text = "Name,Note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n";
        let table = CsvTable::parse("test", text).unwrap();
        let record = table.records().next().unwrap();
        assert_eq!(record.get("Name"), Some("Doe, Jane"));
        assert_eq!(record.get("Note"), Some("said \"hi\""));
        assert_eq!(record.line(), 2);
    }

    #[test]
    fn embedded_newline_advances_line_numbers() {
        let text = "A,B\n\"two\nlines\",x\ny,z\n";
        let table = CsvTable::parse("test", text).unwrap();
        let records: Vec<_> = table.records().collect();
        assert_eq!(records[0].get("A"), Some("two\nlines"));
        assert_eq!(records[1].line(), 4);
    }

    #[test]
    fn blank_cells_and_missing_columns_read_as_none() {
        let table = CsvTable::parse("test", "A,B\r\n1,  \r\n").unwrap();
        let record = table.records().next().unwrap();
        assert_eq!(record.get("A"), Some("1"));
        assert_eq!(record.get("B"), None);
        assert_eq!(record.get("C"), None);
    }

    #[test]
    fn numbers_accept_float_spelling() {
        let table = CsvTable::parse("test", "N,G\n3.0,91.5\n").unwrap();
        let record = table.records().next().unwrap();
        assert_eq!(record.int("N").unwrap(), Some(3));
        assert_eq!(record.float("G").unwrap(), Some(91.5));
    }

    #[test]
    fn bad_number_reports_line_and_column() {
        let table = CsvTable::parse("roster", "N\nx\n4.5\n").unwrap();
        let records: Vec<_> = table.records().collect();
        match records[0].int("N").unwrap_err() {
            ImportError::Field { file, line, column, .. } => {
                assert_eq!((file, line, column.as_str()), ("roster", 2, "N"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(records[1].int("N").is_err());
    }

    #[test]
    fn out_of_range_and_non_finite_numbers_are_rejected() {
        let table = CsvTable::parse("test", "N,G
1e30,NaN
-1e30,inf
").unwrap();
        for record in table.records() {
            assert!(record.int("N").is_err(), "line {}", record.line());
            assert!(record.float("G").is_err(), "line {}", record.line());
        }
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = CsvTable::parse("test", "A\n\"open\n").unwrap_err();
        assert!(matches!(err, ImportError::Csv { line: 2, .. }));
    }

    #[test]
    fn missing_required_column() {
        let table = CsvTable::parse("test", "A\n1\n").unwrap();
        assert!(matches!(
            table.require_columns(&["A", "B"]),
            Err(ImportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let table = CsvTable::parse("test", "A,B\n1,2\n,\n\n").unwrap();
        assert_eq!(table.len(), 1);
    }
}
