use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::account::AccountRecord;

#[derive(Debug, PartialEq, Eq)]
pub enum CsvError {
    Empty,
    EmptyHeader { column: usize },
    DuplicateHeader { name: String },
    ColumnCount { line: usize, expected: usize, found: usize },
    UnterminatedQuote { line: usize },
}

impl fmt::Display for CsvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvError::Empty => write!(f, "File is empty or has no header row"),
            CsvError::EmptyHeader { column } => {
                write!(f, "Header column {} has no name", column)
            }
            CsvError::DuplicateHeader { name } => {
                write!(f, "Header column '{}' appears more than once", name)
            }
            CsvError::ColumnCount {
                line,
                expected,
                found,
            } => write!(
                f,
                "Line {}: expected {} columns, found {}",
                line, expected, found
            ),
            CsvError::UnterminatedQuote { line } => {
                write!(f, "Line {}: quoted field is never closed", line)
            }
        }
    }
}

impl std::error::Error for CsvError {}

/// One physical record and the line it started on
struct RawRecord {
    line: usize,
    cells: Vec<String>,
}

/// Parse an uploaded account file. The first row names the fields.
///
/// Double-quoted cells may contain commas, line breaks and doubled quotes.
/// Unquoted cells are trimmed; empty cells are left out of the record.
pub fn parse_accounts(input: &str) -> Result<Vec<AccountRecord>, CsvError> {
    let mut records = split_records(input)?.into_iter();
    let header = records.next().ok_or(CsvError::Empty)?;

    let mut seen = HashSet::new();
    for (i, name) in header.cells.iter().enumerate() {
        if name.is_empty() {
            return Err(CsvError::EmptyHeader { column: i + 1 });
        }
        if !seen.insert(name.as_str()) {
            return Err(CsvError::DuplicateHeader { name: name.clone() });
        }
    }

    records
        .map(|record| -> Result<AccountRecord, CsvError> {
            if record.cells.len() != header.cells.len() {
                return Err(CsvError::ColumnCount {
                    line: record.line,
                    expected: header.cells.len(),
                    found: record.cells.len(),
                });
            }
            Ok(header
                .cells
                .iter()
                .zip(record.cells)
                .filter(|(_, cell)| !cell.is_empty())
                .map(|(name, cell)| (name.clone(), cell))
                .collect())
        })
        .collect()
}

/// Read and parse an account file from disk
pub fn read_accounts(path: &Path) -> Result<Vec<AccountRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read account file at {}", path.display()))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    parse_accounts(content).with_context(|| format!("Invalid account file {}", path.display()))
}

fn split_records(input: &str) -> Result<Vec<RawRecord>, CsvError> {
    let mut records = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(c);
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if !quoted && cell.trim().is_empty() => {
                cell.clear();
                in_quotes = true;
                quoted = true;
            }
            ',' => cells.push(finish_cell(&mut cell, &mut quoted)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                cells.push(finish_cell(&mut cell, &mut quoted));
                push_record(&mut records, std::mem::take(&mut cells), record_line);
                line += 1;
                record_line = line;
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: record_line });
    }
    if quoted || !cell.is_empty() || !cells.is_empty() {
        cells.push(finish_cell(&mut cell, &mut quoted));
        push_record(&mut records, cells, record_line);
    }

    Ok(records)
}

fn finish_cell(cell: &mut String, quoted: &mut bool) -> String {
    let value = std::mem::take(cell);
    let value = if *quoted {
        value
    } else {
        value.trim().to_string()
    };
    *quoted = false;
    value
}

fn push_record(records: &mut Vec<RawRecord>, cells: Vec<String>, line: usize) {
    // blank line
    if cells.len() == 1 && cells[0].is_empty() {
        return;
    }
    records.push(RawRecord { line, cells });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::FieldValue;

    fn text(s: &str) -> Option<FieldValue> {
        Some(FieldValue::from(s))
    }

    #[test]
    fn test_parse_simple() {
        let input = "company,country,employees\nAcme,US,1200\nGlobex,DE,40\n";
        let accounts = parse_accounts(input).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].get("company").cloned(), text("Acme"));
        assert_eq!(accounts[1].get("employees").cloned(), text("40"));
        let keys: Vec<_> = accounts[0].keys().collect();
        assert_eq!(keys, vec!["company", "country", "employees"]);
    }

    #[test]
    fn test_quoted_comma_keeps_alignment() {
        let input = "company,address,country\n\"Acme, Inc.\",\"1 Main St, Springfield\",US\n";
        let accounts = parse_accounts(input).unwrap();
        assert_eq!(accounts[0].get("company").cloned(), text("Acme, Inc."));
        assert_eq!(
            accounts[0].get("address").cloned(),
            text("1 Main St, Springfield")
        );
        assert_eq!(accounts[0].get("country").cloned(), text("US"));
    }

    #[test]
    fn test_doubled_quotes_and_newlines() {
        let input = "company,notes\nAcme,\"Said \"\"call back\"\"\nnext week\"\n";
        let accounts = parse_accounts(input).unwrap();
        assert_eq!(
            accounts[0].get("notes").cloned(),
            text("Said \"call back\"\nnext week")
        );
    }

    #[test]
    fn test_crlf_blank_lines_and_trimming() {
        let input = "company , employees\r\n\r\n  Acme , 10 \r\n\r\nGlobex,20";
        let accounts = parse_accounts(input).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].get("company").cloned(), text("Acme"));
        assert_eq!(accounts[0].get("employees").cloned(), text("10"));
        assert_eq!(accounts[1].get("employees").cloned(), text("20"));
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let input = "company,employees,revenue\nAcme,,$5M\n";
        let accounts = parse_accounts(input).unwrap();
        assert!(!accounts[0].contains_key("employees"));
        assert_eq!(accounts[0].get("revenue").cloned(), text("$5M"));
    }

    #[test]
    fn test_header_only() {
        let accounts = parse_accounts("company,country\n").unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_accounts(""), Err(CsvError::Empty));
        assert_eq!(parse_accounts("\n\n"), Err(CsvError::Empty));
        assert_eq!(
            parse_accounts("company,,country\n"),
            Err(CsvError::EmptyHeader { column: 2 })
        );
        assert_eq!(
            parse_accounts("company,company\n"),
            Err(CsvError::DuplicateHeader {
                name: "company".to_string()
            })
        );
        assert_eq!(
            parse_accounts("company,country\nAcme,US\nGlobex\n"),
            Err(CsvError::ColumnCount {
                line: 3,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            parse_accounts("company,notes\nAcme,\"never closed\n"),
            Err(CsvError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn test_line_numbers_follow_multiline_cells() {
        let input = "company,notes\nAcme,\"two\nlines\"\nGlobex\n";
        assert_eq!(
            parse_accounts(input),
            Err(CsvError::ColumnCount {
                line: 4,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_read_accounts_strips_bom() {
        let path = std::env::temp_dir().join("account_tier_test_bom.csv");
        std::fs::write(&path, "\u{feff}company\nAcme\n").unwrap();
        let accounts = read_accounts(&path).unwrap();
        assert_eq!(accounts[0].get("company").cloned(), text("Acme"));
        let _ = std::fs::remove_file(&path);
    }
}
