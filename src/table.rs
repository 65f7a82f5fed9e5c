//! # Tabular Input
//!
//! Header row plus data rows for batch mode.
//!
//! The text reader understands plain comma-separated lines with optional
//! double-quoted cells (`""` inside quotes is a literal quote). Blank lines
//! are skipped. It is not a general CSV implementation: quoted cells cannot
//! span lines.
//!
//! ```
//! use etiqueta::table::DataTable;
//!
//! let table = DataTable::parse("code,lot\nABC-001,12345\n").unwrap();
//! assert_eq!(table.header, vec!["code", "lot"]);
//! assert_eq!(table.rows[0], vec!["ABC-001", "12345"]);
//! ```

use crate::error::EtiquetaError;

/// Column names and string cells. Rows may be shorter or longer than the
/// header; binding pairs up only the common prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Parse comma-separated text; the first non-blank line is the header.
    pub fn parse(text: &str) -> Result<Self, EtiquetaError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((header_line, header)) = lines.next() else {
            return Err(EtiquetaError::InputValidation("table is empty".into()));
        };
        let header = split_line(header)
            .map_err(|e| EtiquetaError::InputValidation(format!("line {}: {}", header_line + 1, e)))?;

        let rows = lines
            .map(|(n, line)| {
                split_line(line)
                    .map_err(|e| EtiquetaError::InputValidation(format!("line {}: {}", n + 1, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { header, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if cell.trim().is_empty() => {
                cell.clear();
                in_quotes = true;
            }
            (',', false) => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted cell".into());
    }
    cells.push(cell.trim().to_string());
    Ok(cells)
}
