//! Raw cell tables read from the registry file, before any header interpretation.

use crate::stations::error::RegistryError;
use crate::stations::header::HEADER_ROW_OFFSET;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Storage format of a station registry, decided from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    /// `.xlsx`, `.xlsm`, `.xls`, `.ods` and anything unrecognised.
    Workbook,
    /// `.csv` / `.txt` exports.
    Delimited,
}

impl RegistryFormat {
    pub fn from_location(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_ascii_lowercase();
        if path.ends_with(".csv") || path.ends_with(".txt") {
            RegistryFormat::Delimited
        } else {
            RegistryFormat::Workbook
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric value of the cell. Text is parsed leniently, accepting a decimal comma.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(text) => text.trim().replace(',', ".").parse().ok(),
            Cell::Empty => None,
        }
    }

    /// Trimmed, non-empty text of the cell. Integral numbers render without a fraction.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Empty => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::String(s) => Cell::from(s.as_str()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(field: &str) -> Self {
        if field.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }
}

/// All rows of one sheet, starting at the sheet's first row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Decodes a spreadsheet workbook and returns the named sheet.
    pub fn from_workbook(bytes: Vec<u8>, sheet: &str) -> Result<Self, RegistryError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let available = workbook.sheet_names();
        if !available.iter().any(|name| name == sheet) {
            return Err(RegistryError::MissingSheet {
                sheet: sheet.to_string(),
                available,
            });
        }
        let range = workbook.worksheet_range(sheet)?;

        // Ranges start at the first used cell; pad so row indices match the sheet.
        let leading_rows = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); leading_rows];
        rows.extend(range.rows().map(|row| row.iter().map(Cell::from).collect()));
        Ok(Self { rows })
    }

    /// Reads a `;` or `,` separated export. Invalid UTF-8 is replaced, not rejected.
    pub fn from_delimited(bytes: &[u8]) -> Result<Self, RegistryError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(sniff_delimiter(bytes))
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| Cell::from(String::from_utf8_lossy(field).as_ref()))
                    .collect(),
            );
        }
        Ok(Self { rows })
    }

    /// Header labels at [`HEADER_ROW_OFFSET`].
    pub fn header(&self) -> Option<Vec<String>> {
        self.rows.get(HEADER_ROW_OFFSET).map(|row| {
            row.iter()
                .map(|cell| cell.as_text().unwrap_or_default())
                .collect()
        })
    }

    /// Rows following the header.
    pub fn data_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(HEADER_ROW_OFFSET + 1..).unwrap_or(&[])
    }
}

/// Picks `;` when it is at least as common as `,` in the metadata and header lines.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let head = String::from_utf8_lossy(bytes);
    let (semicolons, commas) = head
        .lines()
        .take(HEADER_ROW_OFFSET + 1)
        .flat_map(str::chars)
        .fold((0usize, 0usize), |(s, c), ch| match ch {
            ';' => (s + 1, c),
            ',' => (s, c + 1),
            _ => (s, c),
        });
    if semicolons > 0 && semicolons >= commas {
        b';'
    } else {
        b','
    }
}
