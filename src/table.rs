//! Tabular input model: sheets with named columns and loosely-typed cells.
//!
//! Everything upstream of the ingestors is normalized here. A cell is one of
//! three things — text, number, or missing — and every spelling of "missing"
//! (empty string, `nan`/`NaN`/`None` markers, NaN floats, absent JSON fields)
//! collapses into [`CellValue::Missing`] at load time, so downstream logic
//! matches on the sum type instead of re-checking sentinels.
//!
//! Loaders cover the two external shapes we accept: a directory of CSV files
//! (one per sheet, file stem = sheet name) and a single JSON workbook mapping
//! sheet names to arrays of row objects. Spreadsheet download and `.xlsx`
//! parsing stay outside this crate; whatever produces the files, the contract
//! ends at [`Workbook`].

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::TableError;
use crate::format::Iri;
use crate::vocab::PrefixTable;

/// One spreadsheet cell, normalized.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Non-empty text.
    Text(String),
    /// A finite number.
    Number(f64),
    /// Absent, however the source spelled it.
    Missing,
}

impl CellValue {
    /// Normalize a raw string cell.
    ///
    /// Empty/whitespace-only strings and the `nan`/`NaN`/`None` markers
    /// become [`CellValue::Missing`]; numeric strings become
    /// [`CellValue::Number`]; everything else is trimmed text.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || matches!(trimmed, "nan" | "NaN" | "None") {
            return CellValue::Missing;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
            return CellValue::Missing;
        }
        CellValue::Text(trimmed.to_string())
    }

    /// Normalize a raw float cell (NaN and infinities are missing).
    pub fn normalize_number(raw: f64) -> Self {
        if raw.is_finite() {
            CellValue::Number(raw)
        } else {
            CellValue::Missing
        }
    }

    /// Normalize a JSON value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Missing,
            serde_json::Value::Number(n) => {
                n.as_f64().map(Self::normalize_number).unwrap_or(CellValue::Missing)
            }
            serde_json::Value::String(s) => Self::normalize(s),
            serde_json::Value::Bool(b) => CellValue::Text(b.to_string()),
            other => Self::normalize(&other.to_string()),
        }
    }

    /// Is this cell absent?
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The cell as label text: text verbatim, numbers without a spurious
    /// `.0` when integral, `None` when missing.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Missing => None,
        }
    }

    /// The cell as an integer foreign key, if it is an integral number or a
    /// string of one.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            CellValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

/// One sheet: named columns over rows of normalized cells.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column headers.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with [`CellValue::Missing`].
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(cells);
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column headers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Does the sheet carry this column?
    pub fn has_column(&self, column: &str) -> bool {
        self.column_position(column).is_some()
    }

    /// Fetch a cell by row position and column header.
    ///
    /// A missing column or out-of-range row is a hard error (a data-shape
    /// mismatch aborts the ingestor); a missing value inside an existing
    /// cell is just [`CellValue::Missing`].
    pub fn cell(&self, row: usize, column: &str) -> Result<&CellValue, TableError> {
        let col = self
            .column_position(column)
            .ok_or_else(|| TableError::MissingColumn {
                sheet: self.name.clone(),
                column: column.to_string(),
            })?;
        let cells = self.rows.get(row).ok_or_else(|| TableError::RowOutOfRange {
            sheet: self.name.clone(),
            row,
            rows: self.rows.len(),
        })?;
        Ok(&cells[col])
    }

    /// Find the first row whose `key_column` cell equals `value`.
    ///
    /// This is the foreign-key lookup: an absent key recovers to `None`,
    /// never to an error — most cross-references are optional.
    pub fn find_row(&self, key_column: &str, value: i64) -> Option<usize> {
        let col = self.column_position(key_column)?;
        self.rows
            .iter()
            .position(|cells| cells[col].as_index() == Some(value))
    }
}

/// Resolve a possibly-separated list of foreign keys through a lookup table
/// into rendered IRIs.
///
/// The cell holds zero or more integers joined by `separator`; each resolves
/// through `sheet` from `key_column` to `value_column`, and the value is
/// IRI-resolved. A missing cell yields an empty list; unparseable or
/// out-of-range entries are skipped with a warning rather than failing the
/// row. A missing column is still a hard error.
pub fn split_lookup(
    cell: &CellValue,
    sheet: &Table,
    key_column: &str,
    value_column: &str,
    separator: char,
    prefixes: &PrefixTable,
) -> Result<Vec<String>, TableError> {
    if !sheet.has_column(key_column) {
        return Err(TableError::MissingColumn {
            sheet: sheet.name().to_string(),
            column: key_column.to_string(),
        });
    }
    if !sheet.has_column(value_column) {
        return Err(TableError::MissingColumn {
            sheet: sheet.name().to_string(),
            column: value_column.to_string(),
        });
    }

    let Some(raw) = cell.as_label() else {
        return Ok(Vec::new());
    };

    let mut iris = Vec::new();
    for token in raw.split(separator) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Ok(key) = token.parse::<i64>() else {
            tracing::warn!(sheet = sheet.name(), token, "unparseable lookup index; skipping");
            continue;
        };
        let Some(row) = sheet.find_row(key_column, key) else {
            tracing::warn!(sheet = sheet.name(), key, "lookup index not found; skipping");
            continue;
        };
        let Some(value) = sheet.cell(row, value_column)?.as_label() else {
            tracing::warn!(sheet = sheet.name(), key, "lookup value missing; skipping");
            continue;
        };
        match Iri::resolve(&value, prefixes) {
            Ok(iri) => iris.push(iri.render()),
            Err(err) => {
                tracing::warn!(sheet = sheet.name(), key, %err, "unusable lookup value; skipping");
            }
        }
    }
    Ok(iris)
}

/// A set of named sheets loaded for one conversion run.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    tables: BTreeMap<String, Table>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sheet, replacing any existing sheet of the same name.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Fetch a sheet by name.
    pub fn sheet(&self, name: &str) -> Result<&Table, TableError> {
        self.tables.get(name).ok_or_else(|| TableError::MissingSheet {
            name: name.to_string(),
        })
    }

    /// Names of all loaded sheets, sorted.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of loaded sheets.
    pub fn sheet_count(&self) -> usize {
        self.tables.len()
    }

    /// Load a workbook from a path: a directory of CSV sheets or a single
    /// JSON workbook file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        if path.is_dir() {
            Self::from_csv_dir(path)
        } else {
            Self::from_json_file(path)
        }
    }

    /// Load every `*.csv` file in a directory as a sheet named by file stem.
    pub fn from_csv_dir(dir: &Path) -> Result<Self, TableError> {
        let mut workbook = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|source| TableError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| TableError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                continue;
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            workbook.insert(Self::read_csv_sheet(&name, &path)?);
        }
        Ok(workbook)
    }

    fn read_csv_sheet(name: &str, path: &Path) -> Result<Table, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| TableError::Csv {
                sheet: name.to_string(),
                source,
            })?;
        let columns: Vec<String> = reader
            .headers()
            .map_err(|source| TableError::Csv {
                sheet: name.to_string(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Table::new(name, columns);
        for record in reader.records() {
            let record = record.map_err(|source| TableError::Csv {
                sheet: name.to_string(),
                source,
            })?;
            table.push_row(record.iter().map(CellValue::normalize).collect());
        }
        Ok(table)
    }

    /// Load a JSON workbook: `{"SheetName": [{"col": value, ...}, ...]}`.
    ///
    /// Column order follows first appearance across the sheet's rows; fields
    /// absent from a row are missing cells.
    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let sheets: BTreeMap<String, Vec<serde_json::Map<String, serde_json::Value>>> =
            serde_json::from_str(&text).map_err(|err| TableError::Json {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;

        let mut workbook = Self::new();
        for (name, rows) in sheets {
            let mut columns: Vec<String> = Vec::new();
            for row in &rows {
                for key in row.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            let mut table = Table::new(name, columns.clone());
            for row in &rows {
                table.push_row(
                    columns
                        .iter()
                        .map(|col| row.get(col).map(CellValue::from_json).unwrap_or(CellValue::Missing))
                        .collect(),
                );
            }
            workbook.insert(table);
        }
        Ok(workbook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird_sheet() -> Table {
        let mut table = Table::new("birds", vec!["index".into(), "bird".into()]);
        table.push_row(vec![CellValue::Number(0.0), CellValue::Text(":duck".into())]);
        table.push_row(vec![CellValue::Number(1.0), CellValue::Text(":goose".into())]);
        table.push_row(vec![CellValue::Number(2.0), CellValue::Text(":swan".into())]);
        table
    }

    #[test]
    fn normalize_missing_spellings() {
        assert!(CellValue::normalize("").is_missing());
        assert!(CellValue::normalize("   ").is_missing());
        assert!(CellValue::normalize("nan").is_missing());
        assert!(CellValue::normalize("NaN").is_missing());
        assert!(CellValue::normalize("None").is_missing());
        assert!(CellValue::normalize_number(f64::NAN).is_missing());
        assert!(CellValue::from_json(&serde_json::Value::Null).is_missing());
    }

    #[test]
    fn normalize_numbers_and_text() {
        assert_eq!(CellValue::normalize("8"), CellValue::Number(8.0));
        assert_eq!(
            CellValue::normalize(" despair "),
            CellValue::Text("despair".into())
        );
    }

    #[test]
    fn as_label_formats_integral_numbers_cleanly() {
        assert_eq!(CellValue::Number(8.0).as_label().unwrap(), "8");
        assert_eq!(CellValue::Number(1.5).as_label().unwrap(), "1.5");
        assert!(CellValue::Missing.as_label().is_none());
    }

    #[test]
    fn as_index_accepts_numeric_strings() {
        assert_eq!(CellValue::Text("12".into()).as_index(), Some(12));
        assert_eq!(CellValue::Number(12.0).as_index(), Some(12));
        assert_eq!(CellValue::Number(12.5).as_index(), None);
        assert_eq!(CellValue::Missing.as_index(), None);
    }

    #[test]
    fn cell_missing_column_is_hard_error() {
        let table = bird_sheet();
        let err = table.cell(0, "fish").unwrap_err();
        assert!(matches!(err, TableError::MissingColumn { .. }));
    }

    #[test]
    fn cell_row_out_of_range_is_hard_error() {
        let table = bird_sheet();
        let err = table.cell(99, "bird").unwrap_err();
        assert!(matches!(err, TableError::RowOutOfRange { .. }));
    }

    #[test]
    fn find_row_resolves_foreign_keys() {
        let table = bird_sheet();
        assert_eq!(table.find_row("index", 2), Some(2));
        assert_eq!(table.find_row("index", 99), None);
    }

    #[test]
    fn split_lookup_resolves_separated_indices() {
        let table = bird_sheet();
        let prefixes = PrefixTable::standard();
        let iris = split_lookup(
            &CellValue::Text("0/2".into()),
            &table,
            "index",
            "bird",
            '/',
            &prefixes,
        )
        .unwrap();
        assert_eq!(iris, vec![":duck", ":swan"]);
    }

    #[test]
    fn split_lookup_single_index_without_separator() {
        let table = bird_sheet();
        let prefixes = PrefixTable::standard();
        let iris = split_lookup(
            &CellValue::Number(1.0),
            &table,
            "index",
            "bird",
            ',',
            &prefixes,
        )
        .unwrap();
        assert_eq!(iris, vec![":goose"]);
    }

    #[test]
    fn split_lookup_missing_cell_is_empty() {
        let table = bird_sheet();
        let prefixes = PrefixTable::standard();
        let iris = split_lookup(&CellValue::Missing, &table, "index", "bird", ',', &prefixes)
            .unwrap();
        assert!(iris.is_empty());
    }

    #[test]
    fn split_lookup_skips_bad_indices() {
        let table = bird_sheet();
        let prefixes = PrefixTable::standard();
        let iris = split_lookup(
            &CellValue::Text("0, seven, 99, 2".into()),
            &table,
            "index",
            "bird",
            ',',
            &prefixes,
        )
        .unwrap();
        assert_eq!(iris, vec![":duck", ":swan"]);
    }

    #[test]
    fn csv_dir_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Reference.csv"),
            "index,ReferenceName,ReferenceLink\n8,DSM-5,\n84,US Census,https://census.gov\n",
        )
        .unwrap();
        let workbook = Workbook::from_csv_dir(dir.path()).unwrap();
        let sheet = workbook.sheet("Reference").unwrap();
        assert_eq!(sheet.len(), 2);
        assert!(sheet.cell(0, "ReferenceLink").unwrap().is_missing());
        assert_eq!(
            sheet.cell(1, "ReferenceLink").unwrap().as_text(),
            Some("https://census.gov")
        );
        assert_eq!(sheet.find_row("index", 8), Some(0));
    }

    #[test]
    fn json_workbook_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("workbook.json");
        std::fs::write(
            &path,
            r#"{"gender": [{"index": 1, "gender": "schema:Male"}, {"index": 2, "gender": "schema:Female"}]}"#,
        )
        .unwrap();
        let workbook = Workbook::from_json_file(&path).unwrap();
        let sheet = workbook.sheet("gender").unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.cell(1, "gender").unwrap().as_text(),
            Some("schema:Female")
        );
    }

    #[test]
    fn missing_sheet_is_hard_error() {
        let workbook = Workbook::new();
        assert!(matches!(
            workbook.sheet("Disorder").unwrap_err(),
            TableError::MissingSheet { .. }
        ));
    }
}
