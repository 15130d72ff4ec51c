//! Rich diagnostic error types for the mhdb compiler.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know which spreadsheet cell or
//! config field to fix.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the mhdb compiler.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum MhdbError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),
}

// ---------------------------------------------------------------------------
// Formatting errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FormatError {
    #[error("cannot build a label from {value:?}")]
    #[diagnostic(
        code(mhdb::format::invalid_label),
        help(
            "Labels must contain at least one alphanumeric character. \
             Check the spreadsheet cell for stray punctuation or an empty value, \
             or guard the call with a missing-cell check."
        )
    )]
    InvalidLabel { value: String },

    #[error("unknown prefix \"{prefix}\" in {value:?}")]
    #[diagnostic(
        code(mhdb::format::unknown_prefix),
        help(
            "Register the prefix in the [prefixes] table of mhdb.toml, \
             or correct the cell if the colon is a typo."
        )
    )]
    UnknownPrefix { prefix: String, value: String },
}

// ---------------------------------------------------------------------------
// Table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    #[error("workbook has no sheet named \"{name}\"")]
    #[diagnostic(
        code(mhdb::table::missing_sheet),
        help(
            "Check the sheet files in the configured source directory. \
             Sheet names are taken from file stems (e.g. `Reference.csv` -> \"Reference\")."
        )
    )]
    MissingSheet { name: String },

    #[error("sheet \"{sheet}\" has no column \"{column}\"")]
    #[diagnostic(
        code(mhdb::table::missing_column),
        help(
            "The ingestor expects this column header. Compare the sheet's first row \
             against the headers the ingestor reads; a missing column aborts the run \
             rather than silently producing an incomplete graph."
        )
    )]
    MissingColumn { sheet: String, column: String },

    #[error("row {row} out of range for sheet \"{sheet}\" ({rows} rows)")]
    #[diagnostic(
        code(mhdb::table::row_out_of_range),
        help("Row indices are zero-based positions within the sheet, not spreadsheet line numbers.")
    )]
    RowOutOfRange {
        sheet: String,
        row: usize,
        rows: usize,
    },

    #[error("failed to read sheet file: {path}")]
    #[diagnostic(code(mhdb::table::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV sheet \"{sheet}\": {source}")]
    #[diagnostic(
        code(mhdb::table::csv),
        help("Check for unbalanced quotes or rows with the wrong number of fields.")
    )]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON workbook {path}: {message}")]
    #[diagnostic(
        code(mhdb::table::json),
        help(
            "A JSON workbook is an object mapping sheet names to arrays of \
             row objects: {{\"Reference\": [{{\"index\": 8, ...}}, ...]}}."
        )
    )]
    Json { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Seed errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SeedError {
    #[error("failed to parse seed bundle \"{id}\": {message}")]
    #[diagnostic(
        code(mhdb::seed::parse),
        help(
            "The bundled scaffolding TOML is compiled into the binary; \
             a parse failure means a packaging bug."
        )
    )]
    Parse { id: String, message: String },
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("cyclic repetition chain at index {index} in sheet \"{sheet}\"")]
    #[diagnostic(
        code(mhdb::ingest::cyclic_repetition),
        help(
            "A repetition_index chain points back at itself. Break the cycle in the \
             spreadsheet; the offending row is skipped so the rest of the run can finish."
        )
    )]
    CyclicRepetition { sheet: String, index: i64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Table(#[from] TableError),
}

// ---------------------------------------------------------------------------
// Conversion-run errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConvertError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(mhdb::convert::config_io),
        help("Pass --config with the path to an mhdb.toml, or run from a directory containing one.")
    )]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    #[diagnostic(
        code(mhdb::convert::config_parse),
        help("Check the TOML syntax and field names against the documented config format.")
    )]
    ConfigParse { path: String, message: String },

    #[error("failed to write output file: {path}")]
    #[diagnostic(
        code(mhdb::convert::write_output),
        help("Check that the output directory exists and the disk is not full.")
    )]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generated document failed Turtle validation: {message}")]
    #[diagnostic(
        code(mhdb::convert::validation),
        help(
            "The produced document did not parse as Turtle. This is a serializer bug; \
             rerun with RUST_LOG=debug and report the offending statement."
        )
    )]
    Validation { message: String },
}

/// Convenience alias for functions returning mhdb results.
pub type MhdbResult<T> = std::result::Result<T, MhdbError>;
