//! One conversion run, end to end.
//!
//! Load the configured workbooks, apply the seed scaffolding, run each
//! ingestor, render the document, write it out, and (optionally) parse it
//! back through oxigraph to prove round-trip parseability. Ingestion order
//! is irrelevant to the result — the store merges commutatively — so the
//! sequence here is just the readable one.

use std::path::{Path, PathBuf};

use oxigraph::io::RdfFormat;
use oxigraph::store::Store;

use crate::config::Config;
use crate::error::{ConvertError, MhdbResult};
use crate::ingest::{IngestReport, convert_states, ingest_behaviors, ingest_technology};
use crate::seeds;
use crate::statements::StatementStore;
use crate::table::Workbook;
use crate::turtle::render_document;

/// Output encodings for the main document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// OWL/Turtle text (the point of the exercise).
    Turtle,
    /// The raw statement store as JSON, for debugging.
    Json,
}

/// What one conversion run produced.
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    /// Distinct subjects in the main document.
    pub subjects: usize,
    /// Triples in the main document.
    pub triples: usize,
    /// Bytes written to the main output file.
    pub bytes: usize,
    /// Combined per-row ingest counters.
    pub report: IngestReport,
    /// Triple count oxigraph parsed back, when `--validate` ran.
    pub parsed_triples: Option<usize>,
    /// Neutral-states document summary, when configured.
    pub states: Option<StatesSummary>,
}

/// Summary of the neutral-states side document.
#[derive(Debug, Clone)]
pub struct StatesSummary {
    pub output: PathBuf,
    pub bytes: usize,
    pub report: IngestReport,
    pub parsed_triples: Option<usize>,
}

/// Run one conversion.
pub fn run(
    config: &Config,
    output: &Path,
    format: OutputFormat,
    validate: bool,
) -> MhdbResult<ConvertSummary> {
    let prefixes = config.prefix_table();
    let mut store = StatementStore::new();
    let mut report = IngestReport::default();

    seeds::apply_scaffolding(&mut store, &prefixes)?;

    let mentalhealth = config
        .sources
        .mentalhealth
        .as_deref()
        .map(load_workbook)
        .transpose()?;

    if let Some(path) = config.sources.behaviors.as_deref() {
        match mentalhealth.as_ref() {
            Some(mentalhealth) => {
                let behaviors = load_workbook(path)?;
                report.absorb(ingest_behaviors(
                    &behaviors,
                    mentalhealth,
                    &prefixes,
                    &mut store,
                )?);
            }
            None => {
                tracing::warn!(
                    "behaviors workbook configured without a mentalhealth workbook; skipping"
                );
            }
        }
    }

    if let Some(path) = config.sources.technology.as_deref() {
        let technology = load_workbook(path)?;
        report.absorb(ingest_technology(
            &technology,
            mentalhealth.as_ref(),
            &prefixes,
            &mut store,
        )?);
    }

    let document = match format {
        OutputFormat::Turtle => render_document(&config.header(), &store),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&store).unwrap_or_default();
            json.push('\n');
            json
        }
    };
    write_output(output, &document)?;

    let parsed_triples = match (validate, format) {
        (true, OutputFormat::Turtle) => Some(validate_turtle(&document)?),
        _ => None,
    };

    let states = match (&config.states, config.states_header(), mentalhealth.as_ref()) {
        (Some(states_config), Some(states_header), Some(mentalhealth)) => {
            let workbook = load_workbook(&states_config.workbook)?;
            let (states_document, states_report) =
                convert_states(&workbook, mentalhealth, &states_header)?;
            write_output(&states_config.output, &states_document)?;
            let states_parsed = if validate {
                Some(validate_turtle(&states_document)?)
            } else {
                None
            };
            Some(StatesSummary {
                output: states_config.output.clone(),
                bytes: states_document.len(),
                report: states_report,
                parsed_triples: states_parsed,
            })
        }
        (Some(_), _, None) => {
            tracing::warn!(
                "states workbook configured without a mentalhealth workbook; skipping"
            );
            None
        }
        _ => None,
    };

    let summary = ConvertSummary {
        subjects: store.subject_count(),
        triples: store.triple_count(),
        bytes: document.len(),
        report,
        parsed_triples,
        states,
    };
    tracing::info!(
        subjects = summary.subjects,
        triples = summary.triples,
        bytes = summary.bytes,
        output = %output.display(),
        "conversion finished"
    );
    Ok(summary)
}

fn load_workbook(path: &Path) -> MhdbResult<Workbook> {
    let workbook = Workbook::load(path)?;
    tracing::debug!(path = %path.display(), sheets = workbook.sheet_count(), "loaded workbook");
    Ok(workbook)
}

fn write_output(path: &Path, text: &str) -> Result<(), ConvertError> {
    std::fs::write(path, text).map_err(|source| ConvertError::WriteOutput {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a Turtle document into a fresh oxigraph store and return its
/// triple count.
pub fn validate_turtle(document: &str) -> Result<usize, ConvertError> {
    let store = Store::new().map_err(|err| ConvertError::Validation {
        message: format!("failed to create validation store: {err}"),
    })?;
    store
        .load_from_reader(RdfFormat::Turtle, document.as_bytes())
        .map_err(|err| ConvertError::Validation {
            message: err.to_string(),
        })?;
    store.len().map_err(|err| ConvertError::Validation {
        message: format!("failed to count parsed triples: {err}"),
    })
}
