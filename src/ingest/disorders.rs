//! Disorder naming: compose human-readable compound names from the
//! mentalhealth workbook's `Disorder` sheet and its specifier lookups.
//!
//! A disorder row points (optionally) at a diagnostic specifier, up to two
//! inclusion criteria, up to two exclusion criteria, and a severity. Each
//! present piece is folded into the display name, and the finished name
//! doubles as the disorder's identity: the IRI is its slug.

use crate::error::IngestError;
use crate::format::{Iri, language_literal};
use crate::statements::StatementStore;
use crate::table::{Table, Workbook};
use crate::vocab::PrefixTable;

/// Specifier indices whose text precedes the disorder name.
pub const PRE_SPECIFIER_INDICES: [i64; 5] = [6, 7, 24, 25, 26];

/// Specifier indices whose text follows the disorder name.
pub const POST_SPECIFIER_INDICES: [i64; 4] = [27, 28, 56, 78];

/// Follow an index cell in `row` through a lookup sheet to a name cell.
///
/// Recovers to `None` when the index cell is absent or dangling.
fn lookup_name(
    sheet: &Table,
    row: usize,
    index_column: &str,
    lookup: &Table,
    name_column: &str,
) -> Result<Option<String>, IngestError> {
    let Some(index) = sheet.cell(row, index_column)?.as_index() else {
        return Ok(None);
    };
    let Some(lookup_row) = lookup.find_row("index", index) else {
        tracing::warn!(
            index,
            column = index_column,
            sheet = lookup.name(),
            "lookup index not found"
        );
        return Ok(None);
    };
    Ok(lookup.cell(lookup_row, name_column)?.as_label())
}

/// Compose the compound display name for the disorder at `index`.
///
/// Returns `Ok(None)` when the index does not exist in the `Disorder` sheet
/// or the row has no name (dangling foreign keys are recoverable, most
/// references are optional).
pub fn disorder_name(
    index: i64,
    mentalhealth: &Workbook,
    pre_specifiers: &[i64],
    post_specifiers: &[i64],
) -> Result<Option<String>, IngestError> {
    let disorder = mentalhealth.sheet("Disorder")?;
    let severity = mentalhealth.sheet("DisorderSeverity")?;
    let specifier = mentalhealth.sheet("DiagnosticSpecifier")?;
    let criterion = mentalhealth.sheet("DiagnosticCriterion")?;

    let Some(row) = disorder.find_row("index", index) else {
        tracing::warn!(index, "disorder index not found");
        return Ok(None);
    };
    let Some(mut name) = disorder.cell(row, "DisorderName")?.as_label() else {
        tracing::warn!(index, "disorder row has no name");
        return Ok(None);
    };

    if let Some(spec_index) = disorder.cell(row, "DiagnosticSpecifier_index")?.as_index()
        && let Some(spec_name) = lookup_name(
            disorder,
            row,
            "DiagnosticSpecifier_index",
            specifier,
            "DiagnosticSpecifierName",
        )?
    {
        name = if pre_specifiers.contains(&spec_index) {
            format!("{spec_name} {name}")
        } else if post_specifiers.contains(&spec_index) {
            format!("{name} {spec_name}")
        } else {
            format!("{name}, {spec_name}")
        };
    }

    for (column, joiner) in [
        ("DiagnosticInclusionCriterion_index", " with "),
        ("DiagnosticInclusionCriterion2_index", " and "),
        ("DiagnosticExclusionCriterion_index", " without "),
        ("DiagnosticExclusionCriterion2_index", " and "),
    ] {
        if let Some(criterion_name) =
            lookup_name(disorder, row, column, criterion, "DiagnosticCriterionName")?
        {
            name = format!("{name}{joiner}{criterion_name}");
        }
    }

    if let Some(severity_name) = lookup_name(
        disorder,
        row,
        "DisorderSeverity_index",
        severity,
        "DisorderSeverityName",
    )? {
        name = format!("{severity_name} {name}");
    }

    Ok(Some(name))
}

/// Compose the disorder's name, add its label statement, and return its IRI.
pub fn disorder_statements(
    index: i64,
    mentalhealth: &Workbook,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<Option<String>, IngestError> {
    let Some(name) = disorder_name(
        index,
        mentalhealth,
        &PRE_SPECIFIER_INDICES,
        &POST_SPECIFIER_INDICES,
    )?
    else {
        return Ok(None);
    };
    let iri = Iri::resolve(&name, prefixes)?.render();
    if let Some(label) = language_literal(&name) {
        store.add(iri.clone(), "rdfs:label", label);
    }
    Ok(Some(iri))
}
