//! Ingestor for the behavior/symptom workbook.
//!
//! Each row of `Sheet1` is a sign or symptom: a discriminant column picks the
//! schema.org supertype, a reference index resolves through the mentalhealth
//! workbook's `Reference` sheet to a source IRI, and an optional gender index
//! attaches audience statements.

use crate::error::IngestError;
use crate::format::{Iri, default_ns_iri, language_literal};
use crate::statements::StatementStore;
use crate::table::{Table, Workbook};
use crate::vocab::PrefixTable;

use super::IngestReport;

/// Seed the gendered audience classes.
///
/// `mhdb:MaleAudience` and `mhdb:FemaleAudience` are subclasses of
/// `schema:PeopleAudience` carrying the matching `schema:requiredGender`.
pub fn audience_statements(store: &mut StatementStore) {
    for gender in ["Male", "Female"] {
        let iri = format!("mhdb:{gender}Audience");
        store.add(iri.clone(), "rdfs:subClassOf", "schema:PeopleAudience");
        if let Some(label) = language_literal(&format!("{gender} Audience")) {
            store.add(iri.clone(), "rdfs:label", label);
        }
        store.add(iri, "schema:requiredGender", format!("schema:{gender}"));
    }
}

/// Map the sign-or-symptom discriminant to its supertype IRI.
fn sign_or_symptom(discriminant: Option<i64>) -> &'static str {
    match discriminant {
        Some(1) => "health-lifesci:MedicalSign",
        Some(2) => "health-lifesci:MedicalSymptom",
        _ => "health-lifesci:MedicalSignOrSymptom",
    }
}

/// Resolve a reference index to a source IRI.
///
/// The `Reference` row's `ReferenceLink` wins when present; otherwise the IRI
/// is synthesized from `ReferenceName`. An unknown index recovers to `None`.
pub(crate) fn resolve_reference(
    reference: &Table,
    index: Option<i64>,
    prefixes: &PrefixTable,
) -> Result<Option<String>, IngestError> {
    let Some(index) = index else {
        return Ok(None);
    };
    let Some(row) = reference.find_row("index", index) else {
        tracing::warn!(index, sheet = reference.name(), "reference index not found");
        return Ok(None);
    };
    if let Some(link) = reference.cell(row, "ReferenceLink")?.as_label() {
        return Ok(Some(Iri::resolve(&link, prefixes)?.render()));
    }
    match reference.cell(row, "ReferenceName")?.as_label() {
        Some(name) => Ok(Some(default_ns_iri(&name)?)),
        None => Ok(None),
    }
}

/// Ingest the behavior workbook's `Sheet1` against the mentalhealth
/// workbook's `Reference` sheet.
pub fn ingest_behaviors(
    behavior: &Workbook,
    mentalhealth: &Workbook,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<IngestReport, IngestError> {
    let sheet = behavior.sheet("Sheet1")?;
    let gender = behavior.sheet("gender")?;
    let reference = mentalhealth.sheet("Reference")?;

    audience_statements(store);

    let mut report = IngestReport::default();
    for row in 0..sheet.len() {
        match ingest_row(sheet, gender, reference, row, prefixes, store) {
            Ok(true) => report.rows += 1,
            Ok(false) => report.skipped += 1,
            Err(IngestError::Table(err)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(row, %err, "skipping behavior row");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(%report, sheet = sheet.name(), "behavior ingest finished");
    Ok(report)
}

fn ingest_row(
    sheet: &Table,
    gender: &Table,
    reference: &Table,
    row: usize,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<bool, IngestError> {
    let Some(symptom) = sheet.cell(row, "symptom")?.as_label() else {
        tracing::debug!(row, "row has no symptom label");
        return Ok(false);
    };

    let supertype = sign_or_symptom(sheet.cell(row, "sign_or_symptom_index")?.as_index());
    let source = resolve_reference(
        reference,
        sheet.cell(row, "reference_index")?.as_index(),
        prefixes,
    )?;

    let symptom_iri = Iri::resolve(&symptom, prefixes)?.render();
    if let Some(label) = language_literal(&symptom) {
        store.add(symptom_iri.clone(), "rdfs:label", label);
    }
    store.add(symptom_iri.clone(), "rdfs:subClassOf", supertype);
    if let Some(source) = source {
        store.add(symptom_iri.clone(), "dcterms:source", source);
    }

    if let Some(index) = sheet.cell(row, "gender_index")?.as_index()
        && let Some(gender_row) = gender.find_row("index", index)
        && let Some(audience) = gender.cell(gender_row, "gender")?.as_label()
    {
        let audience = Iri::resolve(&audience, prefixes)?.render();
        store.add(symptom_iri.clone(), "schema:audience", audience.clone());
        store.add(symptom_iri, "schema:epidemiology", audience);
    }

    Ok(true)
}
