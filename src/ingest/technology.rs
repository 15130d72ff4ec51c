//! Ingestor for the technology workbook: people/labs and their projects.
//!
//! `MHealthPeople` rows become person subjects identified by their URL, with
//! affiliates parsed out of free-text `Name (detail)` columns. `Project` rows
//! become product subclasses wired to disorders, homepages, project types,
//! contributors, and research studies through foreign-key lookup sheets.

use crate::error::IngestError;
use crate::format::{Iri, language_literal};
use crate::statements::StatementStore;
use crate::table::{Table, Workbook, split_lookup};
use crate::vocab::PrefixTable;

use super::IngestReport;
use super::disorders::disorder_statements;

/// Ingest the whole technology workbook: people first, then projects.
pub fn ingest_technology(
    technology: &Workbook,
    mentalhealth: Option<&Workbook>,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<IngestReport, IngestError> {
    let mut report = ingest_people(technology, prefixes, store)?;
    report.absorb(ingest_projects(technology, mentalhealth, prefixes, store)?);
    Ok(report)
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

/// An affiliate cell, split into a display name and an optional
/// parenthesized detail.
struct Affiliate<'a> {
    name: &'a str,
    detail: Option<&'a str>,
}

impl<'a> Affiliate<'a> {
    fn parse(cell: &'a str) -> Self {
        match cell.split_once('(') {
            Some((name, rest)) => Self {
                name: name.trim(),
                detail: Some(rest.trim_end_matches(')').trim()),
            },
            None => Self {
                name: cell.trim(),
                detail: None,
            },
        }
    }

    /// Family-name-first spelling used for the affiliate's IRI, so "Ann M.
    /// Sam" and "Sam, Ann M." converge.
    fn sort_name(&self) -> String {
        match self.name.split_once(' ') {
            Some((given, rest)) => format!("{rest}, {given}"),
            None => self.name.to_string(),
        }
    }
}

/// Ingest the `MHealthPeople` sheet.
pub fn ingest_people(
    technology: &Workbook,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<IngestReport, IngestError> {
    let sheet = technology.sheet("MHealthPeople")?;

    let mut report = IngestReport::default();
    for row in 0..sheet.len() {
        match ingest_person(sheet, row, prefixes, store) {
            Ok(true) => report.rows += 1,
            Ok(false) => report.skipped += 1,
            Err(IngestError::Table(err)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(row, %err, "skipping person row");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(%report, sheet = sheet.name(), "people ingest finished");
    Ok(report)
}

fn ingest_person(
    sheet: &Table,
    row: usize,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<bool, IngestError> {
    let Some(url) = sheet.cell(row, "URL")?.as_label() else {
        tracing::debug!(row, "person row has no URL");
        return Ok(false);
    };
    let person = Iri::resolve(&url, prefixes)?;
    let person_iri = person.render();

    if let Some(name) = sheet.cell(row, "MHealthPeople/Labs")?.as_label()
        && !name.starts_with("Also")
        && let Some(label) = language_literal(&name)
    {
        store.add(person_iri.clone(), "rdfs:label", label);
    }

    if let Some(site) = sheet.cell(row, "Site")?.as_label() {
        let site_iri = Iri::resolve(&site, prefixes)?.render();
        store.add(person_iri.clone(), "mhdb:site", site_iri.clone());
        if let Some(label) = language_literal(&site) {
            store.add(site_iri, "rdfs:label", label);
        }
    }

    if matches!(person, Iri::Absolute(_)) {
        store.add(person_iri.clone(), "schema:WebPage", person_iri.clone());
    }

    for n in 1..=9 {
        let column = format!("Affiliate{n}");
        if !sheet.has_column(&column) {
            continue;
        }
        let Some(cell) = sheet.cell(row, &column)?.as_label() else {
            continue;
        };
        let affiliate_iri = ingest_affiliate(&cell, prefixes, store)?;
        store.add(person_iri.clone(), "dcterms:contributor", affiliate_iri);
    }

    Ok(true)
}

/// Add statements for one affiliate cell, returning the affiliate's IRI.
fn ingest_affiliate(
    cell: &str,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<String, IngestError> {
    let affiliate = Affiliate::parse(cell);

    // An address-bearing detail identifies the affiliate; otherwise the
    // reordered name does.
    let iri = match affiliate.detail {
        Some(detail) if detail.contains('@') => format!("<mailto:{detail}>"),
        Some(detail) if detail.contains("://") => Iri::resolve(detail, prefixes)?.render(),
        _ => Iri::resolve(&affiliate.sort_name(), prefixes)?.render(),
    };

    if let Some(label) = language_literal(affiliate.name) {
        store.add(iri.clone(), "rdfs:label", label.clone());
        store.add(iri.clone(), "foaf:name", label);
    }

    match affiliate.detail {
        Some(detail) if detail.contains('@') => {
            store.add(iri.clone(), "schema:email", format!("<mailto:{detail}>"));
        }
        Some(detail) if detail.contains("://") => {
            let page = Iri::resolve(detail, prefixes)?.render();
            store.add(iri.clone(), "schema:WebPage", page);
        }
        Some(detail) if !detail.is_empty() => {
            let site = Iri::resolve(detail, prefixes)?.render();
            store.add(iri.clone(), "mhdb:site", site);
        }
        _ => {}
    }

    Ok(iri)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Ingest the `Project` sheet and its lookup sheets.
///
/// Disorder cross-references need the mentalhealth workbook; without it they
/// are skipped with a warning and everything else still ingests.
pub fn ingest_projects(
    technology: &Workbook,
    mentalhealth: Option<&Workbook>,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<IngestReport, IngestError> {
    let sheet = technology.sheet("Project")?;
    let homepage = technology.sheet("HomePageLink")?;
    let type_of_project = technology.sheet("TypeOfProject")?;
    let people = technology.sheet("MHealthPeople")?;
    let research_study = technology.sheet("ResearchStudyOnProject")?;

    let mut report = IngestReport::default();
    for row in 0..sheet.len() {
        let ingested = ingest_project(
            sheet,
            homepage,
            type_of_project,
            people,
            research_study,
            mentalhealth,
            row,
            prefixes,
            store,
        );
        match ingested {
            Ok(true) => report.rows += 1,
            Ok(false) => report.skipped += 1,
            Err(IngestError::Table(err)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(row, %err, "skipping project row");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(%report, sheet = sheet.name(), "project ingest finished");
    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn ingest_project(
    sheet: &Table,
    homepage: &Table,
    type_of_project: &Table,
    people: &Table,
    research_study: &Table,
    mentalhealth: Option<&Workbook>,
    row: usize,
    prefixes: &PrefixTable,
    store: &mut StatementStore,
) -> Result<bool, IngestError> {
    let Some(project) = sheet.cell(row, "project")?.as_label() else {
        tracing::debug!(row, "project row has no name");
        return Ok(false);
    };
    let project_iri = Iri::resolve(&project, prefixes)?.render();

    match (sheet.cell(row, "disorder_index")?.as_label(), mentalhealth) {
        (Some(indices), Some(mentalhealth)) => {
            for token in indices.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                let Ok(index) = token.parse::<i64>() else {
                    tracing::warn!(row, token, "unparseable disorder index; skipping");
                    continue;
                };
                if let Some(disorder_iri) =
                    disorder_statements(index, mentalhealth, prefixes, store)?
                {
                    store.add(project_iri.clone(), "dcterms:subject", disorder_iri);
                }
            }
        }
        (Some(_), None) => {
            tracing::warn!(row, "no mentalhealth workbook; skipping disorder references");
        }
        _ => {}
    }

    let homepage_iris = split_lookup(
        sheet.cell(row, "HomePageLink_index")?,
        homepage,
        "index",
        "HomePageLink",
        ',',
        prefixes,
    )?;
    for homepage_iri in homepage_iris {
        store.add(homepage_iri.clone(), "schema:about", project_iri.clone());
        store.add(homepage_iri, "rdf:type", "schema:WebPage");
    }

    let type_iris = split_lookup(
        sheet.cell(row, "TypeOfProject_index")?,
        type_of_project,
        "index",
        "IRI",
        ',',
        prefixes,
    )?;
    for type_iri in type_iris {
        store.add(project_iri.clone(), "rdf:type", type_iri);
    }

    let people_iris = split_lookup(
        sheet.cell(row, "MHealthPeople_index")?,
        people,
        "index",
        "URL",
        ',',
        prefixes,
    )?;
    for person_iri in people_iris {
        store.add(project_iri.clone(), "dcterms:contributor", person_iri);
    }

    let study_iris = split_lookup(
        sheet.cell(row, "ResearchStudyOnProjectLink_index")?,
        research_study,
        "index",
        "ResearchStudyOnProjectLink",
        ',',
        prefixes,
    )?;
    for study_iri in study_iris {
        store.add(study_iri.clone(), "schema:about", project_iri.clone());
        store.add(study_iri, "rdf:type", "schema:ScholarlyArticle");
    }

    if let Some(label) = language_literal(&project) {
        store.add(project_iri.clone(), "rdfs:label", label);
    }
    store.add(project_iri, "rdfs:subClassOf", "schema:Product");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn number(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn technology_workbook() -> Workbook {
        let mut people = Table::new(
            "MHealthPeople",
            vec![
                "index".into(),
                "MHealthPeople/Labs".into(),
                "URL".into(),
                "Site".into(),
                "Affiliate1".into(),
                "Affiliate2".into(),
            ],
        );
        people.push_row(vec![
            number(1.0),
            text("Mood Lab"),
            text("https://moodlab.org"),
            text("Child Mind Institute"),
            text("Ann M. Sam (ann@moodlab.org)"),
            text("Jo Doe (https://jodoe.net)"),
        ]);
        people.push_row(vec![
            number(2.0),
            text("Also see Mood Lab"),
            text("https://other.org"),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
        ]);

        let mut project = Table::new(
            "Project",
            vec![
                "index".into(),
                "project".into(),
                "disorder_index".into(),
                "HomePageLink_index".into(),
                "TypeOfProject_index".into(),
                "MHealthPeople_index".into(),
                "ResearchStudyOnProjectLink_index".into(),
            ],
        );
        project.push_row(vec![
            number(1.0),
            text("Mood Tracker"),
            CellValue::Missing,
            number(1.0),
            text("1, 2"),
            number(1.0),
            number(1.0),
        ]);
        project.push_row(vec![
            number(2.0),
            CellValue::Missing, // nameless: skipped
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
        ]);

        let mut homepage = Table::new(
            "HomePageLink",
            vec!["index".into(), "HomePageLink".into()],
        );
        homepage.push_row(vec![number(1.0), text("https://moodtracker.app")]);

        let mut types = Table::new("TypeOfProject", vec!["index".into(), "IRI".into()]);
        types.push_row(vec![number(1.0), text("mhdb:Wearable")]);
        types.push_row(vec![number(2.0), text("mhdb:Assessment")]);

        let mut studies = Table::new(
            "ResearchStudyOnProject",
            vec!["index".into(), "ResearchStudyOnProjectLink".into()],
        );
        studies.push_row(vec![number(1.0), text("https://doi.org/10.1000/study1")]);

        let mut workbook = Workbook::new();
        workbook.insert(people);
        workbook.insert(project);
        workbook.insert(homepage);
        workbook.insert(types);
        workbook.insert(studies);
        workbook
    }

    #[test]
    fn person_rows_ingest() {
        let mut store = StatementStore::new();
        let report =
            ingest_people(&technology_workbook(), &PrefixTable::standard(), &mut store).unwrap();
        assert_eq!(report.rows, 2);

        let person = "<https://moodlab.org>";
        assert!(store
            .objects(person, "rdfs:label")
            .any(|o| o == "\"\"\"Mood Lab\"\"\"@en"));
        assert!(store
            .objects(person, "mhdb:site")
            .any(|o| o == "mhdb:Child_Mind_Institute"));
        assert!(store
            .objects("mhdb:Child_Mind_Institute", "rdfs:label")
            .any(|o| o == "\"\"\"Child Mind Institute\"\"\"@en"));
        assert!(store.has(person, "schema:WebPage"));

        // "Also ..." labels are suppressed.
        assert!(!store.has("<https://other.org>", "rdfs:label"));
    }

    #[test]
    fn affiliates_resolve_by_detail_kind() {
        let mut store = StatementStore::new();
        ingest_people(&technology_workbook(), &PrefixTable::standard(), &mut store).unwrap();

        let person = "<https://moodlab.org>";
        // Email affiliate is identified by the address.
        assert!(store
            .objects(person, "dcterms:contributor")
            .any(|o| o == "<mailto:ann@moodlab.org>"));
        assert!(store
            .objects("<mailto:ann@moodlab.org>", "foaf:name")
            .any(|o| o == "\"\"\"Ann M. Sam\"\"\"@en"));
        // Web affiliate is identified by the page.
        assert!(store
            .objects("<https://jodoe.net>", "schema:WebPage")
            .any(|o| o == "<https://jodoe.net>"));
    }

    #[test]
    fn affiliate_sort_name_reorders() {
        let affiliate = Affiliate::parse("Ann M. Sam");
        assert_eq!(affiliate.sort_name(), "M. Sam, Ann");
        let single = Affiliate::parse("Cher");
        assert_eq!(single.sort_name(), "Cher");
    }

    #[test]
    fn project_rows_wire_lookups() {
        let workbook = technology_workbook();
        let mut store = StatementStore::new();
        let report =
            ingest_projects(&workbook, None, &PrefixTable::standard(), &mut store).unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.skipped, 1);

        let project = "mhdb:Mood_Tracker";
        assert!(store
            .objects(project, "rdfs:subClassOf")
            .any(|o| o == "schema:Product"));
        assert!(store
            .objects(project, "rdf:type")
            .any(|o| o == "mhdb:Wearable"));
        assert!(store
            .objects(project, "rdf:type")
            .any(|o| o == "mhdb:Assessment"));
        assert!(store
            .objects(project, "dcterms:contributor")
            .any(|o| o == "<https://moodlab.org>"));
        assert!(store
            .objects("<https://moodtracker.app>", "schema:about")
            .any(|o| o == project));
        assert!(store
            .objects("<https://doi.org/10.1000/study1>", "rdf:type")
            .any(|o| o == "schema:ScholarlyArticle"));
    }

    #[test]
    fn project_disorder_references_need_mentalhealth_workbook() {
        // Same workbook, but with a disorder index and no mentalhealth
        // workbook: the reference is skipped, the row still ingests.
        let mut workbook = technology_workbook();
        let mut project = Table::new(
            "Project",
            vec![
                "index".into(),
                "project".into(),
                "disorder_index".into(),
                "HomePageLink_index".into(),
                "TypeOfProject_index".into(),
                "MHealthPeople_index".into(),
                "ResearchStudyOnProjectLink_index".into(),
            ],
        );
        project.push_row(vec![
            number(1.0),
            text("Mood Tracker"),
            text("1, 2"),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
        ]);
        workbook.insert(project);

        let mut store = StatementStore::new();
        let report =
            ingest_projects(&workbook, None, &PrefixTable::standard(), &mut store).unwrap();
        assert_eq!(report.rows, 1);
        assert!(!store.has("mhdb:Mood_Tracker", "dcterms:subject"));
    }
}
