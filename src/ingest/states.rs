//! Neutral-states conversion: the per-entity block-builder code path.
//!
//! The neutral-behaviors workbook predates the statement-store pipeline and
//! is still rendered block by block through [`crate::turtle::render_block`].
//! Rows whose first label is the repetition marker `R` are aliases pointing
//! (possibly transitively) at other rows via `repetition_index`; the chain is
//! walked with an explicit path stack, and a cycle rejects the row instead of
//! looping. Real rows generate screening-question permutations from prefix/
//! suffix/dimensional-prefix lookup sheets and link their symptom to each
//! behavior label.

use std::collections::BTreeSet;

use crate::error::IngestError;
use crate::format::{slugify, typed_literal};
use crate::table::{CellValue, Table, Workbook};
use crate::turtle::{DocumentHeader, render_block, render_header};
use crate::vocab::PrefixTable;

use super::IngestReport;
use super::behaviors::resolve_reference;

/// Cell text marking a row as an alias of other rows.
const REPETITION_MARKER: &str = "R";

fn is_marker(label: &str) -> bool {
    label.trim() == REPETITION_MARKER
}

/// Parse a repetition cell: a single integer or a `(1, 2)`-style list.
fn parse_index_list(cell: &CellValue) -> Vec<i64> {
    let Some(raw) = cell.as_label() else {
        return Vec::new();
    };
    raw.trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']'])
        .split(',')
        .filter_map(|token| {
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            match token.parse::<i64>() {
                Ok(index) => Some(index),
                Err(_) => {
                    tracing::warn!(token, "unparseable repetition index; skipping");
                    None
                }
            }
        })
        .collect()
}

/// Gather every row index a repetition cell points at, transitively.
///
/// Alias rows are followed through their own `repetition_index`; an index
/// that reappears along the chain being walked is a cycle and fails the
/// whole gather. Revisits across branches (diamonds) are fine.
pub fn gather_repetitions(
    cell: &CellValue,
    behaviors: &Table,
) -> Result<Vec<i64>, IngestError> {
    let mut seen = BTreeSet::new();
    let mut path = Vec::new();
    gather(behaviors, &parse_index_list(cell), &mut seen, &mut path)?;
    Ok(seen.into_iter().collect())
}

fn gather(
    behaviors: &Table,
    indices: &[i64],
    seen: &mut BTreeSet<i64>,
    path: &mut Vec<i64>,
) -> Result<(), IngestError> {
    for &index in indices {
        if path.contains(&index) {
            return Err(IngestError::CyclicRepetition {
                sheet: behaviors.name().to_string(),
                index,
            });
        }
        if !seen.insert(index) {
            continue;
        }
        let Some(row) = behaviors.find_row("index", index) else {
            tracing::warn!(index, "repetition index not found");
            continue;
        };
        let label = behaviors.cell(row, "neutral behaviour 1")?.as_label();
        if label.as_deref().is_none_or(is_marker) {
            let next = parse_index_list(behaviors.cell(row, "repetition_index")?);
            path.push(index);
            gather(behaviors, &next, seen, path)?;
            path.pop();
        }
    }
    Ok(())
}

/// Generate the screening-question permutations for one behavior label.
pub fn gen_questions(
    behavior: &str,
    prefix: Option<&str>,
    suffix: Option<&str>,
    dim_prefix: Option<&str>,
) -> Vec<String> {
    let nb = behavior.trim();
    let prefix = prefix.map(str::trim).filter(|p| !p.is_empty());
    let suffix = suffix
        .map(|s| s.trim().trim_end_matches('?'))
        .filter(|s| !s.is_empty());
    let dim = dim_prefix.map(str::trim).filter(|d| !d.is_empty());

    let mut questions = Vec::new();
    if let Some(p) = prefix {
        questions.push(format!("{p} {nb}?"));
        if let Some(s) = suffix {
            questions.push(format!("{p} {nb} {s}?"));
            if let Some(d) = dim {
                questions.push(format!("{d} {p} {nb} {s}?"));
            }
        } else if let Some(d) = dim {
            questions.push(format!("{d} {p} {nb}?"));
        }
    } else if let Some(s) = suffix {
        questions.push(format!("{nb} {s}?"));
        if let Some(d) = dim {
            questions.push(format!("{d} {nb} {s}?"));
        }
    }
    questions
}

/// Render the question blocks and the behavior block for one label.
fn behavior_blocks(
    label: &str,
    prefix: Option<&str>,
    suffix: Option<&str>,
    dim_prefix: Option<&str>,
) -> Result<String, IngestError> {
    let questions = gen_questions(label, prefix, suffix, dim_prefix);

    let mut blocks = Vec::with_capacity(questions.len() + 1);
    for question in &questions {
        let subject = format!("mhdbnb:{}", slugify(question)?);
        let literal = typed_literal(question).unwrap_or_default();
        blocks.push(render_block(
            &subject,
            &[
                ("rdf:type".to_string(), "schema:Question".to_string()),
                ("rdfs:label".to_string(), literal),
            ],
        ));
    }

    let mut pairs = vec![
        (
            "rdfs:subClassOf".to_string(),
            "health-lifesci:MedicalSignOrSymptom".to_string(),
        ),
        (
            "rdfs:label".to_string(),
            typed_literal(label).unwrap_or_default(),
        ),
    ];
    for question in &questions {
        pairs.push((
            "schema:subjectOf".to_string(),
            format!("mhdbnb:{}", slugify(question)?),
        ));
    }
    pairs.push((
        "rdfs:comment".to_string(),
        typed_literal("\"neutral behaviour\"").unwrap_or_default(),
    ));
    blocks.push(render_block(&format!("mhdbnb:{}", slugify(label)?), &pairs));

    Ok(blocks.join("\n\n"))
}

/// Sheet handles for one neutral-states conversion.
struct StatesSheets<'a> {
    behaviors: &'a Table,
    prefixes_sheet: &'a Table,
    dim_sheet: &'a Table,
    suffixes_sheet: &'a Table,
    references: &'a Table,
    prefix_table: &'a PrefixTable,
}

impl StatesSheets<'_> {
    /// Resolve one affix slot (`prefix 2`, `suffix 1`, ...) for a row.
    fn affix(
        &self,
        row: usize,
        index_column: &str,
        lookup: &Table,
        value_column: &str,
    ) -> Result<Option<String>, IngestError> {
        if !self.behaviors.has_column(index_column) {
            return Ok(None);
        }
        let Some(index) = self.behaviors.cell(row, index_column)?.as_index() else {
            return Ok(None);
        };
        let Some(lookup_row) = lookup.find_row("index", index) else {
            tracing::warn!(index, column = index_column, "affix index not found");
            return Ok(None);
        };
        Ok(lookup.cell(lookup_row, value_column)?.as_label())
    }

    /// Render one non-alias row's blocks, attaching the symptom link to the
    /// row at `symptom_index` (the row itself, unless rendered as a
    /// repetition of another row).
    fn render_single(
        &self,
        index: i64,
        symptom_index: i64,
        out: &mut Vec<String>,
    ) -> Result<bool, IngestError> {
        let Some(row) = self.behaviors.find_row("index", index) else {
            tracing::warn!(index, "behavior index not found");
            return Ok(false);
        };
        let Some(first_label) = self.behaviors.cell(row, "neutral behaviour 1")?.as_label()
        else {
            return Ok(false);
        };
        if is_marker(&first_label) {
            return Ok(false);
        }

        let mut labels = vec![first_label];
        for column in ["neutral behaviour 2", "neutral behaviour 3"] {
            if self.behaviors.has_column(column)
                && let Some(label) = self.behaviors.cell(row, column)?.as_label()
                && !is_marker(&label)
            {
                labels.push(label);
            }
        }

        for (slot, label) in labels.iter().enumerate() {
            let n = slot + 1;
            let prefix = self.affix(
                row,
                &format!("prefix {n}"),
                self.prefixes_sheet,
                "neutral behaviour prefix",
            )?;
            let suffix = self.affix(
                row,
                &format!("suffix {n}"),
                self.suffixes_sheet,
                "neutral behaviour suffix",
            )?;
            let dim = self.affix(
                row,
                &format!("dimensional prefix {n}"),
                self.dim_sheet,
                "dimensional prefix",
            )?;
            out.push(behavior_blocks(
                label,
                prefix.as_deref(),
                suffix.as_deref(),
                dim.as_deref(),
            )?);
        }

        let reference = resolve_reference(
            self.references,
            self.behaviors.cell(row, "reference_index")?.as_index(),
            self.prefix_table,
        )?;

        let symptom_row = self
            .behaviors
            .find_row("index", symptom_index)
            .unwrap_or(row);
        if let Some(symptom) = self.behaviors.cell(symptom_row, "symptom")?.as_label() {
            let mut pairs = Vec::with_capacity(labels.len() + 1);
            for label in &labels {
                pairs.push((
                    "rdfs:subClassOf".to_string(),
                    format!("mhdbnb:{}", slugify(label)?),
                ));
            }
            if let Some(reference) = reference {
                pairs.push(("dcterms:source".to_string(), reference));
            }
            out.push(render_block(&format!("mhdb:{}", slugify(&symptom)?), &pairs));
        }

        Ok(true)
    }

    /// Render a row: its transitive repetitions first (attached to this
    /// row's symptom), then the row itself.
    fn render_row(&self, index: i64, out: &mut Vec<String>) -> Result<bool, IngestError> {
        let row = match self.behaviors.find_row("index", index) {
            Some(row) => row,
            None => return Ok(false),
        };
        let repetitions = gather_repetitions(
            self.behaviors.cell(row, "repetition_index")?,
            self.behaviors,
        )?;
        let mut rendered = false;
        for repetition in repetitions {
            rendered |= self.render_single(repetition, index, out)?;
        }
        rendered |= self.render_single(index, index, out)?;
        Ok(rendered)
    }
}

/// Convert the neutral-states workbook into a full Turtle document.
///
/// Uses the block-builder serializer path end to end; references resolve
/// through the mentalhealth workbook's `Reference` sheet.
pub fn convert_states(
    states: &Workbook,
    mentalhealth: &Workbook,
    header: &DocumentHeader,
) -> Result<(String, IngestReport), IngestError> {
    let sheets = StatesSheets {
        behaviors: states.sheet("Sheet1")?,
        prefixes_sheet: states.sheet("neutral behaviour prefix")?,
        dim_sheet: states.sheet("dimensional prefix")?,
        suffixes_sheet: states.sheet("neutral behaviour suffix")?,
        references: mentalhealth.sheet("Reference")?,
        prefix_table: &header.prefixes,
    };

    let mut blocks = Vec::new();
    let mut report = IngestReport::default();
    for row in 0..sheets.behaviors.len() {
        let Some(index) = sheets.behaviors.cell(row, "index")?.as_index() else {
            continue;
        };
        match sheets.render_row(index, &mut blocks) {
            Ok(true) => report.rows += 1,
            Ok(false) => report.skipped += 1,
            Err(IngestError::Table(err)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(index, %err, "skipping neutral-behavior row");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(%report, "neutral-states conversion finished");

    let document = format!("{}{}\n", render_header(header), blocks.join("\n\n"));
    Ok((document, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn states_workbook(repetition_cells: &[(usize, &str)]) -> Workbook {
        let mut behaviors = Table::new(
            "Sheet1",
            vec![
                "index".into(),
                "symptom".into(),
                "neutral behaviour 1".into(),
                "neutral behaviour 2".into(),
                "neutral behaviour 3".into(),
                "repetition_index".into(),
                "prefix 1".into(),
                "suffix 1".into(),
                "dimensional prefix 1".into(),
                "reference_index".into(),
            ],
        );
        // Row 1: a real behavior with a full affix slot.
        behaviors.push_row(vec![
            number(1.0),
            text("restlessness"),
            text("rocking"),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            number(1.0),
            number(1.0),
            number(1.0),
            number(8.0),
        ]);
        // Row 2: an alias row pointing at row 1.
        behaviors.push_row(vec![
            number(2.0),
            text("agitation"),
            text("R"),
            CellValue::Missing,
            CellValue::Missing,
            number(1.0),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
        ]);
        // Row 3: refers through the alias row 2.
        behaviors.push_row(vec![
            number(3.0),
            text("pacing about"),
            text("walking in circles"),
            CellValue::Missing,
            CellValue::Missing,
            number(2.0),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
        ]);
        for &(row, cell) in repetition_cells {
            let mut cells: Vec<CellValue> = (0..10).map(|_| CellValue::Missing).collect();
            cells[0] = number(10.0 + row as f64);
            cells[1] = text("looping");
            cells[2] = text("R");
            cells[5] = text(cell);
            behaviors.push_row(cells);
        }

        let mut prefixes = Table::new(
            "neutral behaviour prefix",
            vec!["index".into(), "neutral behaviour prefix".into()],
        );
        prefixes.push_row(vec![number(1.0), text("Do you feel like")]);

        let mut suffixes = Table::new(
            "neutral behaviour suffix",
            vec!["index".into(), "neutral behaviour suffix".into()],
        );
        suffixes.push_row(vec![number(1.0), text("back and forth?")]);

        let mut dims = Table::new(
            "dimensional prefix",
            vec!["index".into(), "dimensional prefix".into()],
        );
        dims.push_row(vec![number(1.0), text("How often do you feel:")]);

        let mut workbook = Workbook::new();
        workbook.insert(behaviors);
        workbook.insert(prefixes);
        workbook.insert(suffixes);
        workbook.insert(dims);
        workbook
    }

    fn mentalhealth_workbook() -> Workbook {
        let mut reference = Table::new(
            "Reference",
            vec![
                "index".into(),
                "ReferenceName".into(),
                "ReferenceLink".into(),
            ],
        );
        reference.push_row(vec![number(8.0), text("DSM-5"), CellValue::Missing]);
        let mut workbook = Workbook::new();
        workbook.insert(reference);
        workbook
    }

    fn test_header() -> DocumentHeader {
        DocumentHeader {
            base_uri: "http://www.purl.org/mentalhealth/neutralstates".into(),
            version: "0.3.0".into(),
            label: "neutral states".into(),
            comment: None,
            imports: vec![],
            prefixes: PrefixTable::standard(),
        }
    }

    #[test]
    fn question_permutations() {
        let questions = gen_questions(
            "rocking",
            Some("Do you feel like"),
            Some("back and forth?"),
            Some("How often do you feel:"),
        );
        assert_eq!(
            questions,
            vec![
                "Do you feel like rocking?",
                "Do you feel like rocking back and forth?",
                "How often do you feel: Do you feel like rocking back and forth?",
            ]
        );
    }

    #[test]
    fn questions_without_prefix_start_from_suffix() {
        let questions = gen_questions("rocking", None, Some("back and forth?"), None);
        assert_eq!(questions, vec!["rocking back and forth?"]);
        assert!(gen_questions("rocking", None, None, Some("How often:")).is_empty());
    }

    #[test]
    fn repetition_marker_rows_are_aliases() {
        let workbook = states_workbook(&[]);
        let behaviors = workbook.sheet("Sheet1").unwrap();
        // Row 3 points at alias row 2, which forwards to row 1.
        let gathered =
            gather_repetitions(&CellValue::Number(2.0), behaviors).unwrap();
        assert_eq!(gathered, vec![1, 2]);
    }

    #[test]
    fn cyclic_repetition_chain_is_rejected() {
        // Rows 10 and 11 alias each other.
        let workbook = states_workbook(&[(0, "11"), (1, "10")]);
        let behaviors = workbook.sheet("Sheet1").unwrap();
        let err = gather_repetitions(&CellValue::Number(10.0), behaviors).unwrap_err();
        assert!(matches!(err, IngestError::CyclicRepetition { .. }));
    }

    #[test]
    fn conversion_renders_questions_and_symptom_links() {
        let (document, report) = convert_states(
            &states_workbook(&[]),
            &mentalhealth_workbook(),
            &test_header(),
        )
        .unwrap();
        assert!(report.rows >= 2);

        // Question block.
        assert!(document.contains(
            "mhdbnb:Do_you_feel_like_rocking rdf:type schema:Question ;\n\
             \trdfs:label \"\"\"Do you feel like rocking?\"\"\"^^rdfs:Literal ."
        ));
        // Behavior block links the questions.
        assert!(document.contains("mhdbnb:rocking rdfs:subClassOf health-lifesci:MedicalSignOrSymptom"));
        assert!(document.contains("schema:subjectOf mhdbnb:Do_you_feel_like_rocking"));
        // Symptom link with the name-based reference fallback.
        assert!(document.contains(
            "mhdb:restlessness rdfs:subClassOf mhdbnb:rocking ;\n\tdcterms:source mhdb:DSM-5 ."
        ));
        // The aliased behavior is attached to the aliasing row's symptom too.
        assert!(document.contains("mhdb:pacing_about rdfs:subClassOf mhdbnb:rocking"));
    }

    #[test]
    fn conversion_survives_a_cycle_by_skipping_the_row() {
        let (document, report) = convert_states(
            &states_workbook(&[(0, "11"), (1, "10")]),
            &mentalhealth_workbook(),
            &test_header(),
        )
        .unwrap();
        // The cyclic rows are skipped; the healthy rows still render.
        assert!(report.skipped >= 2);
        assert!(document.contains("mhdbnb:rocking"));
    }
}
