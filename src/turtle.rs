//! Turtle serialization: deterministic text generation from a statement store.
//!
//! Two generations of API live here on purpose. [`render_document`] walks a
//! [`StatementStore`] and is what the main conversion pipeline uses.
//! [`render_block`] and friends build one entity block at a time from ordered
//! predicate/object pairs; the neutral-states path still drives those
//! directly, and the reification helper is built on top of them.
//!
//! The punctuation here is load-bearing: `pred obj` pairs joined by `" ;\n\t"`,
//! statements terminated by `" ."`, blank lines between statements. Any
//! conformant Turtle parser must accept the output, and the integration tests
//! hold the serializer to that rather than to string equality alone.

use crate::error::FormatError;
use crate::format::slugify;
use crate::statements::{PredicateMap, StatementStore};
use crate::vocab::PrefixTable;

/// Ontology-level metadata for the document header.
#[derive(Debug, Clone)]
pub struct DocumentHeader {
    /// Base IRI of the ontology (no trailing `#`).
    pub base_uri: String,
    /// Version string, used for `owl:versionIRI` and `owl:versionInfo`.
    pub version: String,
    /// Ontology label.
    pub label: String,
    /// Optional ontology comment; omitted from the header when absent.
    pub comment: Option<String>,
    /// Optional `owl:imports` IRIs; omitted when empty.
    pub imports: Vec<String>,
    /// Prefixes to declare, in declaration order.
    pub prefixes: PrefixTable,
}

/// Render the document header: prefix declarations, `@base`, and the
/// ontology-metadata statement.
///
/// The default prefix `:` is declared against `<base_uri#>`. Absent optional
/// fields degrade to omitted clauses, never to empty-string artifacts.
pub fn render_header(header: &DocumentHeader) -> String {
    let mut out = String::new();

    out.push_str(&format!("@prefix : <{}#> .\n", header.base_uri));
    for (prefix, iri) in header.prefixes.iter() {
        out.push_str(&format!("@prefix {prefix}: <{iri}> .\n"));
    }
    out.push_str(&format!("@base <{}> .\n\n", header.base_uri));

    let mut clauses = vec![
        "rdf:type owl:Ontology".to_string(),
        format!("owl:versionIRI <{}/{}>", header.base_uri, header.version),
        format!(
            "owl:versionInfo \"{}\"^^rdfs:Literal",
            header.version.replace('"', "'")
        ),
        format!(
            "rdfs:label \"{}\"^^rdfs:Literal",
            header.label.replace('"', "'")
        ),
    ];
    if let Some(comment) = header
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        clauses.push(format!(
            "rdfs:comment \"\"\"{}\"\"\"@en",
            comment.replace('"', "'")
        ));
    }
    for import in &header.imports {
        clauses.push(format!("owl:imports <{import}>"));
    }

    out.push_str(&format!(
        "<{}> {} .\n\n",
        header.base_uri,
        clauses.join(" ;\n    ")
    ));
    out
}

/// Render one subject's statement from its predicate → objects map.
///
/// The predicate is repeated for each object, pairs are joined with
/// `" ;\n\t"`, and the statement ends with `" ."`.
pub fn render_statement(subject: &str, predicates: &PredicateMap) -> String {
    let pairs: Vec<String> = predicates
        .iter()
        .flat_map(|(predicate, objects)| {
            objects.iter().map(move |object| format!("{predicate} {object}"))
        })
        .collect();
    format!("{subject} {} .", pairs.join(" ;\n\t"))
}

/// Render the full document: header plus every statement in the store,
/// separated by blank lines.
pub fn render_document(header: &DocumentHeader, store: &StatementStore) -> String {
    let statements: Vec<String> = store
        .iter()
        .map(|(subject, predicates)| render_statement(subject, predicates))
        .collect();
    format!("{}{}\n", render_header(header), statements.join("\n\n"))
}

/// Render one entity block from ordered predicate/object pairs.
///
/// Unlike [`render_statement`] this preserves caller ordering and duplicate
/// pairs; it is the low-level routine the neutral-states path composes its
/// document from.
pub fn render_block(subject: &str, pairs: &[(String, String)]) -> String {
    let rendered: Vec<String> = pairs
        .iter()
        .map(|(predicate, object)| format!("{predicate} {object}"))
        .collect();
    format!("{subject} {} .", rendered.join(" ;\n\t"))
}

/// Deterministic blank-node identifier for a reified triple.
///
/// Derived from the slug of `subject_predicate_object`, so the same triple
/// always reifies to the same blank node and re-reification merges instead
/// of multiplying.
pub fn reification_node(
    subject: &str,
    predicate: &str,
    object: &str,
) -> Result<String, FormatError> {
    Ok(format!(
        "_:{}",
        slugify(&[subject, predicate, object].join("_"))?
    ))
}

/// Render a statement-about-a-statement.
///
/// The triple is wrapped as a blank node of `rdf:type rdf:Statement` with
/// `rdf:subject` / `rdf:predicate` / `rdf:object`, followed by the
/// caller-supplied extra pairs (provenance, typically).
pub fn render_about_statement(
    subject: &str,
    predicate: &str,
    object: &str,
    extras: &[(String, String)],
) -> Result<String, FormatError> {
    let node = reification_node(subject, predicate, object)?;
    let mut pairs = vec![
        ("rdf:type".to_string(), "rdf:Statement".to_string()),
        ("rdf:subject".to_string(), subject.to_string()),
        ("rdf:predicate".to_string(), predicate.to_string()),
        ("rdf:object".to_string(), object.to_string()),
    ];
    pairs.extend(extras.iter().cloned());
    Ok(render_block(&node, &pairs))
}

/// Render an entity block plus one reification per pair carrying the shared
/// `common` statements (e.g. a `dcterms:source` applying to every triple).
pub fn render_block_with_provenance(
    subject: &str,
    pairs: &[(String, String)],
    common: &[(String, String)],
) -> Result<String, FormatError> {
    let mut blocks = Vec::with_capacity(pairs.len() + 1);
    for (predicate, object) in pairs {
        blocks.push(render_about_statement(subject, predicate, object, common)?);
    }
    blocks.push(render_block(subject, pairs));
    Ok(blocks.join("\n\n"))
}
