//! # mhdb
//!
//! Ontology compiler: converts spreadsheet-encoded mental-health knowledge
//! (symptoms, behaviors, disorders, projects, people) into OWL/Turtle text.
//!
//! ## Architecture
//!
//! - **Formatting** (`format`): label slugs, literals, and the three-shape
//!   IRI resolver
//! - **Statement store** (`statements`): `subject → predicate → {objects}`
//!   accumulator with commutative merge
//! - **Serializer** (`turtle`): document header, statement blocks, and
//!   reified statements
//! - **Tables** (`table`): normalized cells, sheets, and foreign-key lookups
//! - **Ingestors** (`ingest`): one routine per source-worksheet shape
//! - **Pipeline** (`pipeline`): load → seed → ingest → render → write →
//!   validate
//!
//! ## Library usage
//!
//! ```no_run
//! use mhdb::statements::StatementStore;
//! use mhdb::turtle::{DocumentHeader, render_document};
//! use mhdb::vocab::PrefixTable;
//!
//! let mut store = StatementStore::new();
//! store.add("mhdb:despair", "rdfs:label", "\"\"\"despair\"\"\"@en");
//! let header = DocumentHeader {
//!     base_uri: "http://www.purl.org/mentalhealth".into(),
//!     version: "0.3.0".into(),
//!     label: "mental health database".into(),
//!     comment: None,
//!     imports: vec![],
//!     prefixes: PrefixTable::standard(),
//! };
//! println!("{}", render_document(&header, &store));
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod pipeline;
pub mod seeds;
pub mod statements;
pub mod table;
pub mod turtle;
pub mod vocab;
