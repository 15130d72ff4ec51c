//! The statement store: an accumulating `subject → predicate → {objects}` multimap.
//!
//! Every ingestor pours its triples in here, and the Turtle serializer walks it
//! at the end of the run. Sorted maps keep serialization deterministic; set
//! semantics at the object level make insertion idempotent. The store only ever
//! grows — nothing removes a statement during a conversion run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Predicate → set-of-objects map for a single subject.
pub type PredicateMap = BTreeMap<String, BTreeSet<String>>;

/// Accumulator of RDF statements for one conversion run.
///
/// Subjects, predicates, and objects are stored in their final Turtle
/// spelling (prefixed name, bracketed IRI, or literal); resolution happens
/// upstream at the ingestion boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementStore {
    statements: BTreeMap<String, PredicateMap>,
}

impl StatementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one statement, creating intermediate maps as needed.
    ///
    /// Idempotent: re-adding an existing (subject, predicate, object) is a
    /// no-op. Never removes anything.
    pub fn add(
        &mut self,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) {
        self.statements
            .entry(subject.into())
            .or_default()
            .entry(predicate.into())
            .or_default()
            .insert(object.into());
    }

    /// Union another store into this one.
    ///
    /// Set union at every level, so merging is associative and commutative:
    /// sheet-ingestion order never changes the final graph.
    pub fn merge(&mut self, other: StatementStore) {
        for (subject, predicates) in other.statements {
            let entry = self.statements.entry(subject).or_default();
            for (predicate, objects) in predicates {
                entry.entry(predicate).or_default().extend(objects);
            }
        }
    }

    /// Does this (subject, predicate) pair have at least one object?
    pub fn has(&self, subject: &str, predicate: &str) -> bool {
        self.statements
            .get(subject)
            .is_some_and(|preds| preds.contains_key(predicate))
    }

    /// All objects recorded for (subject, predicate), in sorted order.
    pub fn objects(&self, subject: &str, predicate: &str) -> impl Iterator<Item = &str> {
        self.statements
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// All subjects, in sorted order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(String::as_str)
    }

    /// Iterate (subject, predicate-map) pairs in sorted subject order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PredicateMap)> {
        self.statements.iter().map(|(s, p)| (s.as_str(), p))
    }

    /// Number of distinct subjects.
    pub fn subject_count(&self) -> usize {
        self.statements.len()
    }

    /// Total number of (subject, predicate, object) triples.
    pub fn triple_count(&self) -> usize {
        self.statements
            .values()
            .flat_map(|preds| preds.values())
            .map(|objects| objects.len())
            .sum()
    }

    /// Whether the store holds no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
