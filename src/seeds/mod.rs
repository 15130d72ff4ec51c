//! Seed statements: static scaffolding applied before any sheet is ingested.
//!
//! The sheet rows hang off a fixed set of upper classes (BookOrArticle,
//! Assessment, Wearable, ...), the `mhdb:site` property, and a handful of
//! fixed contributors. That scaffolding is a TOML bundle compiled into the
//! binary and poured into the statement store at the start of every run.
//! DOI identifier statements are generated here too, since the scaffolding
//! cites a DOI-addressed standard.

use serde::Deserialize;

use crate::error::SeedError;
use crate::format::{Iri, language_literal, language_literal_tagged, typed_literal};
use crate::statements::StatementStore;
use crate::vocab::PrefixTable;

const SCAFFOLDING: &str = include_str!("scaffolding.toml");

/// A TOML-defined bundle of seed statements.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedBundle {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub statements: Vec<SeedStatement>,
}

/// One seed statement.
///
/// Exactly one of `object` (IRI-resolved) or `literal` (wrapped into a
/// language-tagged literal, English unless `lang` overrides) should be set.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedStatement {
    pub subject: String,
    pub predicate: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub literal: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl SeedBundle {
    /// Parse the bundled scaffolding.
    pub fn scaffolding() -> Result<Self, SeedError> {
        Self::parse("scaffolding", SCAFFOLDING)
    }

    /// Parse a bundle from TOML text.
    pub fn parse(id: &str, text: &str) -> Result<Self, SeedError> {
        toml::from_str(text).map_err(|err| SeedError::Parse {
            id: id.to_string(),
            message: err.to_string(),
        })
    }

    /// Apply every statement to the store. Returns the number applied.
    pub fn apply(
        &self,
        store: &mut StatementStore,
        prefixes: &PrefixTable,
    ) -> Result<usize, SeedError> {
        let mut applied = 0;
        for statement in &self.statements {
            let subject = self.resolve(&statement.subject, prefixes)?;
            let predicate = self.resolve(&statement.predicate, prefixes)?;
            let object = match (&statement.object, &statement.literal) {
                (Some(object), None) => self.resolve(object, prefixes)?,
                (None, Some(literal)) => {
                    let rendered = match statement.lang.as_deref() {
                        Some(lang) => language_literal_tagged(literal, lang),
                        None => language_literal(literal),
                    };
                    rendered.ok_or_else(|| SeedError::Parse {
                        id: self.id.clone(),
                        message: format!(
                            "empty literal for subject {:?}",
                            statement.subject
                        ),
                    })?
                }
                _ => {
                    return Err(SeedError::Parse {
                        id: self.id.clone(),
                        message: format!(
                            "statement for {:?} needs exactly one of `object` or `literal`",
                            statement.subject
                        ),
                    });
                }
            };
            store.add(subject, predicate, object);
            applied += 1;
        }
        Ok(applied)
    }

    fn resolve(&self, value: &str, prefixes: &PrefixTable) -> Result<String, SeedError> {
        Iri::parse(value, prefixes)
            .map(|iri| iri.render())
            .map_err(|err| SeedError::Parse {
                id: self.id.clone(),
                message: err.to_string(),
            })
    }
}

/// Add identifier statements for a DOI-addressed digital object.
///
/// The DOI resolves to an absolute `dx.doi.org` subject carrying
/// `datacite:usesIdentifierScheme datacite:doi` and the DOI itself as a
/// typed literal; a title, when given, becomes the label.
pub fn doi_statements(doi: &str, title: Option<&str>, store: &mut StatementStore) {
    let subject = format!("<https://dx.doi.org/{doi}>");
    store.add(
        subject.clone(),
        "datacite:usesIdentifierScheme",
        "datacite:doi",
    );
    if let Some(identifier) = typed_literal(doi) {
        store.add(subject.clone(), "datacite:hasIdentifier", identifier);
    }
    if let Some(label) = title.and_then(language_literal) {
        store.add(subject, "rdfs:label", label);
    }
}

/// Apply the bundled scaffolding plus its DOI citations to the store.
pub fn apply_scaffolding(
    store: &mut StatementStore,
    prefixes: &PrefixTable,
) -> Result<usize, SeedError> {
    let bundle = SeedBundle::scaffolding()?;
    let applied = bundle.apply(store, prefixes)?;
    doi_statements(
        "10.1109/IEEESTD.2015.7084073",
        Some("1872-2015 - IEEE Standard Ontologies for Robotics and Automation"),
        store,
    );
    tracing::debug!(bundle = %bundle.id, applied, "applied seed statements");
    Ok(applied)
}
