//! Project configuration: ontology metadata, prefixes, and source workbooks.
//!
//! A conversion run is described by an `mhdb.toml` file:
//!
//! ```toml
//! [ontology]
//! base_uri = "http://www.purl.org/mentalhealth"
//! label = "mental health database"
//! comment = "..."
//!
//! [prefixes]
//! example = "http://example.org/ns#"
//!
//! [sources]
//! behaviors = "data/behaviors"
//! mentalhealth = "data/mentalhealth"
//! technology = "data/technology"
//!
//! [states]
//! workbook = "data/neutralstates"
//! base_uri = "http://www.purl.org/mentalhealth/neutralstates"
//! label = "mental health database: neutral states"
//! output = "mhdb_states.ttl"
//! ```
//!
//! Source paths point at a directory of CSV sheets or a JSON workbook file;
//! relative paths are resolved against the config file's directory. The
//! `[prefixes]` table extends the standard registry from [`crate::vocab`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConvertError;
use crate::turtle::DocumentHeader;
use crate::vocab::PrefixTable;

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Ontology-level metadata for the main document.
#[derive(Debug, Clone, Deserialize)]
pub struct OntologyMeta {
    /// Base IRI, without a trailing `#`.
    pub base_uri: String,
    /// Version string; defaults to the crate version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Ontology label.
    pub label: String,
    /// Optional ontology comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional `owl:imports` IRIs.
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Paths to the source workbooks of the main document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sources {
    /// Behavior/symptom workbook.
    #[serde(default)]
    pub behaviors: Option<PathBuf>,
    /// Mentalhealth master workbook (Reference, Disorder, specifier sheets).
    #[serde(default)]
    pub mentalhealth: Option<PathBuf>,
    /// Technology workbook (MHealthPeople, Project, lookup sheets).
    #[serde(default)]
    pub technology: Option<PathBuf>,
}

/// Optional neutral-states conversion, producing its own document.
#[derive(Debug, Clone, Deserialize)]
pub struct StatesConfig {
    /// Neutral-states workbook path.
    pub workbook: PathBuf,
    /// Base IRI of the states ontology.
    pub base_uri: String,
    /// States ontology label.
    pub label: String,
    /// Optional comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Output path for the states document.
    #[serde(default = "StatesConfig::default_output")]
    pub output: PathBuf,
}

impl StatesConfig {
    fn default_output() -> PathBuf {
        PathBuf::from("mhdb_states.ttl")
    }
}

/// Everything one conversion run needs to know.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ontology: OntologyMeta,
    /// Extra prefixes on top of the standard registry.
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub states: Option<StatesConfig>,
}

impl Config {
    /// Load and parse a config file, resolving relative source paths against
    /// the config file's directory.
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConvertError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config =
            toml::from_str(&text).map_err(|err| ConvertError::ConfigParse {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.sources.behaviors.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.sources.mentalhealth.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.sources.technology.as_mut() {
            resolve(p);
        }
        if let Some(states) = self.states.as_mut() {
            resolve(&mut states.workbook);
        }
    }

    /// The standard prefix registry extended with this config's `[prefixes]`.
    pub fn prefix_table(&self) -> PrefixTable {
        let mut table = PrefixTable::standard();
        for (prefix, iri) in &self.prefixes {
            table.register(prefix, iri);
        }
        table
    }

    /// Document header for the main ontology.
    pub fn header(&self) -> DocumentHeader {
        DocumentHeader {
            base_uri: self.ontology.base_uri.clone(),
            version: self.ontology.version.clone(),
            label: self.ontology.label.clone(),
            comment: self.ontology.comment.clone(),
            imports: self.ontology.imports.clone(),
            prefixes: self.prefix_table(),
        }
    }

    /// Document header for the neutral-states ontology, if configured.
    pub fn states_header(&self) -> Option<DocumentHeader> {
        self.states.as_ref().map(|states| DocumentHeader {
            base_uri: states.base_uri.clone(),
            version: self.ontology.version.clone(),
            label: states.label.clone(),
            comment: states.comment.clone(),
            imports: Vec::new(),
            prefixes: self.prefix_table(),
        })
    }
}
