//! RDF vocabulary constants and the prefix registry.
//!
//! Centralizes the namespace IRIs used throughout the compiler: the six
//! always-present W3C/DCMI prefixes every emitted document declares, and the
//! domain prefixes the source spreadsheets reference. The [`PrefixTable`]
//! is what the IRI resolver consults to decide whether a colon-bearing cell
//! value is a prefixed name or a typo.

/// Default ontology namespace prefix. Bare labels resolve into this namespace.
pub const DEFAULT_PREFIX: &str = "mhdb";

/// Namespace IRIs for the always-present document prefixes.
pub mod ns {
    /// owl: namespace
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    /// rdf: namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdfs: namespace
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// xsd: namespace
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xml: namespace
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

    /// dcterms: namespace
    pub const DCTERMS: &str = "http://dublincore.org/documents/2012/06/14/dcmi-terms/";
}

/// Namespace IRIs for the domain prefixes the source sheets use.
pub mod domain {
    /// mhdb: namespace (the default ontology namespace)
    pub const MHDB: &str = "http://www.purl.org/mentalhealth#";

    /// mhdbnb: namespace (neutral-states ontology)
    pub const MHDBNB: &str = "http://www.purl.org/mentalhealth/neutralstates#";

    /// schema: namespace
    pub const SCHEMA: &str = "http://schema.org/";

    /// health-lifesci: namespace
    pub const HEALTH_LIFESCI: &str = "http://health-lifesci.schema.org/";

    /// foaf: namespace
    pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    /// ssn: namespace
    pub const SSN: &str = "http://www.w3.org/ns/ssn/";

    /// sio: namespace
    pub const SIO: &str = "http://semanticscience.org/resource/";

    /// datacite: namespace
    pub const DATACITE: &str = "http://purl.org/spar/datacite/";
}

/// The six prefixes every emitted document declares, in declaration order.
pub const CORE_PREFIXES: [(&str, &str); 6] = [
    ("owl", ns::OWL),
    ("rdf", ns::RDF),
    ("rdfs", ns::RDFS),
    ("xsd", ns::XSD),
    ("xml", ns::XML),
    ("dcterms", ns::DCTERMS),
];

/// Domain prefixes the source spreadsheets reference, in declaration order.
pub const DOMAIN_PREFIXES: [(&str, &str); 8] = [
    ("mhdb", domain::MHDB),
    ("mhdbnb", domain::MHDBNB),
    ("schema", domain::SCHEMA),
    ("health-lifesci", domain::HEALTH_LIFESCI),
    ("foaf", domain::FOAF),
    ("ssn", domain::SSN),
    ("sio", domain::SIO),
    ("datacite", domain::DATACITE),
];

/// Registry of declared prefixes.
///
/// Preserves declaration order for header rendering. The empty (default)
/// prefix and `_` (blank nodes) are considered registered without appearing
/// in the table.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    entries: Vec<(String, String)>,
}

impl PrefixTable {
    /// An empty table (only the implicit `""` and `"_"` prefixes).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The standard table: core W3C/DCMI prefixes plus the domain prefixes.
    pub fn standard() -> Self {
        let entries = CORE_PREFIXES
            .iter()
            .chain(DOMAIN_PREFIXES.iter())
            .map(|(p, iri)| (p.to_string(), iri.to_string()))
            .collect();
        Self { entries }
    }

    /// Register a prefix. Re-registering an existing prefix replaces its IRI
    /// in place, keeping the original declaration position.
    pub fn register(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let prefix = prefix.into();
        let iri = iri.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = iri,
            None => self.entries.push((prefix, iri)),
        }
    }

    /// Is this prefix registered (or implicit)?
    pub fn contains(&self, prefix: &str) -> bool {
        prefix.is_empty() || prefix == "_" || self.entries.iter().any(|(p, _)| p == prefix)
    }

    /// Declared prefixes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, iri)| (p.as_str(), iri.as_str()))
    }

    /// Number of declared prefixes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no prefixes are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_contains_core_and_domain_prefixes() {
        let table = PrefixTable::standard();
        for (prefix, _) in CORE_PREFIXES.iter().chain(DOMAIN_PREFIXES.iter()) {
            assert!(table.contains(prefix), "missing {prefix}");
        }
    }

    #[test]
    fn default_and_blank_prefixes_are_implicit() {
        let table = PrefixTable::empty();
        assert!(table.contains(""));
        assert!(table.contains("_"));
        assert!(!table.contains("schema"));
    }

    #[test]
    fn register_replaces_in_place() {
        let mut table = PrefixTable::empty();
        table.register("ex", "http://example.org/a#");
        table.register("ex", "http://example.org/b#");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().1, "http://example.org/b#");
    }

    #[test]
    fn iteration_preserves_declaration_order() {
        let table = PrefixTable::standard();
        let first: Vec<&str> = table.iter().take(3).map(|(p, _)| p).collect();
        assert_eq!(first, vec!["owl", "rdf", "rdfs"]);
    }
}
