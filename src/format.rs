//! Label and IRI formatting: pure string transforms for Turtle generation.
//!
//! Three jobs live here:
//!
//! - [`slugify`]: turn a human-readable spreadsheet label into a URI-safe
//!   fragment. Deterministic, so independently-ingested sheets that mention
//!   the same label converge on the same IRI without an explicit join key.
//! - [`language_literal`] / [`typed_literal`]: wrap cell text into a
//!   triple-quoted Turtle literal with a language or datatype tag.
//! - [`Iri`]: one textual cell value, three semantics — absolute IRI,
//!   prefixed name, or bare label — parsed once into a tagged union so
//!   downstream code switches on the tag, never on string content.
//!
//! Slug collisions (two labels flattening to the same slug) are accepted and
//! unvalidated; colliding labels merge into one subject.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::FormatError;
use crate::vocab::{DEFAULT_PREFIX, PrefixTable};

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Convert a label into a URI-safe slug.
///
/// Interior whitespace runs become `_`, the sequence `_-_` collapses to `-`,
/// non-ASCII letters are NFKD-folded to their ASCII base where one exists,
/// and everything outside `[A-Za-z0-9._-]` is dropped.
///
/// Errors on empty input and on input with no surviving characters; callers
/// are expected to guard against missing cells before calling.
pub fn slugify(label: &str) -> Result<String, FormatError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(FormatError::InvalidLabel {
            value: label.to_string(),
        });
    }

    // Whitespace (newlines included) collapses to `_` before quotes are
    // dropped, so `a\n"b"` becomes `a_b` rather than `ab`.
    let underscored = RE_WHITESPACE.replace_all(trimmed, "_");
    let cleaned = underscored.replace('"', "");
    let dashed = cleaned.replace("_-_", "-");

    let slug: String = dashed
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
        .collect();
    // Prefixed-name local parts may not open with `-`/`.` or close with `.`.
    let slug = slug
        .trim_start_matches(['-', '.'])
        .trim_end_matches('.')
        .to_string();

    if slug.is_empty() {
        return Err(FormatError::InvalidLabel {
            value: label.to_string(),
        });
    }
    Ok(slug)
}

/// Wrap text into an English-tagged Turtle literal: `"""text"""@en`.
///
/// Returns `None` for empty or whitespace-only input so callers can skip
/// absent cells. Embedded double quotes are substituted with single quotes
/// (lossy) rather than backslash-escaped.
pub fn language_literal(text: &str) -> Option<String> {
    language_literal_tagged(text, "en")
}

/// [`language_literal`] with an explicit language tag.
pub fn language_literal_tagged(text: &str, lang: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("\"\"\"{}\"\"\"@{lang}", trimmed.replace('"', "'")))
}

/// Wrap text into a typed Turtle literal: `"""text"""^^rdfs:Literal`.
///
/// Same empty-input and quote-substitution behavior as [`language_literal`].
pub fn typed_literal(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(
        "\"\"\"{}\"\"\"^^rdfs:Literal",
        trimmed.replace('"', "'")
    ))
}

/// A cell value resolved into one of the three IRI shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Iri {
    /// An absolute IRI, rendered bracketed: `<http://...>`.
    Absolute(String),
    /// A prefixed name with a registered prefix, passed through verbatim.
    Prefixed(String),
    /// A bare label, slugified into the default ontology namespace.
    Bare(String),
}

impl Iri {
    /// Strictly parse a cell value by shape.
    ///
    /// - already-bracketed or `://`-bearing values are [`Iri::Absolute`];
    /// - values with a `:` (and no `": "`, which marks prose) whose prefix is
    ///   registered are [`Iri::Prefixed`]; a trailing `:` is stripped and the
    ///   rest re-parsed;
    /// - anything else is a [`Iri::Bare`] label (slugified here, so an
    ///   unusable label surfaces as [`FormatError::InvalidLabel`]).
    ///
    /// A colon-bearing value with an unregistered prefix is
    /// [`FormatError::UnknownPrefix`]; use [`Iri::resolve`] at the ingestion
    /// boundary where that should degrade to a warning instead.
    pub fn parse(value: &str, prefixes: &PrefixTable) -> Result<Self, FormatError> {
        let v = value.trim();

        if let Some(inner) = v.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            return Ok(Iri::Absolute(inner.to_string()));
        }

        if v.contains(':') && !v.contains(": ") {
            if let Some(stripped) = v.strip_suffix(':') {
                return Self::parse(stripped, prefixes);
            }
            let prefix = v.split(':').next().unwrap_or_default();
            if prefixes.contains(prefix) {
                return Ok(Iri::Prefixed(v.to_string()));
            }
            if v.contains("://") {
                return Ok(Iri::Absolute(v.to_string()));
            }
            return Err(FormatError::UnknownPrefix {
                prefix: prefix.to_string(),
                value: v.to_string(),
            });
        }

        Ok(Iri::Bare(slugify(v)?))
    }

    /// Parse a cell value, downgrading an unknown prefix to a logged warning.
    ///
    /// The fallback treats the whole value as a label in the default
    /// namespace, so a typo'd prefix stays visible in the output instead of
    /// killing the run. Invalid labels still error.
    pub fn resolve(value: &str, prefixes: &PrefixTable) -> Result<Self, FormatError> {
        match Self::parse(value, prefixes) {
            Err(FormatError::UnknownPrefix { prefix, value }) => {
                tracing::warn!(%prefix, %value, "unknown prefix; treating value as a bare label");
                Ok(Iri::Bare(slugify(&value)?))
            }
            other => other,
        }
    }

    /// Render into the Turtle spelling.
    pub fn render(&self) -> String {
        match self {
            Iri::Absolute(iri) => format!("<{iri}>"),
            Iri::Prefixed(name) => name.clone(),
            Iri::Bare(slug) => format!("{DEFAULT_PREFIX}:{slug}"),
        }
    }
}

impl std::fmt::Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Slugify a label into the default namespace: `mhdb:<slug>`.
pub fn default_ns_iri(label: &str) -> Result<String, FormatError> {
    Ok(format!("{DEFAULT_PREFIX}:{}", slugify(label)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_replaces_spaces() {
        assert_eq!(slugify("Panic Disorder").unwrap(), "Panic_Disorder");
    }

    #[test]
    fn slugify_drops_punctuation() {
        let slug = slugify("Intellectual Disability (IDD)").unwrap();
        assert_eq!(slug, "Intellectual_Disability_IDD");
        assert!(!slug.contains('('));
        assert!(!slug.contains(' '));
    }

    #[test]
    fn slugify_collapses_spaced_hyphen() {
        assert_eq!(slugify("mood - related").unwrap(), "mood-related");
    }

    #[test]
    fn slugify_keeps_local_part_parseable() {
        // A prefixed-name local part may not begin with `-`/`.` or end with `.`.
        assert_eq!(slugify("etc.").unwrap(), "etc");
        assert_eq!(slugify("- aside").unwrap(), "_aside");
    }

    #[test]
    fn slugify_is_deterministic() {
        let a = slugify("Major Depressive Disorder").unwrap();
        let b = slugify("Major Depressive Disorder").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Café au lait").unwrap(), "Cafe_au_lait");
    }

    #[test]
    fn slugify_strips_quotes_and_newlines() {
        assert_eq!(slugify("he said\n\"stop\"").unwrap(), "he_said_stop");
    }

    #[test]
    fn slugify_rejects_empty_and_unusable_input() {
        assert!(matches!(
            slugify(""),
            Err(FormatError::InvalidLabel { .. })
        ));
        assert!(matches!(
            slugify("   "),
            Err(FormatError::InvalidLabel { .. })
        ));
        assert!(matches!(
            slugify("(!!)"),
            Err(FormatError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn language_literal_wraps_and_tags() {
        assert_eq!(
            language_literal("despair").unwrap(),
            "\"\"\"despair\"\"\"@en"
        );
        assert_eq!(
            language_literal_tagged("désespoir", "fr").unwrap(),
            "\"\"\"désespoir\"\"\"@fr"
        );
    }

    #[test]
    fn language_literal_substitutes_quotes() {
        let lit = language_literal("He said \"stop\"").unwrap();
        assert_eq!(lit, "\"\"\"He said 'stop'\"\"\"@en");
        // No double quote survives between the delimiters.
        let inner = lit
            .strip_prefix("\"\"\"")
            .and_then(|rest| rest.strip_suffix("\"\"\"@en"))
            .unwrap();
        assert!(!inner.contains('"'));
    }

    #[test]
    fn language_literal_skips_empty_input() {
        assert!(language_literal("").is_none());
        assert!(language_literal("  \n").is_none());
    }

    #[test]
    fn typed_literal_uses_datatype_suffix() {
        assert_eq!(
            typed_literal("0.3.0").unwrap(),
            "\"\"\"0.3.0\"\"\"^^rdfs:Literal"
        );
    }

    #[test]
    fn iri_absolute_from_scheme() {
        let iri = Iri::parse("https://dsm.psychiatryonline.org", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "<https://dsm.psychiatryonline.org>");
    }

    #[test]
    fn iri_absolute_from_brackets_does_not_double_wrap() {
        let iri = Iri::parse("<https://example.org/x>", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "<https://example.org/x>");
    }

    #[test]
    fn iri_prefixed_passthrough() {
        let table = PrefixTable::standard();
        assert_eq!(
            Iri::parse("schema:Male", &table).unwrap().render(),
            "schema:Male"
        );
        assert_eq!(Iri::parse(":duck", &table).unwrap().render(), ":duck");
        assert_eq!(Iri::parse("_:b0", &table).unwrap().render(), "_:b0");
    }

    #[test]
    fn iri_trailing_colon_is_stripped() {
        let iri = Iri::parse("despair:", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "mhdb:despair");
    }

    #[test]
    fn iri_bare_label_enters_default_namespace() {
        let iri = Iri::parse("Panic Disorder", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "mhdb:Panic_Disorder");
    }

    #[test]
    fn iri_prose_with_colon_is_a_label() {
        // ": " marks natural language, not a prefixed name.
        let iri = Iri::parse("Warning: may bite", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "mhdb:Warning_may_bite");
    }

    #[test]
    fn iri_unknown_prefix_is_strict_error() {
        let err = Iri::parse("shcema:Male", &PrefixTable::standard()).unwrap_err();
        assert!(matches!(err, FormatError::UnknownPrefix { .. }));
    }

    #[test]
    fn iri_resolve_falls_back_on_unknown_prefix() {
        let iri = Iri::resolve("shcema:Male", &PrefixTable::standard()).unwrap();
        assert_eq!(iri.render(), "mhdb:shcemaMale");
    }

    #[test]
    fn same_label_same_iri() {
        let table = PrefixTable::standard();
        let a = Iri::resolve("Male Audience", &table).unwrap();
        let b = Iri::resolve("Male Audience", &table).unwrap();
        assert_eq!(a, b);
    }
}
