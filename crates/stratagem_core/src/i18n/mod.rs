//! English/Russian support: language detection, section labels and the
//! substitution table used to produce Russian card copies.

mod builtin;

use crate::error::{open_error, CoreError, Result};
use crate::models::Language;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Any non-ASCII character marks the text as Russian.
pub fn detect_language(text: &str) -> Language {
    if text.is_ascii() {
        Language::English
    } else {
        Language::Russian
    }
}

/// Printed labels of the four body sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLabels {
    pub when: &'static str,
    pub target: &'static str,
    pub effect: &'static str,
    pub restriction: &'static str,
}

impl SectionLabels {
    /// Label for a body section keyed by its JSON name.
    pub fn for_key(&self, key: &str) -> &'static str {
        match key {
            "when" => self.when,
            "target" => self.target,
            "effect" => self.effect,
            _ => self.restriction,
        }
    }
}

pub fn section_labels(language: Language) -> SectionLabels {
    match language {
        Language::English => SectionLabels {
            when: "WHEN:",
            target: "TARGET:",
            effect: "EFFECT:",
            restriction: "RESTRICTIONS:",
        },
        Language::Russian => SectionLabels {
            when: "КОГДА:",
            target: "ЦЕЛЬ:",
            effect: "ЭФФЕКТ:",
            restriction: "ОГРАНИЧЕНИЯ:",
        },
    }
}

/// Ordered English → Russian substitutions.
///
/// Entries are applied in insertion order with plain substring replacement,
/// so longer phrases must come before the shorter phrases they contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: Vec<(String, String)>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock table covering common rules phrasing.
    pub fn builtin() -> Self {
        builtin::ENTRIES.iter().copied().collect()
    }

    pub fn insert(&mut self, english: impl Into<String>, russian: impl Into<String>) {
        let english = english.into();
        if english.is_empty() {
            return;
        }
        self.entries.push((english, russian.into()));
    }

    /// Parses a JSON object, keeping the file's key order.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(CoreError::Config(
                "translation table must be a JSON object of English → Russian strings".into(),
            ));
        };

        let mut table = Self::new();
        for (english, russian) in map {
            match russian {
                Value::String(russian) => table.insert(english, russian),
                other => tracing::warn!(%english, value = %other, "skipping non-string translation"),
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| open_error(path, e))?;
        let table = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded translation table");
        Ok(table)
    }

    pub fn translate(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, (english, russian)| {
                if acc.contains(english.as_str()) {
                    acc.replace(english.as_str(), russian)
                } else {
                    acc
                }
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (english, russian) in iter {
            table.insert(english, russian);
        }
        table
    }
}
