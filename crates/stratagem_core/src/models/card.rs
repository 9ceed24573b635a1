//! Card record
//!
//! The typed replacement for the dict-shaped cards the conversion passes used
//! to pass around. Every optional field is defaulted on read so a card written
//! by an older pass still loads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Neutral grey used when a card carries no colour.
pub const DEFAULT_CARD_COLOR: &str = "#9e9e9e";

/// Card language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(alias = "en", alias = "english")]
    English,
    #[serde(alias = "ru", alias = "russian")]
    Russian,
}

impl Language {
    /// Short code used in copy ids (`_en_1`, `_ru_2`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
        }
    }

    pub fn all() -> [Language; 2] {
        [Language::English, Language::Russian]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Russian => write!(f, "Russian"),
        }
    }
}

/// Body sections of a stratagem card. All four keys are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardBody {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub when: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub target: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub effect: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restriction: String,
}

impl CardBody {
    pub fn new(
        when: impl Into<String>,
        target: impl Into<String>,
        effect: impl Into<String>,
        restriction: impl Into<String>,
    ) -> Self {
        Self {
            when: when.into(),
            target: target.into(),
            effect: effect.into(),
            restriction: restriction.into(),
        }
    }

    /// Sections in print order, keyed by their JSON name.
    pub fn sections(&self) -> [(&'static str, &str); 4] {
        [
            ("when", self.when.as_str()),
            ("target", self.target.as_str()),
            ("effect", self.effect.as_str()),
            ("restriction", self.restriction.as_str()),
        ]
    }

    /// Applies `f` to every section, producing a new body.
    pub fn map(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            when: f(&self.when),
            target: f(&self.target),
            effect: f(&self.effect),
            restriction: f(&self.restriction),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections().iter().all(|(_, text)| text.trim().is_empty())
    }
}

/// Activation cost: cost dimension name → non-negative amount.
///
/// Non-integer values found in legacy files (e.g. `"turn": "Your turn"`) are
/// dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cost(BTreeMap<String, u32>);

impl Cost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single `cp` dimension.
    pub fn cp(amount: u32) -> Self {
        let mut map = BTreeMap::new();
        map.insert("cp".to_string(), amount);
        Self(map)
    }

    pub fn with(mut self, dimension: impl Into<String>, amount: u32) -> Self {
        self.0.insert(dimension.into(), amount);
        self
    }

    /// Command-point amount; the key is matched case-insensitively.
    pub fn cp_amount(&self) -> u32 {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("cp"))
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    pub fn get(&self, dimension: &str) -> Option<u32> {
        self.0.get(dimension).copied()
    }

    /// Sum of every dimension, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Cost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
        let mut cost = BTreeMap::new();
        for (key, value) in raw.unwrap_or_default() {
            match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(amount) => {
                    cost.insert(key, amount);
                }
                None => tracing::debug!(dimension = %key, %value, "dropping non-integer cost value"),
            }
        }
        Ok(Cost(cost))
    }
}

/// A printable stratagem card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// `<source id>_<en|ru>_<copy>` when the card came from a CSV row with an id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<String>,
    #[serde(default = "default_color", deserialize_with = "null_as_default_color")]
    pub color: String,
    #[serde(default)]
    pub body: CardBody,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub stratagem_type: Option<String>,
    /// Explicit artwork path; takes precedence over searched images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>, cost: Cost, body: CardBody) -> Self {
        Self {
            id: None,
            title: title.into(),
            faction: None,
            color: default_color(),
            body,
            cost,
            language: None,
            stratagem_type: None,
            image: None,
        }
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = Some(faction.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_type(mut self, stratagem_type: impl Into<String>) -> Self {
        self.stratagem_type = Some(stratagem_type.into());
        self
    }

    /// Declared language, or the one detected from the title.
    pub fn language(&self) -> Language {
        self.language
            .unwrap_or_else(|| crate::i18n::detect_language(&self.title))
    }

    pub fn cp(&self) -> u32 {
        self.cost.cp_amount()
    }

    /// Cards costing 0 or 1 CP are printed twice per language.
    pub fn is_cheap(&self) -> bool {
        self.cp() <= 1
    }

    pub fn faction_name(&self) -> &str {
        self.faction.as_deref().unwrap_or("")
    }

    /// Source id without the `_en_N` / `_ru_N` copy suffix.
    pub fn base_id(&self) -> Option<&str> {
        let id = self.id.as_deref()?;
        for marker in ["_en_", "_ru_"] {
            if let Some(pos) = id.find(marker) {
                return Some(&id[..pos]);
            }
        }
        Some(id)
    }
}

/// Number of copies per language the copy rule prints for a cost.
pub fn copies_for_cp(cp: u32) -> usize {
    if cp <= 1 {
        2
    } else {
        1
    }
}

fn default_color() -> String {
    DEFAULT_CARD_COLOR.to_string()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(default_color))
}
