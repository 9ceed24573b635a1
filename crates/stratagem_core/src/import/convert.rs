//! Row → card conversion with the bilingual copy rule

use super::description::parse_description;
use crate::config::{ImportConfig, PipelineConfig};
use crate::error::Result;
use crate::i18n::TranslationTable;
use crate::models::{copies_for_cp, Card, CardDeck, Cost, Language, StratagemRow};
use serde::{Deserialize, Serialize};

/// How the header colour of a card is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Green for free, blue for 1 CP, red for 2+ CP
    #[default]
    Cost,
    /// Attack / defence / phase colours by keyword
    Purpose,
}

const ATTACK_NAMES: &[&str] = &["offensive", "challenge", "shock", "grenade"];
const ATTACK_LEGENDS: &[&str] = &[
    "attack",
    "damage",
    "wound",
    "strike",
    "ramming",
    "hurl death",
    "deadly duel",
];
const DEFENSIVE_NAMES: &[&str] = &["ground", "bravery", "intervention", "overwatch", "smokescreen"];
const DEFENSIVE_LEGENDS: &[&str] = &[
    "salvation",
    "cover",
    "survival",
    "shield",
    "protection",
    "defend",
    "drive back",
    "veiled",
];
const PHASE_NAMES: &[&str] = &["re-roll", "ingress", "orders"];
const PHASE_LEGENDS: &[&str] = &["command", "fortune", "strategy", "hasten", "intelligence"];

impl ColorScheme {
    pub fn color_for(&self, row: &StratagemRow, cp: u32) -> &'static str {
        match self {
            ColorScheme::Cost => match cp {
                0 => "#4caf50",
                1 => "#2196f3",
                _ => "#f44336",
            },
            ColorScheme::Purpose => purpose_color(row),
        }
    }
}

fn purpose_color(row: &StratagemRow) -> &'static str {
    let name = row.name.to_lowercase();
    let legend = row.legend.to_lowercase();
    let turn = row.turn.to_lowercase();
    let any_in = |haystack: &str, words: &[&str]| words.iter().any(|w| haystack.contains(w));

    if any_in(&name, ATTACK_NAMES) || any_in(&legend, ATTACK_LEGENDS) {
        "#d32f2f"
    } else if turn.contains("opponent") || any_in(&name, DEFENSIVE_NAMES) || any_in(&legend, DEFENSIVE_LEGENDS) {
        "#388e3c"
    } else if any_in(&name, PHASE_NAMES) || any_in(&legend, PHASE_LEGENDS) {
        "#1976d2"
    } else {
        "#757575"
    }
}

/// Builds card decks from raw export rows.
#[derive(Debug, Clone)]
pub struct CardConverter {
    config: ImportConfig,
    table: TranslationTable,
}

impl CardConverter {
    pub fn new(config: ImportConfig, table: TranslationTable) -> Self {
        Self { config, table }
    }

    /// Uses the configured translation file, or the built-in table.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let table = match &config.import.translation_table {
            Some(path) => TranslationTable::load(path)?,
            None => TranslationTable::builtin(),
        };
        Ok(Self::new(config.import.clone(), table))
    }

    pub fn convert(&self, rows: &[StratagemRow]) -> CardDeck {
        let cards: Vec<Card> = rows.iter().flat_map(|row| self.convert_row(row)).collect();
        tracing::info!(rows = rows.len(), cards = cards.len(), "converted stratagems");
        CardDeck::new(cards)
    }

    /// English copies first, then Russian copies, per the copy rule.
    pub fn convert_row(&self, row: &StratagemRow) -> Vec<Card> {
        let cp = row.cp();
        let copies = copies_for_cp(cp);
        let body = parse_description(&row.description);

        let mut english = Card::new(row.name.trim(), Cost::cp(cp), body)
            .with_color(self.config.color_scheme.color_for(row, cp))
            .with_language(Language::English);
        english.faction = self.resolve_faction(row);
        if !row.stratagem_type.trim().is_empty() {
            english.stratagem_type = Some(row.stratagem_type.trim().to_string());
        }

        let russian = Card {
            title: self.table.translate(&english.title),
            body: english.body.map(|text| self.table.translate(text)),
            language: Some(Language::Russian),
            ..english.clone()
        };

        let id = row.id.trim();
        let mut cards = Vec::with_capacity(copies * 2);
        for template in [english, russian] {
            for n in 1..=copies {
                let mut card = template.clone();
                if !id.is_empty() {
                    card.id = Some(format!("{id}_{}_{n}", template.language().code()));
                }
                cards.push(card);
            }
        }
        cards
    }

    /// Alias by `faction_id`, else keyword match on the type, else the text
    /// before an en dash, else the fallback label.
    pub fn resolve_faction(&self, row: &StratagemRow) -> Option<String> {
        let faction_id = row.faction_id.trim();
        if !faction_id.is_empty() {
            return Some(
                self.config
                    .faction_aliases
                    .get(faction_id)
                    .cloned()
                    .unwrap_or_else(|| faction_id.to_string()),
            );
        }

        let stratagem_type = row.stratagem_type.trim();
        if !stratagem_type.is_empty() {
            let lowered = stratagem_type.to_lowercase();
            if let Some(rule) = self
                .config
                .faction_keywords
                .iter()
                .find(|rule| lowered.contains(&rule.keyword.to_lowercase()))
            {
                return Some(rule.faction.clone());
            }

            if let Some((prefix, _)) = stratagem_type.split_once('–') {
                let prefix = prefix.trim();
                if prefix.chars().count() > 3 {
                    return Some(prefix.to_string());
                }
            }
        }

        let fallback = self.config.fallback_faction.trim();
        (!fallback.is_empty()).then(|| fallback.to_string())
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }
}

impl Default for CardConverter {
    fn default() -> Self {
        Self::new(ImportConfig::default(), TranslationTable::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardBody;
    use proptest::prelude::*;

    fn row(id: &str, name: &str, stratagem_type: &str, cp_cost: &str, description: &str) -> StratagemRow {
        StratagemRow {
            id: id.into(),
            name: name.into(),
            stratagem_type: stratagem_type.into(),
            cp_cost: cp_cost.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sample_row() {
        let converter = CardConverter::default();
        let cards = converter.convert_row(&row(
            "1",
            "Test Strike",
            "Core",
            "1",
            "WHEN: Your turn TARGET: One unit EFFECT: Deal damage",
        ));

        assert_eq!(cards.len(), 4);
        assert_eq!(
            cards[0].body,
            CardBody::new("Your turn", "One unit", "Deal damage", "")
        );

        let languages: Vec<Language> = cards.iter().map(|c| c.language()).collect();
        assert_eq!(
            languages,
            vec![Language::English, Language::English, Language::Russian, Language::Russian]
        );

        let ids: Vec<&str> = cards.iter().filter_map(|c| c.id.as_deref()).collect();
        assert_eq!(ids, vec!["1_en_1", "1_en_2", "1_ru_1", "1_ru_2"]);

        assert_eq!(cards[2].body.when, "Ваш ход");
        assert_eq!(cards[0].faction.as_deref(), Some("Core Stratagems"));
        assert_eq!(cards[0].color, "#2196f3");
    }

    #[test]
    fn test_expensive_row_gets_one_copy_per_language() {
        let cards = CardConverter::default().convert_row(&row("7", "Heroic Intervention", "Core", "2", ""));
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].language(), Language::English);
        assert_eq!(cards[1].language(), Language::Russian);
        assert_eq!(cards[0].color, "#f44336");
    }

    #[test]
    fn test_non_numeric_cost_is_zero() {
        let cards = CardConverter::default().convert_row(&row("", "Mystery", "", "1-2", ""));
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].cp(), 0);
        assert_eq!(cards[0].color, "#4caf50");
        assert!(cards[0].id.is_none());
    }

    #[test]
    fn test_empty_table_keeps_russian_text() {
        let converter = CardConverter::new(ImportConfig::default(), TranslationTable::new());
        let cards = converter.convert_row(&row("2", "Grenade", "Core", "1", "EFFECT: Your turn"));
        assert_eq!(cards[2].title, "Grenade");
        assert_eq!(cards[2].body.effect, "Your turn");
        assert_eq!(cards[2].language, Some(Language::Russian));
    }

    #[test]
    fn test_faction_resolution_order() {
        let converter = CardConverter::default();

        let mut aliased = row("", "A", "Boarding Actions – Epic Deed", "1", "");
        aliased.faction_id = "000010252".into();
        assert_eq!(converter.resolve_faction(&aliased).as_deref(), Some("Challenger"));

        let mut raw_id = row("", "A", "", "1", "");
        raw_id.faction_id = "SM".into();
        assert_eq!(converter.resolve_faction(&raw_id).as_deref(), Some("SM"));

        let keyword = row("", "A", "Lions of the Emperor – Strategic Ploy", "1", "");
        assert_eq!(converter.resolve_faction(&keyword).as_deref(), Some("Adeptus Custodes"));

        let dashed = row("", "A", "Gladius Task Force – Battle Tactic Stratagem", "1", "");
        assert_eq!(converter.resolve_faction(&dashed).as_deref(), Some("Gladius Task Force"));

        let short = row("", "A", "Elf – Battle Tactic", "1", "");
        assert_eq!(converter.resolve_faction(&short).as_deref(), Some("General Stratagems"));
    }

    #[test]
    fn test_empty_fallback_means_no_faction() {
        let config = ImportConfig {
            fallback_faction: String::new(),
            ..Default::default()
        };
        let converter = CardConverter::new(config, TranslationTable::new());
        assert_eq!(converter.resolve_faction(&row("", "A", "", "0", "")), None);
    }

    #[test]
    fn test_purpose_colors() {
        let scheme = ColorScheme::Purpose;
        let mut r = row("", "Grenade", "", "1", "");
        assert_eq!(scheme.color_for(&r, 1), "#d32f2f");

        r.name = "Fire Overwatch".into();
        assert_eq!(scheme.color_for(&r, 1), "#388e3c");

        r.name = "Something".into();
        r.turn = "Opponent's turn".into();
        assert_eq!(scheme.color_for(&r, 1), "#388e3c");

        r.turn = "Your turn".into();
        r.legend = "Command".into();
        assert_eq!(scheme.color_for(&r, 1), "#1976d2");

        r.legend = String::new();
        assert_eq!(scheme.color_for(&r, 1), "#757575");
    }

    proptest! {
        #[test]
        fn prop_cheap_rows_yield_double_copies(name in "[A-Za-z][A-Za-z ]{0,20}", cheap in 0u32..=1, dear in 2u32..10) {
            let converter = CardConverter::default();
            let cheap_cards = converter.convert_row(&row("9", &name, "Core", &cheap.to_string(), ""));
            let dear_cards = converter.convert_row(&row("9", &name, "Core", &dear.to_string(), ""));
            prop_assert_eq!(cheap_cards.len(), 2 * dear_cards.len());
            prop_assert_eq!(dear_cards.len(), 2);
        }
    }
}
