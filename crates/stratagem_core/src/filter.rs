//! Deck filters
//!
//! Every filter leaves the cards it keeps untouched and in input order, and
//! reports each excluded card with the reason it was dropped.

use crate::config::FilterConfig;
use crate::models::{Card, CardDeck};
use rustc_hash::{FxHashMap, FxHashSet};

/// Result of a filter pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: CardDeck,
    pub excluded: Vec<(Card, String)>,
}

impl FilterOutcome {
    fn partition(deck: &CardDeck, mut reason_to_drop: impl FnMut(&Card) -> Option<String>) -> Self {
        let mut kept = Vec::with_capacity(deck.len());
        let mut excluded = Vec::new();
        for card in deck {
            match reason_to_drop(card) {
                Some(reason) => excluded.push((card.clone(), reason)),
                None => kept.push(card.clone()),
            }
        }
        Self {
            kept: CardDeck::new(kept),
            excluded,
        }
    }

    /// Excluded card counts grouped by reason, most frequent first.
    pub fn reasons(&self) -> Vec<(String, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for (_, reason) in &self.excluded {
            *counts.entry(reason.as_str()).or_default() += 1;
        }
        let mut reasons: Vec<(String, usize)> =
            counts.into_iter().map(|(r, n)| (r.to_string(), n)).collect();
        reasons.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        reasons
    }
}

/// Drops special game-mode stratagems.
#[derive(Debug, Clone)]
pub struct ModeFilter {
    excluded_modes: Vec<String>,
    name_keywords: Vec<String>,
}

impl ModeFilter {
    pub fn new(excluded_modes: Vec<String>, name_keywords: Vec<String>) -> Self {
        Self {
            excluded_modes,
            name_keywords: name_keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.excluded_modes.clone(), config.excluded_name_keywords.clone())
    }

    /// Why `card` should be dropped, if it should.
    pub fn exclusion_reason(&self, card: &Card) -> Option<String> {
        let stratagem_type = card.stratagem_type.as_deref().unwrap_or("");
        if let Some(mode) = self
            .excluded_modes
            .iter()
            .find(|mode| !mode.is_empty() && stratagem_type.contains(mode.as_str()))
        {
            return Some(format!("Special mode: {mode}"));
        }

        let title = card.title.to_lowercase();
        self.name_keywords
            .iter()
            .find(|keyword| !keyword.is_empty() && title.contains(keyword.as_str()))
            .map(|keyword| format!("Special mode in title: {keyword}"))
    }

    pub fn apply(&self, deck: &CardDeck) -> FilterOutcome {
        FilterOutcome::partition(deck, |card| self.exclusion_reason(card))
    }
}

impl Default for ModeFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// Exact-name faction filter.
///
/// A card without a faction never matches a name, so `Exclude` keeps it and
/// `Allow` drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactionFilter {
    Exclude(FxHashSet<String>),
    Allow(FxHashSet<String>),
}

impl FactionFilter {
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FactionFilter::Exclude(names.into_iter().map(Into::into).collect())
    }

    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FactionFilter::Allow(names.into_iter().map(Into::into).collect())
    }

    fn exclusion_reason(&self, card: &Card) -> Option<String> {
        let listed = card
            .faction
            .as_deref()
            .map(|faction| self.names().contains(faction))
            .unwrap_or(false);

        match self {
            FactionFilter::Exclude(_) if listed => Some(format!("Excluded faction: {}", card.faction_name())),
            FactionFilter::Allow(_) if !listed => Some(format!(
                "Faction not allowed: {}",
                card.faction.as_deref().unwrap_or("(none)")
            )),
            _ => None,
        }
    }

    fn names(&self) -> &FxHashSet<String> {
        match self {
            FactionFilter::Exclude(names) | FactionFilter::Allow(names) => names,
        }
    }

    pub fn apply(&self, deck: &CardDeck) -> FilterOutcome {
        FilterOutcome::partition(deck, |card| self.exclusion_reason(card))
    }
}

/// Keeps only cards whose stratagem type starts with `Core`.
pub fn core_only(deck: &CardDeck) -> FilterOutcome {
    FilterOutcome::partition(deck, |card| {
        let is_core = card
            .stratagem_type
            .as_deref()
            .map(|t| t.trim_start().starts_with("Core"))
            .unwrap_or(false);
        (!is_core).then(|| "Not a Core stratagem".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBody, Cost};
    use proptest::prelude::*;

    fn card(title: &str, faction: Option<&str>, stratagem_type: Option<&str>) -> Card {
        let mut card = Card::new(title, Cost::cp(1), CardBody::default());
        card.faction = faction.map(str::to_string);
        card.stratagem_type = stratagem_type.map(str::to_string);
        card
    }

    #[test]
    fn test_mode_filter_by_type_and_title() {
        let deck = CardDeck::new(vec![
            card("Command Re-roll", None, Some("Core – Battle Tactic Stratagem")),
            card("Seize the Deck", None, Some("Boarding Actions – Strategic Ploy")),
            card("Crusade Relic", None, Some("Faction – Wargear")),
            card("Insane Bravery", None, None),
        ]);

        let outcome = ModeFilter::default().apply(&deck);
        let kept: Vec<&str> = outcome.kept.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(kept, vec!["Command Re-roll", "Insane Bravery"]);
        assert_eq!(outcome.excluded[0].1, "Special mode: Boarding Actions");
        assert_eq!(outcome.excluded[1].1, "Special mode in title: crusade");
    }

    #[test]
    fn test_mode_keywords_in_type_are_case_sensitive() {
        let filter = ModeFilter::new(vec!["Kill Team".into()], vec![]);
        assert!(filter.exclusion_reason(&card("A", None, Some("kill team"))).is_none());
        assert!(filter.exclusion_reason(&card("A", None, Some("Kill Team – Ploy"))).is_some());
    }

    #[test]
    fn test_faction_exclude_keeps_unlisted_and_none() {
        let deck = CardDeck::new(vec![
            card("A", Some("Orks"), None),
            card("B", Some("Tyranids"), None),
            card("C", None, None),
            card("D", Some("Tyranids Extra"), None),
        ]);

        let outcome = FactionFilter::exclude(["Tyranids"]).apply(&deck);
        let kept: Vec<&str> = outcome.kept.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(kept, vec!["A", "C", "D"]);
        assert_eq!(outcome.reasons(), vec![("Excluded faction: Tyranids".to_string(), 1)]);
    }

    #[test]
    fn test_faction_allow() {
        let deck = CardDeck::new(vec![
            card("A", Some("Orks"), None),
            card("B", Some("Necrons"), None),
            card("C", None, None),
        ]);

        let outcome = FactionFilter::allow(["Necrons"]).apply(&deck);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept.cards[0].title, "B");
        assert_eq!(outcome.excluded.len(), 2);
    }

    #[test]
    fn test_core_only() {
        let deck = CardDeck::new(vec![
            card("A", None, Some("Core – Epic Deed")),
            card("B", None, Some("Gladius – Core-ish")),
            card("C", None, None),
        ]);
        let outcome = core_only(&deck);
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.kept.cards[0].title, "A");
    }

    proptest! {
        #[test]
        fn prop_exclusion_removes_exactly_listed(
            factions in proptest::collection::vec(prop_oneof![
                Just(Some("Orks")), Just(Some("Necrons")), Just(Some("Aeldari")), Just(None::<&str>)
            ], 0..40),
            listed in proptest::sample::subsequence(vec!["Orks", "Necrons", "Aeldari"], 0..=3),
        ) {
            let deck: CardDeck = factions
                .iter()
                .enumerate()
                .map(|(i, f)| card(&format!("card {i}"), *f, None))
                .collect();

            let outcome = FactionFilter::exclude(listed.iter().copied()).apply(&deck);

            let expected: Vec<&Card> = deck
                .iter()
                .filter(|c| !c.faction.as_deref().map(|f| listed.contains(&f)).unwrap_or(false))
                .collect();
            let kept: Vec<&Card> = outcome.kept.iter().collect();
            prop_assert_eq!(kept, expected);
            prop_assert_eq!(outcome.kept.len() + outcome.excluded.len(), deck.len());
        }
    }
}
