//! Duplicate removal
//!
//! Cards are grouped by (title, language). The first card of each group is
//! kept and then expanded again with the copy rule, so a deck that went
//! through several conversion passes ends up with exactly the right number
//! of copies.

use crate::models::{copies_for_cp, Card, CardDeck, Language};
use rustc_hash::FxHashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub input_cards: usize,
    pub unique_groups: usize,
    /// Input cards that were not the first of their group
    pub removed_duplicates: usize,
    /// Groups costing 0 or 1 CP (two copies each)
    pub cheap_groups: usize,
    pub expensive_groups: usize,
    pub output_cards: usize,
}

pub fn dedup_deck(deck: &CardDeck) -> (CardDeck, DedupStats) {
    let mut index: FxHashMap<(&str, Language), usize> = FxHashMap::default();
    let mut firsts: Vec<&Card> = Vec::new();

    for card in deck {
        let key = (card.title.as_str(), card.language());
        if !index.contains_key(&key) {
            index.insert(key, firsts.len());
            firsts.push(card);
        }
    }

    let mut stats = DedupStats {
        input_cards: deck.len(),
        unique_groups: firsts.len(),
        removed_duplicates: deck.len() - firsts.len(),
        ..Default::default()
    };

    let mut cards = Vec::new();
    for first in firsts {
        let copies = copies_for_cp(first.cp());
        if first.is_cheap() {
            stats.cheap_groups += 1;
        } else {
            stats.expensive_groups += 1;
        }

        let base_id = first.base_id().map(str::to_string);
        for n in 1..=copies {
            let mut card = first.clone();
            if let Some(base) = &base_id {
                card.id = Some(format!("{base}_{}_{n}", first.language().code()));
            }
            cards.push(card);
        }
    }
    stats.output_cards = cards.len();

    tracing::info!(
        input = stats.input_cards,
        groups = stats.unique_groups,
        output = stats.output_cards,
        "deduplicated deck"
    );

    (CardDeck::new(cards), stats)
}

impl fmt::Display for DedupStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Input cards:        {}", self.input_cards)?;
        writeln!(f, "Unique cards:       {}", self.unique_groups)?;
        writeln!(f, "Duplicates removed: {}", self.removed_duplicates)?;
        writeln!(f, "  0-1 CP (x2):      {}", self.cheap_groups)?;
        writeln!(f, "  2+ CP (x1):       {}", self.expensive_groups)?;
        write!(f, "Output cards:       {}", self.output_cards)
    }
}
