use super::{fit, percent, NO_FACTION};
use crate::models::CardDeck;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// Title script counts. A title mixing Latin letters and non-ASCII
/// characters counts as mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptCounts {
    pub english: usize,
    pub russian: usize,
    pub mixed: usize,
}

/// Title printed on more than one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTitle {
    pub title: String,
    /// Positions of the cards in the deck
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckStats {
    pub total: usize,
    /// Most common first
    pub by_faction: Vec<(String, usize)>,
    pub by_script: ScriptCounts,
    /// Keyed by the sum of all cost dimensions
    pub by_cost: BTreeMap<u32, usize>,
    /// Most copies first
    pub duplicates: Vec<DuplicateTitle>,
    /// Cards beyond the first of each duplicated title
    pub removable_duplicates: usize,
}

impl DeckStats {
    pub fn collect(deck: &CardDeck) -> Self {
        let mut faction_counts: FxHashMap<&str, usize> = FxHashMap::default();
        let mut title_indices: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        let mut title_order: Vec<&str> = Vec::new();
        let mut by_script = ScriptCounts::default();
        let mut by_cost = BTreeMap::new();

        for (index, card) in deck.iter().enumerate() {
            let faction = card.faction.as_deref().unwrap_or(NO_FACTION);
            *faction_counts.entry(faction).or_default() += 1;
            *by_cost.entry(card.cost.total()).or_insert(0) += 1;

            let has_non_ascii = !card.title.is_ascii();
            let has_latin = card.title.chars().any(|c| c.is_ascii_alphabetic());
            match (has_non_ascii, has_latin) {
                (true, true) => by_script.mixed += 1,
                (true, false) => by_script.russian += 1,
                _ => by_script.english += 1,
            }

            let indices = title_indices.entry(card.title.as_str()).or_default();
            if indices.is_empty() {
                title_order.push(card.title.as_str());
            }
            indices.push(index);
        }

        let mut by_faction: Vec<(String, usize)> = faction_counts
            .into_iter()
            .map(|(f, n)| (f.to_string(), n))
            .collect();
        by_faction.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut duplicates: Vec<DuplicateTitle> = title_order
            .into_iter()
            .filter_map(|title| {
                let indices = title_indices.remove(title)?;
                (indices.len() > 1).then(|| DuplicateTitle {
                    title: title.to_string(),
                    indices,
                })
            })
            .collect();
        // stable: equal counts keep first-appearance order
        duplicates.sort_by(|a, b| b.indices.len().cmp(&a.indices.len()));

        let removable_duplicates = duplicates.iter().map(|d| d.indices.len() - 1).sum();

        Self {
            total: deck.len(),
            by_faction,
            by_script,
            by_cost,
            duplicates,
            removable_duplicates,
        }
    }

    /// Cards left after keeping one card per title.
    pub fn unique_titles(&self) -> usize {
        self.total - self.removable_duplicates
    }
}

impl fmt::Display for DeckStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.total;
        writeln!(f, "Total cards: {total}")?;

        writeln!(f, "\nBy faction:")?;
        writeln!(f, "{}", "-".repeat(50))?;
        for (faction, count) in &self.by_faction {
            writeln!(
                f,
                "{} | {count:>4} cards ({:5.1}%)",
                fit(faction, 25),
                percent(*count, total)
            )?;
        }

        writeln!(f, "\nBy language:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for (label, count) in [
            ("English", self.by_script.english),
            ("Russian", self.by_script.russian),
            ("Mixed", self.by_script.mixed),
        ] {
            writeln!(f, "{label:<12} | {count:>4} cards ({:5.1}%)", percent(count, total))?;
        }

        writeln!(f, "\nBy cost:")?;
        writeln!(f, "{}", "-".repeat(35))?;
        for (cost, count) in &self.by_cost {
            writeln!(f, "CP {cost:<2} | {count:>4} cards ({:5.1}%)", percent(*count, total))?;
        }

        writeln!(f, "\nDuplicates:")?;
        writeln!(f, "{}", "-".repeat(50))?;
        if self.duplicates.is_empty() {
            writeln!(f, "No duplicate titles")?;
        } else {
            writeln!(f, "{} titles appear more than once", self.duplicates.len())?;
            for dup in &self.duplicates {
                let shown: Vec<String> = dup.indices.iter().take(5).map(|i| i.to_string()).collect();
                let more = dup.indices.len().saturating_sub(5);
                write!(f, "  '{}' x{} at [{}]", dup.title, dup.indices.len(), shown.join(", "))?;
                if more > 0 {
                    write!(f, " and {more} more")?;
                }
                writeln!(f)?;
            }
        }
        write!(
            f,
            "Removable duplicates: {} (unique titles: {})",
            self.removable_duplicates,
            self.unique_titles()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Card, CardBody, Cost};

    fn card(title: &str, faction: Option<&str>, cost: Cost) -> Card {
        let mut card = Card::new(title, cost, CardBody::default());
        card.faction = faction.map(str::to_string);
        card
    }

    fn sample() -> CardDeck {
        CardDeck::new(vec![
            card("Grenade", Some("Core Stratagems"), Cost::cp(1)),
            card("Grenade", Some("Core Stratagems"), Cost::cp(1)),
            card("Гранаты", Some("Core Stratagems"), Cost::cp(1)),
            card("Oath Момент", Some("Space Marines"), Cost::cp(2).with("vp", 1)),
            card("Fire Overwatch", None, Cost::new()),
        ])
    }

    #[test]
    fn test_collect_counts() {
        let stats = DeckStats::collect(&sample());

        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_faction[0], ("Core Stratagems".to_string(), 3));
        assert_eq!(stats.by_faction.len(), 3);
        assert_eq!(
            stats.by_script,
            ScriptCounts {
                english: 3,
                russian: 1,
                mixed: 1
            }
        );
        assert_eq!(stats.by_cost.get(&1), Some(&3));
        assert_eq!(stats.by_cost.get(&3), Some(&1));
        assert_eq!(stats.by_cost.get(&0), Some(&1));
    }

    #[test]
    fn test_duplicates() {
        let stats = DeckStats::collect(&sample());
        assert_eq!(stats.duplicates.len(), 1);
        assert_eq!(stats.duplicates[0].indices, vec![0, 1]);
        assert_eq!(stats.removable_duplicates, 1);
        assert_eq!(stats.unique_titles(), 4);
    }

    #[test]
    fn test_display_mentions_sections() {
        let text = DeckStats::collect(&sample()).to_string();
        assert!(text.contains("Total cards: 5"));
        assert!(text.contains("'Grenade' x2 at [0, 1]"));
        assert!(text.contains(NO_FACTION));
    }

    #[test]
    fn test_huge_cost_lands_in_top_bucket() {
        let deck = CardDeck::new(vec![card("Overcharge", None, Cost::cp(u32::MAX).with("vp", 1))]);
        let stats = DeckStats::collect(&deck);
        assert_eq!(stats.by_cost.get(&u32::MAX), Some(&1));
    }

    #[test]
    fn test_empty_deck() {
        let stats = DeckStats::collect(&CardDeck::default());
        assert_eq!(stats.total, 0);
        assert!(stats.to_string().contains("No duplicate titles"));
    }
}
