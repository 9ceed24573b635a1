use crate::models::{copies_for_cp, CardDeck, Language};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// All cards sharing one base id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityGroup {
    pub base_id: String,
    pub title: String,
    pub cp: u32,
    pub count: usize,
    pub english: usize,
    pub russian: usize,
}

impl ParityGroup {
    /// Two languages times the copy rule.
    pub fn expected(&self) -> usize {
        2 * copies_for_cp(self.cp)
    }

    pub fn is_odd(&self) -> bool {
        self.count % 2 != 0
    }

    pub fn is_balanced(&self) -> bool {
        self.english == self.russian
    }
}

/// Copy-count consistency of a converted deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParityReport {
    /// In first-appearance order
    pub groups: Vec<ParityGroup>,
    /// Cards without an id
    pub unidentified: usize,
}

impl ParityReport {
    pub fn check(deck: &CardDeck) -> Self {
        let mut groups: Vec<ParityGroup> = Vec::new();
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut unidentified = 0;

        for card in deck {
            let Some(base_id) = card.base_id() else {
                unidentified += 1;
                continue;
            };

            let slot = *index.entry(base_id).or_insert_with(|| {
                groups.push(ParityGroup {
                    base_id: base_id.to_string(),
                    title: card.title.clone(),
                    cp: card.cp(),
                    count: 0,
                    english: 0,
                    russian: 0,
                });
                groups.len() - 1
            });

            let group = &mut groups[slot];
            group.count += 1;
            match card.language() {
                Language::English => group.english += 1,
                Language::Russian => group.russian += 1,
            }
        }

        Self {
            groups,
            unidentified,
        }
    }

    pub fn odd_counts(&self) -> impl Iterator<Item = &ParityGroup> {
        self.groups.iter().filter(|g| g.is_odd())
    }

    pub fn violations(&self) -> impl Iterator<Item = &ParityGroup> {
        self.groups.iter().filter(|g| g.count != g.expected())
    }

    pub fn language_imbalances(&self) -> impl Iterator<Item = &ParityGroup> {
        self.groups.iter().filter(|g| !g.is_balanced())
    }

    /// Group size → number of groups with that size.
    pub fn count_distribution(&self) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for group in &self.groups {
            *distribution.entry(group.count).or_insert(0) += 1;
        }
        distribution
    }

    pub fn is_consistent(&self) -> bool {
        self.odd_counts().next().is_none()
            && self.violations().next().is_none()
            && self.language_imbalances().next().is_none()
    }
}

impl fmt::Display for ParityReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Unique stratagems: {}", self.groups.len())?;
        if self.unidentified > 0 {
            writeln!(f, "Cards without id (not checked): {}", self.unidentified)?;
        }

        let odd: Vec<&ParityGroup> = self.odd_counts().collect();
        if odd.is_empty() {
            writeln!(f, "\nAll stratagems have an even number of cards")?;
        } else {
            writeln!(f, "\nOdd card counts:")?;
            for g in odd {
                writeln!(f, "  • {} ({} CP): {} cards [ID: {}]", g.title, g.cp, g.count, g.base_id)?;
            }
        }

        let violations: Vec<&ParityGroup> = self.violations().collect();
        if violations.is_empty() {
            writeln!(f, "All stratagems match the expected card count")?;
        } else {
            writeln!(f, "\nUnexpected card counts:")?;
            for g in violations {
                writeln!(
                    f,
                    "  • {} ({} CP): {} instead of {} cards [ID: {}]",
                    g.title,
                    g.cp,
                    g.count,
                    g.expected(),
                    g.base_id
                )?;
            }
        }

        writeln!(f, "\nCard count distribution:")?;
        for (count, groups) in self.count_distribution() {
            writeln!(f, "  {count} cards: {groups} stratagems")?;
        }

        let imbalanced: Vec<&ParityGroup> = self.language_imbalances().collect();
        if imbalanced.is_empty() {
            write!(f, "\nLanguage balance holds for every stratagem")
        } else {
            write!(f, "\nLanguage imbalance:")?;
            for g in imbalanced {
                write!(f, "\n  • {} ({} CP): {} EN, {} RU", g.title, g.cp, g.english, g.russian)?;
            }
            Ok(())
        }
    }
}
