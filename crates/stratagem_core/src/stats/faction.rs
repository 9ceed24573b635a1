use super::{fit, percent, NO_FACTION};
use crate::config::FactionGroup;
use crate::models::{CardDeck, Language};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;

const UNASSIGNED: &str = "Unassigned";

/// Per-faction card counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactionRow {
    pub faction: String,
    pub total: usize,
    pub english: usize,
    pub russian: usize,
    /// Cards costing 0 or 1 CP
    pub cheap: usize,
    pub expensive: usize,
    /// Cards per CP value
    pub by_cp: BTreeMap<u32, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactionBreakdown {
    pub total_cards: usize,
    /// Largest faction first
    pub rows: Vec<FactionRow>,
}

impl FactionBreakdown {
    pub fn collect(deck: &CardDeck) -> Self {
        let mut rows: Vec<FactionRow> = Vec::new();
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();

        for card in deck {
            let faction = card.faction.as_deref().unwrap_or(NO_FACTION);
            let slot = *index.entry(faction).or_insert_with(|| {
                rows.push(FactionRow {
                    faction: faction.to_string(),
                    ..Default::default()
                });
                rows.len() - 1
            });

            let row = &mut rows[slot];
            let cp = card.cp();
            row.total += 1;
            match card.language() {
                Language::English => row.english += 1,
                Language::Russian => row.russian += 1,
            }
            if card.is_cheap() {
                row.cheap += 1;
            } else {
                row.expensive += 1;
            }
            *row.by_cp.entry(cp).or_insert(0) += 1;
        }

        // stable: equal totals keep first-appearance order
        rows.sort_by(|a, b| b.total.cmp(&a.total));

        Self {
            total_cards: deck.len(),
            rows,
        }
    }

    fn sum(&self, field: impl Fn(&FactionRow) -> usize) -> usize {
        self.rows.iter().map(field).sum()
    }

    /// Estimated distinct stratagems: four cards per cheap stratagem, two
    /// per expensive one.
    pub fn estimated_unique(&self) -> usize {
        self.sum(|r| r.cheap) / 4 + self.sum(|r| r.expensive) / 2
    }

    /// Cards per distinct stratagem; `None` for an empty deck.
    pub fn duplication_coefficient(&self) -> Option<f64> {
        let unique = self.estimated_unique();
        (unique > 0).then(|| self.total_cards as f64 / unique as f64)
    }
}

impl fmt::Display for FactionBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.total_cards;
        writeln!(f, "Total cards: {total}")?;
        writeln!(f, "{}", "-".repeat(80))?;
        writeln!(
            f,
            "{} | {:<6} | {:<4} | {:<4} | {:<6} | {:<6} | CP DISTRIBUTION",
            fit("FACTION", 25),
            "TOTAL",
            "EN",
            "RU",
            "CP<=1",
            "CP>=2"
        )?;
        writeln!(f, "{}", "-".repeat(80))?;
        for row in &self.rows {
            let distribution: Vec<String> = row
                .by_cp
                .iter()
                .map(|(cp, n)| format!("CP{cp}:{n}"))
                .collect();
            writeln!(
                f,
                "{} | {:<6} | {:<4} | {:<4} | {:<6} | {:<6} | {}",
                fit(&row.faction, 25),
                row.total,
                row.english,
                row.russian,
                row.cheap,
                row.expensive,
                fit(&distribution.join(" "), 30).trim_end()
            )?;
        }
        writeln!(f, "{}", "-".repeat(80))?;

        let english = self.sum(|r| r.english);
        let russian = self.sum(|r| r.russian);
        let cheap = self.sum(|r| r.cheap);
        let expensive = self.sum(|r| r.expensive);
        writeln!(f, "Factions: {}", self.rows.len())?;
        writeln!(f, "English: {english} ({:.1}%)", percent(english, total))?;
        writeln!(f, "Russian: {russian} ({:.1}%)", percent(russian, total))?;
        writeln!(f, "CP 0-1: {cheap} ({:.1}%)", percent(cheap, total))?;
        writeln!(f, "CP 2+: {expensive} ({:.1}%)", percent(expensive, total))?;
        write!(f, "Estimated unique stratagems: ~{}", self.estimated_unique())?;
        if let Some(coefficient) = self.duplication_coefficient() {
            write!(f, "\nDuplication coefficient: {coefficient:.2}")?;
        }
        Ok(())
    }
}

/// Card counts per army group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactionGroups {
    pub total_cards: usize,
    /// Largest group first; `Unassigned` collects unmatched factions
    pub groups: Vec<(String, usize)>,
    /// Factions that matched no group, with card counts
    pub unassigned_factions: Vec<(String, usize)>,
}

impl FactionGroups {
    pub fn collect(deck: &CardDeck, groups: &[FactionGroup]) -> Self {
        let mut counts: Vec<(String, usize)> = groups.iter().map(|g| (g.name.clone(), 0)).collect();
        let mut unassigned = 0;
        let mut unassigned_factions: BTreeMap<String, usize> = BTreeMap::new();

        for card in deck {
            let faction = card.faction.as_deref().unwrap_or(NO_FACTION);
            match groups
                .iter()
                .position(|g| g.factions.iter().any(|name| name == faction))
            {
                Some(i) => counts[i].1 += 1,
                None => {
                    unassigned += 1;
                    *unassigned_factions.entry(faction.to_string()).or_insert(0) += 1;
                }
            }
        }

        counts.retain(|(_, n)| *n > 0);
        if unassigned > 0 {
            counts.push((UNASSIGNED.to_string(), unassigned));
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mut unassigned_factions: Vec<(String, usize)> = unassigned_factions.into_iter().collect();
        unassigned_factions.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            total_cards: deck.len(),
            groups: counts,
            unassigned_factions,
        }
    }

    pub fn assigned(&self) -> usize {
        self.groups
            .iter()
            .filter(|(name, _)| name != UNASSIGNED)
            .map(|(_, n)| n)
            .sum()
    }
}

impl fmt::Display for FactionGroups {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total = self.total_cards;
        writeln!(f, "Total cards: {total}")?;
        for (group, count) in &self.groups {
            writeln!(f, "{group}: {count} cards ({:.1}%)", percent(*count, total))?;
        }
        write!(
            f,
            "Assigned to groups: {} ({:.1}%)",
            self.assigned(),
            percent(self.assigned(), total)
        )?;
        if !self.unassigned_factions.is_empty() {
            write!(f, "\nUnassigned factions:")?;
            for (faction, count) in &self.unassigned_factions {
                write!(f, "\n  {faction}: {count}")?;
            }
        }
        Ok(())
    }
}
