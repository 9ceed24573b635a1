use super::percent;
use crate::config::StatsConfig;
use crate::models::StratagemRow;
use rustc_hash::FxHashMap;
use std::fmt;

const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    MainGame,
    SpecialMode,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub stratagem_type: String,
    pub count: usize,
    /// Up to three stratagem names of this type
    pub examples: Vec<String>,
    pub category: TypeCategory,
}

/// Stratagem type analysis of a raw export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBreakdown {
    /// Most common type first
    pub entries: Vec<TypeEntry>,
}

impl TypeBreakdown {
    /// A type is main-game when it contains a main keyword, else special
    /// when it contains a special keyword, else unknown.
    pub fn collect(rows: &[StratagemRow], main_keywords: &[String], special_keywords: &[String]) -> Self {
        let mut entries: Vec<TypeEntry> = Vec::new();
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();

        for row in rows {
            let stratagem_type = row.stratagem_type.trim();
            let slot = *index.entry(stratagem_type).or_insert_with(|| {
                entries.push(TypeEntry {
                    stratagem_type: stratagem_type.to_string(),
                    count: 0,
                    examples: Vec::new(),
                    category: categorize(stratagem_type, main_keywords, special_keywords),
                });
                entries.len() - 1
            });

            let entry = &mut entries[slot];
            entry.count += 1;
            if entry.examples.len() < MAX_EXAMPLES {
                entry.examples.push(row.name.trim().to_string());
            }
        }

        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries }
    }

    pub fn from_config(rows: &[StratagemRow], config: &StatsConfig) -> Self {
        Self::collect(rows, &config.main_type_keywords, &config.special_type_keywords)
    }

    pub fn in_category(&self, category: TypeCategory) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn total(&self, category: TypeCategory) -> usize {
        self.in_category(category).map(|e| e.count).sum()
    }

    pub fn grand_total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

fn categorize(stratagem_type: &str, main: &[String], special: &[String]) -> TypeCategory {
    if main.iter().any(|k| stratagem_type.contains(k.as_str())) {
        TypeCategory::MainGame
    } else if special.iter().any(|k| stratagem_type.contains(k.as_str())) {
        TypeCategory::SpecialMode
    } else {
        TypeCategory::Unknown
    }
}

impl fmt::Display for TypeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Unique types: {}", self.entries.len())?;

        for (category, heading, total_label) in [
            (TypeCategory::MainGame, "Main game stratagems:", "Main total"),
            (TypeCategory::SpecialMode, "Special game modes:", "Special total"),
            (TypeCategory::Unknown, "Unclassified:", "Unclassified total"),
        ] {
            writeln!(f, "\n{heading}")?;
            for entry in self.in_category(category) {
                let label = if entry.stratagem_type.is_empty() {
                    "(no type)"
                } else {
                    entry.stratagem_type.as_str()
                };
                writeln!(f, "  {:3}: {label}", entry.count)?;
                if !entry.examples.is_empty() {
                    writeln!(f, "       e.g. {}", entry.examples.iter().take(2).cloned().collect::<Vec<_>>().join(", "))?;
                }
            }
            writeln!(f, "{total_label}: {}", self.total(category))?;
        }

        let total = self.grand_total();
        writeln!(f, "\nTotal stratagems: {total}")?;
        writeln!(
            f,
            "Main: {} ({:.1}%)",
            self.total(TypeCategory::MainGame),
            percent(self.total(TypeCategory::MainGame), total)
        )?;
        write!(
            f,
            "Special: {} ({:.1}%)",
            self.total(TypeCategory::SpecialMode),
            percent(self.total(TypeCategory::SpecialMode), total)
        )
    }
}
