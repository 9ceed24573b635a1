//! Deck and export statistics
//!
//! Every report is plain data plus a `Display` impl rendering the table the
//! CLI prints.

mod deck;
mod faction;
mod parity;
mod types;

pub use deck::{DeckStats, DuplicateTitle, ScriptCounts};
pub use faction::{FactionBreakdown, FactionGroups, FactionRow};
pub use parity::{ParityGroup, ParityReport};
pub use types::{TypeBreakdown, TypeCategory, TypeEntry};

/// Label used for cards without a faction.
pub const NO_FACTION: &str = "Unknown faction";

pub(crate) fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Pads or truncates to a fixed display width, counting chars.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        format!("{text}{}", " ".repeat(width - len))
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}
