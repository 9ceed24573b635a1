//! CSV export → typed rows → card deck

pub mod convert;
pub mod csv_reader;
pub mod description;

pub use convert::{CardConverter, ColorScheme};
pub use csv_reader::{read_stratagems, read_stratagems_from, ImportStats};
pub use description::{clean_html, parse_description};

/// Cost column: a plain run of ASCII digits, anything else is 0.
pub fn parse_cp_cost(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    raw.parse().unwrap_or(0)
}
