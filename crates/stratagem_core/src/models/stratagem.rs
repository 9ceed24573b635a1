use serde::{Deserialize, Serialize};

/// One raw record of the pipe-delimited stratagem export.
///
/// Column names follow the export header; any missing column reads as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StratagemRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub stratagem_type: String,
    pub cp_cost: String,
    pub description: String,
    pub faction_id: String,
    pub turn: String,
    pub phase: String,
    pub legend: String,
    pub detachment: String,
}

impl StratagemRow {
    /// Raw CP text parsed as digits only; anything else counts as 0.
    pub fn cp(&self) -> u32 {
        crate::import::parse_cp_cost(&self.cp_cost)
    }

    pub fn is_core(&self) -> bool {
        self.stratagem_type.trim_start().starts_with("Core")
    }
}
