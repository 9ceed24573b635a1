//! Pipeline configuration
//!
//! One JSON document drives every pass. Every field has a default, so an
//! empty object (`{}`) is a valid config and reproduces the stock behaviour.

use crate::color::Rgb;
use crate::error::{open_error, CoreError, Result};
use crate::import::ColorScheme;
use crate::layout::PageSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

/// Environment variable naming a default config file.
pub const CONFIG_PATH_ENV: &str = "STRATAGEM_CONFIG_PATH";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub import: ImportConfig,
    pub filter: FilterConfig,
    pub stats: StatsConfig,
    pub render: RenderConfig,
    pub images: ImageConfig,
}

/// Substring rule: when `keyword` occurs in the stratagem type, the card
/// belongs to `faction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionKeyword {
    pub keyword: String,
    pub faction: String,
}

impl FactionKeyword {
    fn new(keyword: &str, faction: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            faction: faction.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// `faction_id` → display name
    pub faction_aliases: BTreeMap<String, String>,
    /// Checked in order, case-insensitively, against the stratagem type
    pub faction_keywords: Vec<FactionKeyword>,
    /// Faction for rows nothing else resolves; empty means none
    pub fallback_faction: String,
    pub color_scheme: ColorScheme,
    /// JSON object file of English → Russian substitutions
    pub translation_table: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let faction_aliases = [
            ("000009218", "Boarding Actions"),
            ("000010252", "Challenger"),
            ("000008335", "Core Stratagems"),
        ]
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();

        let faction_keywords = vec![
            FactionKeyword::new("Auric Champions", "Adeptus Custodes"),
            FactionKeyword::new("Lions of the Emperor", "Adeptus Custodes"),
            FactionKeyword::new("Skitarii Hunter Cohort", "Adeptus Mechanicus"),
            FactionKeyword::new("Armoured Warhost", "Adeptus Mechanicus"),
            FactionKeyword::new("Librarius Conclave", "Adeptus Astartes"),
            FactionKeyword::new("Champions of Fenris", "Space Wolves"),
            FactionKeyword::new("Saga of the Bold", "Space Wolves"),
            FactionKeyword::new("Bringers of Flame", "Imperial Fists"),
            FactionKeyword::new("Lions of", "Dark Angels"),
            FactionKeyword::new("Blood Legion", "Blood Angels"),
            FactionKeyword::new("Scintillating Legion", "Grey Knights"),
            FactionKeyword::new("Lords of Dread", "Chaos Space Marines"),
            FactionKeyword::new("Creations of Bile", "Chaos Space Marines"),
            FactionKeyword::new("Goretrack Onslaught", "Khorne"),
            FactionKeyword::new("Ghosts of the Webway", "Aeldari"),
            FactionKeyword::new("Infestation Swarm", "Tyranids"),
            FactionKeyword::new("Boarding Actions", "Boarding Actions"),
            FactionKeyword::new("Challenger", "Challenger"),
            FactionKeyword::new("Banishers", "Daemon Hunters"),
            FactionKeyword::new("Questoris Companions", "Imperial Knights"),
            FactionKeyword::new("Core", "Core Stratagems"),
        ];

        Self {
            faction_aliases,
            faction_keywords,
            fallback_faction: "General Stratagems".to_string(),
            color_scheme: ColorScheme::Cost,
            translation_table: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Matched case-sensitively inside the stratagem type
    pub excluded_modes: Vec<String>,
    /// Matched against the lowercased title
    pub excluded_name_keywords: Vec<String>,
    /// Exact faction names removed by `filter-factions`
    pub excluded_factions: Vec<String>,
    /// Exact faction names kept by `filter-factions --allow`
    pub allowed_factions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_modes: strings(&[
                "Boarding Actions",
                "Combat Patrol",
                "Crusade",
                "Challenger",
                "Kill Team",
                "Narrative",
                "Open Play",
                "Matched Play",
            ]),
            excluded_name_keywords: strings(&["boarding", "crusade", "narrative"]),
            excluded_factions: strings(&[
                "Adeptus Mechanicus",
                "Astra Militarum",
                "Agents of the Imperium",
                "Adepta Sororitas",
                "Emperor's Children",
                "Genestealer Cults",
                "Leagues of Votann",
                "Questoris Imperialis",
                "Questoris Traitoris",
                "T'au Empire",
                "Tyranids",
                "World Eaters",
                "Hammer of the Emperor",
                "Army of Faith",
                "Champions of Faith",
                "Penitent Host",
                "Biosanctic Broodsurge",
                "Final Day",
                "Outlander Claw",
                "Cult Unveiled",
                "Genespawn Onslaught",
                "Xenocreed Congregation",
                "Brood Brother Auxilia",
                "Brandfast Oathband",
                "Hearthband",
                "Hearthfyre Arsenal",
                "Needgaârd Oathband",
                "Hearthfire Strike",
                "Void Salvagers",
                "Imperial Knights",
                "Gate Warden Lance",
                "Questor Forgepact",
                "Spearhead-At-Arms",
                "Valourstrike Lance",
                "Houndpack Lance",
                "Infernal Lance",
                "Traitoris Lance",
                "Iconoclast Fiefdom",
                "Auxiliary Cadre",
                "Experimental Prototype Cadre",
                "Kauyon",
                "Mont'ka",
                "Retaliation Cadre",
                "Kroot Hunting Pack",
                "Kroot Raiding Party",
                "Starfire Cadre",
                "Crusher Stampede",
                "Subterranean Assault",
                "Synaptic Nexus",
                "Warrior Bioform Onslaught",
                "Assimilation Swarm",
                "Invasion Fleet",
                "Unending Swarm",
                "Vanguard Onslaught",
                "Boarding Swarm",
                "Biotide",
                "Tyranid Attack",
                "Berzerker Warband",
                "Boarding Butchers",
                "Cult of Blood",
                "Skullsworn",
                "Cohort Cybernetica",
                "Data-Psalm Conclave",
                "Haloscreed Battle Clade",
                "Explorator Maniple",
                "Electromartyrs",
                "Machine Cult",
                "Response Clade",
            ]),
            allowed_factions: strings(&[
                "Core Stratagems",
                "Adeptus Astartes",
                "Space Marines",
                "Adeptus Custodes",
                "Grey Knights",
                "Chaos Space Marines",
                "Death Guard",
                "Aeldari",
                "Necrons",
                "Orks",
            ]),
        }
    }
}

/// Named army group used by the group breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionGroup {
    pub name: String,
    pub factions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Checked in order; the first group listing a faction wins
    pub faction_groups: Vec<FactionGroup>,
    pub main_type_keywords: Vec<String>,
    pub special_type_keywords: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        let group = |name: &str, factions: &[&str]| FactionGroup {
            name: name.to_string(),
            factions: strings(factions),
        };

        Self {
            faction_groups: vec![
                group(
                    "Imperium",
                    &[
                        "Adeptus Custodes",
                        "Adeptus Astartes",
                        "Space Marines",
                        "Space Wolves",
                        "Blood Angels",
                        "Dark Angels",
                        "Imperial Fists",
                        "Adeptus Mechanicus",
                        "Grey Knights",
                        "Imperial Knights",
                        "Gladius Task Force",
                        "Firestorm Assault Force",
                        "Vanguard Spearhead",
                        "Stormlance Task Force",
                    ],
                ),
                group(
                    "Chaos",
                    &[
                        "Chaos Space Marines",
                        "Death Guard",
                        "Daemon Hunters",
                        "Khorne",
                        "Veterans of the Long War",
                        "Plague Legion",
                        "Virulent Vectorium",
                        "Mortarion's Hammer",
                    ],
                ),
                group(
                    "Aeldari",
                    &[
                        "Aeldari",
                        "Aspect Host",
                        "Guardian Battlehost",
                        "Seer Council",
                        "Windrider Host",
                        "Realspace Raiders",
                    ],
                ),
                group(
                    "Necrons",
                    &[
                        "Necrons",
                        "Awakened Dynasty",
                        "Canoptek Court",
                        "Hypercrypt Legion",
                        "Starshatter Arsenal",
                    ],
                ),
                group(
                    "Orks",
                    &["Orks", "War Horde", "Green Tide", "Kult of Speed", "Dread Mob"],
                ),
                group(
                    "Special/Core",
                    &[
                        "Core Stratagems",
                        "General Stratagems",
                        "Challenger",
                        "Boarding Actions",
                    ],
                ),
            ],
            main_type_keywords: strings(&[
                "Battle Tactic",
                "Epic Deed",
                "Strategic Ploy",
                "Wargear Stratagem",
            ]),
            special_type_keywords: strings(&[
                "Boarding Actions",
                "Combat Patrol",
                "Crusade",
                "Challenger",
                "Kill Team",
            ]),
        }
    }
}

/// Vector badge drawn when a faction has no logo image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStyle {
    pub text: String,
    pub background: String,
    pub foreground: String,
}

impl BadgeStyle {
    fn new(text: &str, background: &str, foreground: &str) -> Self {
        Self {
            text: text.to_string(),
            background: background.to_string(),
            foreground: foreground.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page_size: PageSize,
    pub card_width_pt: f32,
    pub card_height_pt: f32,
    pub gutter_pt: f32,
    /// TTF font with Cyrillic coverage
    pub font_path: Option<PathBuf>,
    pub gradient: bool,
    /// Width of the edge fade, in image pixels
    pub gradient_feather_px: u32,
    pub image_opacity: f32,
    /// Directory holding the files named in `faction_logos`; logos are
    /// only drawn when it is set
    pub logo_dir: Option<PathBuf>,
    pub faction_logos: BTreeMap<String, String>,
    pub faction_badges: BTreeMap<String, BadgeStyle>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let faction_logos = [
            ("General Stratagems", "general.png"),
            ("Boarding Actions", "boarding.png"),
            ("Challenger", "challenger.png"),
            ("Core Stratagems", "core.png"),
            ("Adeptus Astartes", "space_marines.png"),
            ("Space Marines", "space_marines.png"),
            ("Chaos", "chaos.png"),
            ("Chaos Daemons", "chaos.png"),
            ("Imperial Guard", "imperial_guard.png"),
            ("Orks", "orks.png"),
            ("Necrons", "necrons.png"),
            ("Tyranids", "tyranids.png"),
            ("Eldar", "eldar.png"),
            ("Aeldari", "eldar.png"),
            ("Adeptus Custodes", "custodes.png"),
            ("Grey Knights", "grey_knights.png"),
            ("Death Guard", "death_guard.png"),
            ("Questoris Imperialis", "imperial_knights.png"),
        ]
        .into_iter()
        .map(|(faction, file)| (faction.to_string(), file.to_string()))
        .collect();

        let faction_badges = [
            ("General Stratagems", BadgeStyle::new("CORE", "#2c3e50", "#ffffff")),
            ("Core Stratagems", BadgeStyle::new("BASE", "#228b22", "#ffffff")),
            ("Boarding Actions", BadgeStyle::new("BOARD", "#8b0000", "#ffffff")),
            ("Challenger", BadgeStyle::new("CHAL", "#4b0082", "#ffffff")),
            ("Adeptus Astartes", BadgeStyle::new("SM", "#1e40af", "#ffffff")),
            ("Space Marines", BadgeStyle::new("SM", "#1e40af", "#ffffff")),
            ("Chaos", BadgeStyle::new("CHAOS", "#dc2626", "#ffffff")),
            ("Chaos Space Marines", BadgeStyle::new("CHAOS", "#dc2626", "#ffffff")),
            ("Imperial Guard", BadgeStyle::new("IG", "#059669", "#ffffff")),
            ("Orks", BadgeStyle::new("ORKS", "#16a34a", "#000000")),
            ("Necrons", BadgeStyle::new("NEC", "#000000", "#00ff00")),
            ("Tyranids", BadgeStyle::new("TYR", "#7c2d12", "#ffffff")),
            ("Aeldari", BadgeStyle::new("ELD", "#0891b2", "#ffffff")),
            ("Adeptus Custodes", BadgeStyle::new("CUST", "#fbbf24", "#000000")),
            ("Grey Knights", BadgeStyle::new("GK", "#9ca3af", "#ffffff")),
            ("Death Guard", BadgeStyle::new("DG", "#4b5563", "#22c55e")),
            ("Questoris Imperialis", BadgeStyle::new("KNIGHT", "#92400e", "#ffffff")),
        ]
        .into_iter()
        .map(|(faction, style)| (faction.to_string(), style))
        .collect();

        Self {
            page_size: PageSize::Letter,
            card_width_pt: crate::layout::DEFAULT_CARD_WIDTH_PT,
            card_height_pt: crate::layout::DEFAULT_CARD_HEIGHT_PT,
            gutter_pt: crate::layout::DEFAULT_GUTTER_PT,
            font_path: None,
            gradient: true,
            gradient_feather_px: 24,
            image_opacity: 0.85,
            logo_dir: None,
            faction_logos,
            faction_badges,
        }
    }
}

impl RenderConfig {
    /// Resolved logo path for a faction. `None` without a `logo_dir`.
    pub fn logo_path(&self, faction: &str) -> Option<PathBuf> {
        let dir = self.logo_dir.as_ref()?;
        self.faction_logos.get(faction).map(|file| dir.join(file))
    }

    /// Rejects non-positive card geometry, bad opacity and bad badge colours.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("card_width_pt", self.card_width_pt),
            ("card_height_pt", self.card_height_pt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::Config(format!("render.{name} must be positive, got {value}")));
            }
        }
        if !self.gutter_pt.is_finite() || self.gutter_pt < 0.0 {
            return Err(CoreError::Config(format!(
                "render.gutter_pt must be non-negative, got {}",
                self.gutter_pt
            )));
        }
        if !(0.0..=1.0).contains(&self.image_opacity) {
            return Err(CoreError::Config(format!(
                "render.image_opacity must be within 0..=1, got {}",
                self.image_opacity
            )));
        }
        for style in self.faction_badges.values() {
            Rgb::parse(&style.background)?;
            Rgb::parse(&style.foreground)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub cache_dir: PathBuf,
    /// `{width}` and `{height}` are substituted; the query is appended after `?`
    pub search_endpoint: String,
    pub width: u32,
    pub height: u32,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("image_cache"),
            search_endpoint: "https://source.unsplash.com/{width}x{height}/".to_string(),
            width: 400,
            height: 300,
            min_interval_ms: 1000,
            timeout_secs: 10,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| open_error(path, e))?;
        let config = Self::from_json(&json)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Explicit path first, then `STRATAGEM_CONFIG_PATH`, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        Self::load(Path::new(path))
            .map_err(|e| CoreError::Config(format!("from {CONFIG_PATH_ENV}='{path}': {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        if self.images.width == 0 || self.images.height == 0 {
            return Err(CoreError::Config("images.width and images.height must be non-zero".into()));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_is_default() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = PipelineConfig::from_json(
            r#"{ "render": { "page_size": "a4", "gradient": false }, "filter": { "excluded_factions": ["Orks"] } }"#,
        )
        .unwrap();

        assert_eq!(config.render.page_size, PageSize::A4);
        assert!(!config.render.gradient);
        assert_eq!(config.render.image_opacity, 0.85);
        assert_eq!(config.filter.excluded_factions, vec!["Orks".to_string()]);
        assert_eq!(config.filter.excluded_modes.len(), 8);
    }

    #[test]
    fn test_validate_rejects_bad_geometry_and_colors() {
        let mut config = PipelineConfig::default();
        config.render.card_width_pt = 0.0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = PipelineConfig::default();
        config.render.gutter_pt = f32::NAN;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let mut config = PipelineConfig::default();
        config
            .render
            .faction_badges
            .insert("Orks".into(), BadgeStyle::new("ORKS", "green", "#000000"));
        assert!(matches!(config.validate(), Err(CoreError::InvalidColor(_))));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(br##"{ "import": { "color_scheme": "purpose", "fallback_faction": "" } }"##)?;

        let config = PipelineConfig::load(file.path())?;
        assert_eq!(config.import.color_scheme, ColorScheme::Purpose);
        assert!(config.import.fallback_faction.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_reports_invalid_json_as_config_error() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"{ not json")?;
        assert!(matches!(PipelineConfig::load(file.path()), Err(CoreError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_logo_path_joins_logo_dir() {
        let mut render = RenderConfig::default();
        assert_eq!(render.logo_path("Aeldari"), None);

        render.logo_dir = Some(PathBuf::from("faction_logos"));
        assert_eq!(
            render.logo_path("Core Stratagems"),
            Some(PathBuf::from("faction_logos/core.png"))
        );
        assert_eq!(render.logo_path("Unknown"), None);
    }
}
