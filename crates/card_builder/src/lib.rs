//! Card Builder Library
//!
//! Pipeline passes over files: CSV → cards JSON → filtered/deduplicated
//! JSON → PDF. Each pass reads one file, writes one file and returns a
//! [`PassMetadata`] with a SHA256 checksum of what it wrote.

pub mod image_search;
pub mod pdf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use stratagem_core::{
    core_only, dedup_deck, read_stratagems, CardConverter, CardDeck, DedupStats, FactionFilter,
    FilterOutcome, ImportStats, ModeFilter, PipelineConfig, StratagemRow,
};

pub use image_search::{ImageSearcher, RateLimiter};
pub use pdf::{render_deck, Fonts, ImageSource, PdfCanvas, RenderOptions, RenderSummary};

/// Record of one pipeline pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassMetadata {
    /// Pass name, e.g. `"convert"`
    pub pass: String,
    pub input: String,
    pub output: String,
    /// Rows for `convert`, cards otherwise
    pub records_in: usize,
    pub cards_out: usize,
    /// SHA256 of the output file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
}

impl PassMetadata {
    fn new(pass: &str, input: &Path, output: &Path, records_in: usize, cards_out: usize) -> Result<Self> {
        Ok(Self {
            pass: pass.to_string(),
            input: input.display().to_string(),
            output: output.display().to_string(),
            records_in,
            cards_out,
            checksum: file_checksum(output)?,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write metadata: {}", path.display()))?;
        Ok(())
    }
}

/// SHA256 of a file's bytes, hex encoded.
pub fn file_checksum(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn load_deck(path: &Path) -> Result<CardDeck> {
    CardDeck::load(path).with_context(|| format!("Failed to load cards: {}", path.display()))
}

fn save_deck(deck: &CardDeck, path: &Path) -> Result<()> {
    deck.save(path)
        .with_context(|| format!("Failed to write cards: {}", path.display()))
}

pub fn load_rows(path: &Path) -> Result<(Vec<StratagemRow>, ImportStats)> {
    read_stratagems(path).with_context(|| format!("Failed to read stratagems: {}", path.display()))
}

/// CSV export → bilingual cards JSON.
pub fn convert_csv(input: &Path, output: &Path, config: &PipelineConfig) -> Result<(PassMetadata, ImportStats)> {
    let (rows, stats) = load_rows(input)?;
    let converter = CardConverter::from_config(config).context("Failed to load translation table")?;
    let deck = converter.convert(&rows);
    save_deck(&deck, output)?;

    let meta = PassMetadata::new("convert", input, output, rows.len(), deck.len())?;
    Ok((meta, stats))
}

/// Outcome of a filter pass
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub metadata: PassMetadata,
    /// Excluded card counts by reason, most frequent first
    pub reasons: Vec<(String, usize)>,
}

impl FilterReport {
    pub fn excluded(&self) -> usize {
        self.reasons.iter().map(|(_, n)| n).sum()
    }
}

fn filter_pass(
    pass: &str,
    input: &Path,
    output: &Path,
    filter: impl FnOnce(&CardDeck) -> FilterOutcome,
) -> Result<FilterReport> {
    let deck = load_deck(input)?;
    let outcome = filter(&deck);
    save_deck(&outcome.kept, output)?;

    Ok(FilterReport {
        metadata: PassMetadata::new(pass, input, output, deck.len(), outcome.kept.len())?,
        reasons: outcome.reasons(),
    })
}

/// Drops special game-mode stratagems.
pub fn filter_modes(input: &Path, output: &Path, config: &PipelineConfig) -> Result<FilterReport> {
    let filter = ModeFilter::from_config(&config.filter);
    filter_pass("filter-modes", input, output, |deck| filter.apply(deck))
}

/// Excludes the configured factions, or keeps only the allowed ones.
pub fn filter_factions(input: &Path, output: &Path, config: &PipelineConfig, allow: bool) -> Result<FilterReport> {
    let filter = faction_filter(config, allow);
    filter_pass("filter-factions", input, output, |deck| filter.apply(deck))
}

fn faction_filter(config: &PipelineConfig, allow: bool) -> FactionFilter {
    if allow {
        FactionFilter::allow(config.filter.allowed_factions.iter().cloned())
    } else {
        FactionFilter::exclude(config.filter.excluded_factions.iter().cloned())
    }
}

pub fn keep_core(input: &Path, output: &Path) -> Result<FilterReport> {
    filter_pass("core-only", input, output, core_only)
}

/// Removes duplicates and re-applies the copy rule.
pub fn dedup(input: &Path, output: &Path) -> Result<(PassMetadata, DedupStats)> {
    let deck = load_deck(input)?;
    let (unique, stats) = dedup_deck(&deck);
    save_deck(&unique, output)?;
    Ok((PassMetadata::new("dedup", input, output, deck.len(), unique.len())?, stats))
}

/// Loads a deck and renders it to PDF.
pub fn render(input: &Path, output: &Path, options: &RenderOptions) -> Result<RenderSummary> {
    let deck = load_deck(input)?;
    deck.ensure_not_empty(&input.display().to_string())?;
    render_deck(&deck, output, options)
}

/// Everything `build` did, pass by pass
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub import: ImportStats,
    pub converted: usize,
    pub mode_excluded: usize,
    pub faction_excluded: usize,
    pub dedup: DedupStats,
    /// Final deck written next to the PDF
    pub deck_path: PathBuf,
    pub render: RenderSummary,
}

/// Full pipeline: convert → filter modes → filter factions → dedup → render.
///
/// Intermediate decks stay in memory; the final deck is written next to the
/// PDF with a `.json` extension.
pub fn build(csv: &Path, output: &Path, config: &PipelineConfig, options: &RenderOptions) -> Result<BuildSummary> {
    let (rows, import) = load_rows(csv)?;
    let converter = CardConverter::from_config(config).context("Failed to load translation table")?;
    let converted = converter.convert(&rows);

    let by_mode = ModeFilter::from_config(&config.filter).apply(&converted);
    let by_faction = faction_filter(config, false).apply(&by_mode.kept);
    let (deck, dedup) = dedup_deck(&by_faction.kept);
    tracing::info!(
        converted = converted.len(),
        mode_excluded = by_mode.excluded.len(),
        faction_excluded = by_faction.excluded.len(),
        cards = deck.len(),
        "prepared deck"
    );

    let deck_path = output.with_extension("json");
    save_deck(&deck, &deck_path)?;
    let render = render_deck(&deck, output, options)?;

    Ok(BuildSummary {
        import,
        converted: converted.len(),
        mode_excluded: by_mode.excluded.len(),
        faction_excluded: by_faction.excluded.len(),
        dedup,
        deck_path,
        render,
    })
}
