//! End-to-end pipeline over a small export

use anyhow::Result;
use card_builder::{build, convert_csv, filter_factions, filter_modes, load_deck, ImageSource, RenderOptions};
use std::fs;
use std::path::Path;
use stratagem_core::{Language, ParityReport, PipelineConfig};
use tempfile::TempDir;

const EXPORT: &str = "\u{feff}id|name|type|cp_cost|description|faction_id|turn|phase|legend
1|Test Strike|Core – Battle Tactic Stratagem|1|<p><b>WHEN:</b> Your turn</p><p><b>TARGET:</b> One unit</p><p><b>EFFECT:</b> Deal damage</p>|000008335|Your turn|Any phase|
2|Counter-offensive|Core – Strategic Ploy Stratagem|2|<b>WHEN:</b> Fight phase. <b>EFFECT:</b> Fight next.|000008335|Opponent's turn|Fight phase|
3|Boarding Strike|Boarding Actions – Stratagem|1|EFFECT: Breach the hull.|000009218|||
4|Orkish Fury|Waaagh! Tribe – Strategic Ploy Stratagem|1|EFFECT: Go.||||
5||Core – Epic Deed Stratagem|1|ignored||||
";

fn write_export(dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join("Stratagems.csv");
    fs::write(&path, EXPORT)?;
    Ok(path)
}

fn offline() -> RenderOptions {
    RenderOptions {
        image_source: ImageSource::None,
        ..RenderOptions::default()
    }
}

#[test]
fn test_sample_row_becomes_four_cards() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = write_export(dir.path())?;
    let out = dir.path().join("cards.json");

    convert_csv(&csv, &out, &PipelineConfig::default())?;
    let deck = load_deck(&out)?;

    let strike: Vec<_> = deck
        .iter()
        .filter(|c| c.id.as_deref().is_some_and(|id| id.starts_with("1_")))
        .collect();
    assert_eq!(strike.len(), 4);
    assert_eq!(strike.iter().filter(|c| c.language() == Language::English).count(), 2);
    assert_eq!(strike.iter().filter(|c| c.language() == Language::Russian).count(), 2);

    let body = &strike[0].body;
    assert_eq!(body.when, "Your turn");
    assert_eq!(body.target, "One unit");
    assert_eq!(body.effect, "Deal damage");
    assert_eq!(body.restriction, "");
    Ok(())
}

#[test]
fn test_file_passes_chain() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = write_export(dir.path())?;
    let config = PipelineConfig::default();
    let cards = dir.path().join("cards.json");
    let main_game = dir.path().join("main.json");
    let factions = dir.path().join("factions.json");

    convert_csv(&csv, &cards, &config)?;
    let modes = filter_modes(&cards, &main_game, &config)?;
    assert!(modes.excluded() >= 4, "boarding cards dropped: {:?}", modes.reasons);
    assert!(load_deck(&main_game)?.iter().all(|c| !c.title.contains("Boarding")));

    let report = filter_factions(&main_game, &factions, &config, false)?;
    assert_eq!(report.metadata.records_in, modes.metadata.cards_out);
    assert!(ParityReport::check(&load_deck(&factions)?).is_consistent());
    Ok(())
}

#[test]
fn test_build_writes_pdf_and_deck() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = write_export(dir.path())?;
    let pdf = dir.path().join("out/cards.pdf");

    let summary = build(&csv, &pdf, &PipelineConfig::default(), &offline())?;
    assert_eq!(summary.import.imported, 4);
    assert!(summary.render.pages >= 1);
    assert_eq!(summary.render.cards, summary.dedup.output_cards);
    assert!(fs::read(&pdf)?.starts_with(b"%PDF"));

    let deck = load_deck(&summary.deck_path)?;
    assert_eq!(deck.len(), summary.render.cards);
    assert!(deck.generated_at.is_some());
    Ok(())
}

#[test]
fn test_config_file_changes_passes() -> Result<()> {
    let dir = TempDir::new()?;
    let csv = write_export(dir.path())?;
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{ "filter": { "excluded_modes": [], "excluded_name_keywords": [] } }"#,
    )?;
    let config = PipelineConfig::resolve(Some(config_path.as_path()))?;

    let cards = dir.path().join("cards.json");
    let kept = dir.path().join("kept.json");
    convert_csv(&csv, &cards, &config)?;
    let report = filter_modes(&cards, &kept, &config)?;
    assert_eq!(report.excluded(), 0);
    Ok(())
}

#[test]
fn test_missing_csv_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = convert_csv(
        &dir.path().join("missing.csv"),
        &dir.path().join("cards.json"),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("missing.csv"));
}
