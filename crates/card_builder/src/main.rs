//! Card Builder CLI
//!
//! Stratagem CSV → bilingual cards JSON → printable PDF

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use card_builder::{FilterReport, ImageSource, PassMetadata, RenderOptions, RenderSummary};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use stratagem_core::{
    DeckStats, FactionBreakdown, FactionGroups, PageSize, ParityReport, PipelineConfig, TypeBreakdown,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "card_builder")]
#[command(about = "Build printable stratagem cards from a CSV export", long_about = None)]
struct Cli {
    /// Pipeline config JSON (defaults to $STRATAGEM_CONFIG_PATH, then built-ins)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct PassArgs {
    /// Input file path
    #[arg(long)]
    r#in: PathBuf,

    /// Output file path
    #[arg(long)]
    out: PathBuf,

    /// Output metadata JSON file
    #[arg(long)]
    metadata: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct RenderArgs {
    /// Page size: letter or a4 (overrides the config)
    #[arg(long)]
    page_size: Option<PageSize>,

    /// Search and download artwork for cards without a cached image
    #[arg(long, default_value = "false")]
    auto_images: bool,

    /// Draw no artwork at all
    #[arg(long, default_value = "false", conflicts_with = "auto_images")]
    no_images: bool,

    /// Disable the edge fade on artwork
    #[arg(long, default_value = "false")]
    no_gradient: bool,

    /// TTF font with Cyrillic coverage
    #[arg(long)]
    font: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Convert the pipe-delimited CSV export into cards JSON
    Convert(PassArgs),

    /// Drop special game-mode stratagems
    FilterModes(PassArgs),

    /// Exclude the configured factions
    FilterFactions {
        #[command(flatten)]
        pass: PassArgs,

        /// Keep only the allowed factions instead
        #[arg(long, default_value = "false")]
        allow: bool,
    },

    /// Keep only Core stratagems
    CoreOnly(PassArgs),

    /// Remove duplicate cards and re-apply the copy rule
    Dedup(PassArgs),

    /// Print deck statistics
    Stats {
        /// Cards JSON file path
        #[arg(long)]
        r#in: PathBuf,

        /// Add the per-faction breakdown
        #[arg(long, default_value = "false")]
        factions: bool,

        /// Add the army group breakdown
        #[arg(long, default_value = "false")]
        groups: bool,
    },

    /// Check that every stratagem has the expected number of copies
    Parity {
        /// Cards JSON file path
        #[arg(long)]
        r#in: PathBuf,
    },

    /// Analyse stratagem types in the CSV export
    Types {
        /// CSV export path
        #[arg(long)]
        csv: PathBuf,
    },

    /// Render cards JSON to PDF
    Render {
        #[command(flatten)]
        pass: PassArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Run convert, filter-modes, filter-factions, dedup and render in one go
    Build {
        /// CSV export path
        #[arg(long)]
        csv: PathBuf,

        /// Output PDF path; the final deck lands next to it as .json
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = PipelineConfig::resolve(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Convert(pass) => {
            print_pass_header("🔨 Converting stratagems...", &pass);
            let (meta, stats) = card_builder::convert_csv(&pass.r#in, &pass.out, &config)?;
            println!(
                "   Rows: {} total, {} imported, {} blank, {} malformed",
                stats.total_rows, stats.imported, stats.skipped_blank, stats.malformed
            );
            finish_pass(&meta, pass.metadata.as_deref())?;
        }

        Commands::FilterModes(pass) => {
            print_pass_header("🔍 Filtering special game modes...", &pass);
            let report = card_builder::filter_modes(&pass.r#in, &pass.out, &config)?;
            print_filter_report(&report);
            finish_pass(&report.metadata, pass.metadata.as_deref())?;
        }

        Commands::FilterFactions { pass, allow } => {
            let title = if allow {
                "🔍 Keeping allowed factions..."
            } else {
                "🔍 Excluding factions..."
            };
            print_pass_header(title, &pass);
            let report = card_builder::filter_factions(&pass.r#in, &pass.out, &config, allow)?;
            print_filter_report(&report);
            finish_pass(&report.metadata, pass.metadata.as_deref())?;
        }

        Commands::CoreOnly(pass) => {
            print_pass_header("🔍 Keeping Core stratagems...", &pass);
            let report = card_builder::keep_core(&pass.r#in, &pass.out)?;
            print_filter_report(&report);
            finish_pass(&report.metadata, pass.metadata.as_deref())?;
        }

        Commands::Dedup(pass) => {
            print_pass_header("🔨 Removing duplicates...", &pass);
            let (meta, stats) = card_builder::dedup(&pass.r#in, &pass.out)?;
            println!("{stats}");
            finish_pass(&meta, pass.metadata.as_deref())?;
        }

        Commands::Stats {
            r#in,
            factions,
            groups,
        } => {
            let deck = card_builder::load_deck(&r#in)?;
            print_report_header("Deck statistics", &r#in);
            println!("{}", DeckStats::collect(&deck));
            if factions {
                print_report_header("Faction breakdown", &r#in);
                println!("{}", FactionBreakdown::collect(&deck));
            }
            if groups {
                print_report_header("Army groups", &r#in);
                println!("{}", FactionGroups::collect(&deck, &config.stats.faction_groups));
            }
        }

        Commands::Parity { r#in } => {
            let deck = card_builder::load_deck(&r#in)?;
            print_report_header("Copy parity", &r#in);
            let report = ParityReport::check(&deck);
            println!("{report}");
            if report.is_consistent() {
                println!("\n✅ Parity check passed");
            } else {
                anyhow::bail!("❌ Parity check failed - unexpected card counts");
            }
        }

        Commands::Types { csv } => {
            let (rows, _) = card_builder::load_rows(&csv)?;
            print_report_header("Stratagem types", &csv);
            println!("{}", TypeBreakdown::from_config(&rows, &config.stats));
        }

        Commands::Render { pass, render } => {
            print_pass_header("📄 Rendering PDF...", &pass);
            let options = render_options(&config, &render);
            let summary = card_builder::render(&pass.r#in, &pass.out, &options)?;
            print_render_summary(&summary);
            if let Some(path) = pass.metadata {
                save_json(&path, &summary)?;
            }
        }

        Commands::Build { csv, out, render } => {
            println!("🔨 Building cards...");
            println!("   CSV:    {}", csv.display());
            println!("   Output: {}", out.display());

            let options = render_options(&config, &render);
            let summary = card_builder::build(&csv, &out, &config, &options)?;
            println!("\n   Imported rows:     {}", summary.import.imported);
            println!("   Converted cards:   {}", summary.converted);
            println!("   Mode excluded:     {}", summary.mode_excluded);
            println!("   Faction excluded:  {}", summary.faction_excluded);
            println!("   After dedup:       {}", summary.dedup.output_cards);
            println!("   Deck:              {}", summary.deck_path.display());
            print_render_summary(&summary.render);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "cli")]
fn render_options(config: &PipelineConfig, args: &RenderArgs) -> RenderOptions {
    let mut render = config.render.clone();
    if let Some(page_size) = args.page_size {
        render.page_size = page_size;
    }
    if args.no_gradient {
        render.gradient = false;
    }
    if let Some(font) = &args.font {
        render.font_path = Some(font.clone());
    }

    let image_source = if args.auto_images {
        ImageSource::Search
    } else if args.no_images {
        ImageSource::None
    } else {
        ImageSource::Cache
    };

    RenderOptions {
        render,
        images: config.images.clone(),
        image_source,
        ..RenderOptions::default()
    }
}

#[cfg(feature = "cli")]
fn print_pass_header(title: &str, pass: &PassArgs) {
    println!("{title}");
    println!("   Input:  {}", pass.r#in.display());
    println!("   Output: {}", pass.out.display());
}

#[cfg(feature = "cli")]
fn print_report_header(title: &str, source: &Path) {
    println!("\n📊 {title} ({})", source.display());
    println!("   Generated: {}", chrono::Utc::now().to_rfc3339());
    println!("{}", "=".repeat(60));
}

#[cfg(feature = "cli")]
fn print_filter_report(report: &FilterReport) {
    println!(
        "\n   Kept {} of {} cards ({} excluded)",
        report.metadata.cards_out,
        report.metadata.records_in,
        report.excluded()
    );
    for (reason, count) in &report.reasons {
        println!("     {count:>4}  {reason}");
    }
}

#[cfg(feature = "cli")]
fn finish_pass(meta: &PassMetadata, metadata_path: Option<&Path>) -> Result<()> {
    println!("\n✅ Wrote {} cards to {}", meta.cards_out, meta.output);
    println!("   Checksum: {}", meta.checksum);
    println!("   Created:  {}", meta.created_at);
    if let Some(path) = metadata_path {
        meta.save(path)?;
        println!("\n📄 Metadata saved to: {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_render_summary(summary: &RenderSummary) {
    println!("\n✅ PDF written");
    println!("   Cards:     {}", summary.cards);
    println!("   Pages:     {}", summary.pages);
    println!("   Layout:    {}", summary.layout);
    println!("   Images:    {}", summary.images_drawn);
    if summary.truncated_cards > 0 {
        println!("   Truncated: {} cards had text cut", summary.truncated_cards);
    }
    println!("   Checksum:  {}", summary.checksum);
}

#[cfg(feature = "cli")]
fn save_json(path: &Path, summary: &RenderSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("\n📄 Metadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("card_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
