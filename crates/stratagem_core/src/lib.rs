//! # stratagem_core - Stratagem Card Pipeline Library
//!
//! Turns the pipe-delimited stratagem export into printable bilingual cards.
//!
//! ## Features
//! - CSV import with HTML cleanup and WHEN/TARGET/EFFECT/RESTRICTIONS parsing
//! - English/Russian duplication with an injectable translation table
//! - Game-mode and faction filters, deduplication, statistics and parity checks
//! - Page layout calculator and a backend-agnostic card renderer

// Renderer entry points take geometry plus styling
#![allow(clippy::too_many_arguments)]

pub mod color;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod i18n;
pub mod images;
pub mod import;
pub mod layout;
pub mod models;
pub mod render;
pub mod stats;

pub use color::Rgb;
pub use config::{PipelineConfig, CONFIG_PATH_ENV};
pub use error::{CoreError, Result};
pub use models::{Card, CardBody, CardDeck, Cost, Language, StratagemRow};

// Re-export pipeline passes
pub use dedup::{dedup_deck, DedupStats};
pub use filter::{core_only, FactionFilter, FilterOutcome, ModeFilter};
pub use i18n::{detect_language, section_labels, SectionLabels, TranslationTable};
pub use import::{
    clean_html, parse_cp_cost, parse_description, read_stratagems, CardConverter, ColorScheme,
    ImportStats,
};

// Re-export reporting
pub use stats::{DeckStats, FactionBreakdown, FactionGroups, ParityReport, TypeBreakdown};

// Re-export layout and rendering
pub use images::{cache_key, search_query, ImageCache};
pub use layout::{LayoutMode, PageLayout, PageSize, Slot};
pub use render::{
    apply_edge_gradient, wrap_text, Canvas, CardRenderer, DrawnCard, ImageProvider, NoImages,
    PaintMode, RasterImage, RenderTheme, TextStyle,
};
