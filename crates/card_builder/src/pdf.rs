//! PDF backend for the card renderer
//!
//! `PdfCanvas` maps the renderer's drawing calls onto a printpdf layer.
//! Coordinates stay in points; printpdf wants millimetres at the edges.

use anyhow::{Context, Result};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::path::{PaintMode as PdfPaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, CurTransMat, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Pt,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::Path;
use stratagem_core::config::{ImageConfig, RenderConfig};
use stratagem_core::{
    Canvas, CardDeck, CardRenderer, ImageCache, ImageProvider, LayoutMode, NoImages, PageLayout,
    PaintMode, RasterImage, Rgb, TextStyle,
};

use crate::image_search::ImageSearcher;

const LAYER_NAME: &str = "Cards";

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

/// Fonts registered with one document.
#[derive(Clone)]
pub struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// True when a TTF with full Unicode coverage was embedded
    unicode: bool,
}

impl Fonts {
    /// Embeds `font_path` when given and readable, else falls back to the
    /// built-in Helvetica pair with a warning.
    pub fn load(doc: &PdfDocumentReference, font_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = font_path {
            let embedded = File::open(path)
                .with_context(|| format!("cannot open {}", path.display()))
                .and_then(|file| doc.add_external_font(file).context("cannot parse font"));
            match embedded {
                Ok(font) => {
                    tracing::debug!(path = %path.display(), "embedded card font");
                    return Ok(Self {
                        regular: font.clone(),
                        bold: font,
                        unicode: true,
                    });
                }
                Err(e) => tracing::warn!("font unavailable, falling back to Helvetica: {e:#}"),
            }
        }

        Ok(Self {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .context("Failed to add Helvetica")?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .context("Failed to add Helvetica-Bold")?,
            unicode: false,
        })
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode
    }
}

/// [`Canvas`] over one printpdf layer.
pub struct PdfCanvas {
    layer: PdfLayerReference,
    fonts: Fonts,
    warned_non_latin: bool,
}

impl PdfCanvas {
    pub fn new(layer: PdfLayerReference, fonts: Fonts) -> Self {
        Self {
            layer,
            fonts,
            warned_non_latin: false,
        }
    }

    fn color(color: Rgb) -> Color {
        let (r, g, b) = color.to_unit();
        Color::Rgb(printpdf::Rgb::new(r, g, b, None))
    }
}

impl Canvas for PdfCanvas {
    fn save_state(&mut self) {
        self.layer.save_graphics_state();
    }

    fn restore_state(&mut self) {
        self.layer.restore_graphics_state();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.layer.set_ctm(CurTransMat::Raw([1.0, 0.0, 0.0, 1.0, dx, dy]));
    }

    fn rotate(&mut self, degrees: f32) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        self.layer.set_ctm(CurTransMat::Raw([cos, sin, -sin, cos, 0.0, 0.0]));
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.layer.set_fill_color(Self::color(color));
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.layer.set_outline_color(Self::color(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.layer.set_outline_thickness(width);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, mode: PaintMode) {
        let corners = [(x, y), (x + width, y), (x + width, y + height), (x, y + height)];
        let ring = corners
            .iter()
            .map(|&(px, py)| (Point::new(mm(px), mm(py)), false))
            .collect();
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: match mode {
                PaintMode::Fill => PdfPaintMode::Fill,
                PaintMode::Stroke => PdfPaintMode::Stroke,
                PaintMode::FillStroke => PdfPaintMode::FillStroke,
            },
            winding_order: WindingOrder::NonZero,
        });
    }

    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
        if !self.fonts.unicode && !text.is_ascii() && !self.warned_non_latin {
            tracing::warn!("non-Latin text with a built-in font; pass --font with a Unicode TTF");
            self.warned_non_latin = true;
        }
        let font = if style.bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.use_text(text, style.size, mm(x), mm(y), font);
    }

    fn image(&mut self, x: f32, y: f32, width: f32, height: f32, image: &RasterImage) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let Some(buffer) = RgbImage::from_raw(image.width, image.height, image.rgb.clone()) else {
            tracing::warn!(width = image.width, height = image.height, "malformed raster, skipped");
            return;
        };

        // at 72 dpi one pixel is one point
        Image::from_dynamic_image(&DynamicImage::ImageRgb8(buffer)).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(x)),
                translate_y: Some(mm(y)),
                scale_x: Some(width / image.width as f32),
                scale_y: Some(height / image.height as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
    }
}

/// Where card artwork comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSource {
    None,
    /// Previously downloaded artwork only
    #[default]
    Cache,
    /// Cache, then network search
    Search,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub render: RenderConfig,
    pub images: ImageConfig,
    pub image_source: ImageSource,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            images: ImageConfig::default(),
            image_source: ImageSource::default(),
            title: "Stratagem Cards".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSummary {
    pub pages: usize,
    pub cards: usize,
    pub cards_per_page: u32,
    /// e.g. `upright layout: 3 x 3 = 9 cards per page`
    pub layout: String,
    pub rotated: bool,
    pub images_drawn: usize,
    pub truncated_cards: usize,
    pub unicode_font: bool,
    /// SHA256 of the written PDF
    pub checksum: String,
    pub created_at: String,
}

/// Renders every card of `deck` to `output`.
pub fn render_deck(deck: &CardDeck, output: &Path, options: &RenderOptions) -> Result<RenderSummary> {
    deck.ensure_not_empty("deck")?;
    options.render.validate().context("Invalid render settings")?;

    let cfg = &options.render;
    let layout = PageLayout::for_page(cfg.page_size, cfg.card_width_pt, cfg.card_height_pt, cfg.gutter_pt)
        .context("Cards do not fit on the page")?;
    let slots = layout.slots();
    let per_page = layout.cards_per_page as usize;

    let mut provider: Box<dyn ImageProvider> = match options.image_source {
        ImageSource::None => Box::new(NoImages),
        ImageSource::Cache => Box::new(ImageCache::new(&options.images.cache_dir)),
        ImageSource::Search => Box::new(ImageSearcher::new(&options.images)?),
    };

    let (doc, first_page, first_layer) = PdfDocument::new(
        options.title.as_str(),
        mm(layout.page_width),
        mm(layout.page_height),
        LAYER_NAME,
    );
    let fonts = Fonts::load(&doc, cfg.font_path.as_deref())?;
    let mut renderer = CardRenderer::from_config(cfg);

    let mut pages = 0;
    let mut images_drawn = 0;
    let mut truncated_cards = 0;
    for (index, chunk) in deck.cards.chunks(per_page).enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(mm(layout.page_width), mm(layout.page_height), LAYER_NAME);
            doc.get_page(page).get_layer(layer)
        };
        let mut canvas = PdfCanvas::new(layer, fonts.clone());

        for (card, slot) in chunk.iter().zip(&slots) {
            let drawn = renderer.draw_card(&mut canvas, card, *slot, provider.as_mut());
            images_drawn += usize::from(drawn.image);
            truncated_cards += usize::from(drawn.truncated);
        }
        pages += 1;
        tracing::debug!(page = pages, cards = chunk.len(), "rendered page");
    }

    let bytes = doc.save_to_bytes().context("Failed to serialize PDF")?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output, &bytes).with_context(|| format!("Failed to write PDF: {}", output.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    tracing::info!(pages, cards = deck.len(), layout = %layout, "rendered deck");
    Ok(RenderSummary {
        pages,
        cards: deck.len(),
        cards_per_page: layout.cards_per_page,
        layout: layout.to_string(),
        rotated: layout.mode != LayoutMode::Upright,
        images_drawn,
        truncated_cards,
        unicode_font: fonts.is_unicode(),
        checksum: format!("{:x}", hasher.finalize()),
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratagem_core::{Card, CardBody, Cost, PageSize};
    use tempfile::TempDir;

    fn deck(n: usize) -> CardDeck {
        (0..n)
            .map(|i| {
                Card::new(
                    format!("Card {i}"),
                    Cost::cp(1),
                    CardBody::new("Your turn", "One unit", "Deal damage", ""),
                )
                .with_faction("Core Stratagems")
            })
            .collect()
    }

    fn options() -> RenderOptions {
        RenderOptions {
            image_source: ImageSource::None,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_render_paginates() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("out/cards.pdf");

        let summary = render_deck(&deck(10), &out, &options())?;
        assert_eq!(summary.cards, 10);
        assert_eq!(summary.cards_per_page, 9);
        assert_eq!(summary.pages, 2);
        assert!(!summary.unicode_font);

        let bytes = fs::read(&out)?;
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(summary.checksum.len(), 64);
        Ok(())
    }

    #[test]
    fn test_empty_deck_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("cards.pdf");
        let err = render_deck(&CardDeck::default(), &out, &options()).unwrap_err();
        assert!(err.to_string().contains("No cards found"));
        assert!(!out.exists());
        Ok(())
    }

    #[test]
    fn test_missing_font_falls_back() -> Result<()> {
        let dir = TempDir::new()?;
        let mut opts = options();
        opts.render.font_path = Some(dir.path().join("missing.ttf"));
        opts.render.page_size = PageSize::A4;

        let summary = render_deck(&deck(1), &dir.path().join("a4.pdf"), &opts)?;
        assert!(!summary.unicode_font);
        assert_eq!(summary.pages, 1);
        Ok(())
    }

    #[test]
    fn test_bad_geometry_is_reported() -> Result<()> {
        let dir = TempDir::new()?;
        let mut opts = options();
        opts.render.card_width_pt = 2000.0;
        let err = render_deck(&deck(1), &dir.path().join("x.pdf"), &opts).unwrap_err();
        assert!(format!("{err:#}").contains("do not fit"));
        Ok(())
    }
}
