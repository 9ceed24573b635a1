use super::canvas::{Canvas, PaintMode, RasterImage, TextStyle};
use super::imaging::{apply_edge_gradient, fit_box, load_image};
use super::wrap::{char_budget, wrap_text};
use crate::color::Rgb;
use crate::config::{BadgeStyle, RenderConfig};
use crate::i18n::section_labels;
use crate::layout::Slot;
use crate::models::{Card, DEFAULT_CARD_COLOR};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raster resolution used when downsampling artwork.
const IMAGE_DPI: f32 = 150.0;

/// Supplies artwork for cards without an explicit `image`.
pub trait ImageProvider {
    fn image_for(&mut self, card: &Card) -> Option<PathBuf>;
}

/// Provider that never has an image.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageProvider for NoImages {
    fn image_for(&mut self, _card: &Card) -> Option<PathBuf> {
        None
    }
}

/// Geometry and styling of a card face.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTheme {
    pub card_width: f32,
    pub card_height: f32,
    pub padding: f32,
    pub header_height: f32,
    pub border_width: f32,
    pub border: Rgb,
    pub background: Rgb,
    pub text: Rgb,
    pub title_size: f32,
    pub min_title_size: f32,
    pub badge_height: f32,
    pub badge_text_size: f32,
    pub label_size: f32,
    pub body_size: f32,
    pub line_height: f32,
    /// Share of the card height given to artwork
    pub image_ratio: f32,
    pub gradient: bool,
    pub gradient_feather_px: u32,
    pub image_opacity: f32,
    pub logos: BTreeMap<String, PathBuf>,
    pub badges: BTreeMap<String, BadgeStyle>,
}

impl RenderTheme {
    pub fn from_config(config: &RenderConfig) -> Self {
        let logos = config
            .faction_logos
            .keys()
            .filter_map(|faction| Some((faction.clone(), config.logo_path(faction)?)))
            .collect();

        Self {
            card_width: config.card_width_pt,
            card_height: config.card_height_pt,
            gradient: config.gradient,
            gradient_feather_px: config.gradient_feather_px,
            image_opacity: config.image_opacity,
            logos,
            badges: config.faction_badges.clone(),
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            card_width: crate::layout::DEFAULT_CARD_WIDTH_PT,
            card_height: crate::layout::DEFAULT_CARD_HEIGHT_PT,
            padding: 10.0,
            header_height: 36.0,
            border_width: 2.0,
            border: Rgb::new(0x33, 0x33, 0x33),
            background: Rgb::WHITE,
            text: Rgb::new(0x21, 0x21, 0x21),
            title_size: 14.0,
            min_title_size: 7.0,
            badge_height: 12.0,
            badge_text_size: 7.0,
            label_size: 8.0,
            body_size: 8.0,
            line_height: 10.0,
            image_ratio: 0.28,
            gradient: true,
            gradient_feather_px: 24,
            image_opacity: 0.85,
            logos: BTreeMap::new(),
            badges: BTreeMap::new(),
        }
    }
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

/// What happened while drawing one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawnCard {
    pub image: bool,
    /// Body text ran past the bottom edge and was cut
    pub truncated: bool,
}

/// Draws cards onto any [`Canvas`].
pub struct CardRenderer {
    theme: RenderTheme,
    /// Loaded logos by faction; `None` marks a logo that failed to load
    logos: FxHashMap<String, Option<RasterImage>>,
}

impl CardRenderer {
    pub fn new(theme: RenderTheme) -> Self {
        Self {
            theme,
            logos: FxHashMap::default(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(RenderTheme::from_config(config))
    }

    pub fn theme(&self) -> &RenderTheme {
        &self.theme
    }

    /// Draws `card` into `slot`. Image problems are logged and skipped.
    pub fn draw_card(
        &mut self,
        canvas: &mut dyn Canvas,
        card: &Card,
        slot: Slot,
        images: &mut dyn ImageProvider,
    ) -> DrawnCard {
        let (w, h) = (self.theme.card_width, self.theme.card_height);

        canvas.save_state();
        if slot.rotated {
            canvas.translate(slot.x + h, slot.y);
            canvas.rotate(90.0);
        } else {
            canvas.translate(slot.x, slot.y);
        }

        let header = Rgb::parse_or(&card.color, Rgb::parse_or(DEFAULT_CARD_COLOR, self.theme.border));
        self.draw_frame(canvas, header);
        self.draw_title(canvas, card, header);

        let strip_y = h - self.theme.header_height - 4.0 - self.theme.badge_height;
        self.draw_faction_badge(canvas, card, header, strip_y);
        self.draw_cost_badge(canvas, card, strip_y);

        let mut top = strip_y - 4.0;
        let mut drawn = DrawnCard::default();
        if let Some(path) = resolve_image(card, images) {
            let area_h = h * self.theme.image_ratio;
            if self.draw_artwork(canvas, &path, top - area_h, area_h) {
                drawn.image = true;
                top -= area_h + 4.0;
            }
        }

        drawn.truncated = self.draw_body(canvas, card, top);
        canvas.restore_state();

        if drawn.truncated {
            tracing::debug!(title = %card.title, "card body truncated");
        }
        drawn
    }

    fn draw_frame(&self, canvas: &mut dyn Canvas, header: Rgb) {
        let t = &self.theme;
        canvas.set_fill_color(t.background);
        canvas.set_stroke_color(t.border);
        canvas.set_line_width(t.border_width);
        canvas.rect(0.0, 0.0, t.card_width, t.card_height, PaintMode::FillStroke);

        canvas.set_fill_color(header);
        canvas.rect(
            0.0,
            t.card_height - t.header_height,
            t.card_width,
            t.header_height,
            PaintMode::Fill,
        );
    }

    fn draw_title(&self, canvas: &mut dyn Canvas, card: &Card, header: Rgb) {
        let t = &self.theme;
        let available = t.card_width - 2.0 * t.padding;

        let mut size = t.title_size;
        while size > t.min_title_size && TextStyle::bold(size).estimated_width(&card.title) > available {
            size -= 0.5;
        }
        let style = TextStyle::bold(size);
        let budget = char_budget(t.card_width, t.padding, size);
        let title = truncate_chars(&card.title, budget);

        canvas.set_fill_color(header.contrasting_text());
        canvas.centered_text(
            t.card_width / 2.0,
            t.card_height - t.header_height / 2.0 - size * 0.35,
            &title,
            style,
        );
    }

    fn draw_faction_badge(&mut self, canvas: &mut dyn Canvas, card: &Card, header: Rgb, y: f32) {
        let Some(faction) = card.faction.as_deref().filter(|f| !f.trim().is_empty()) else {
            return;
        };
        let t_height = self.theme.badge_height;
        let x = self.theme.padding;

        if let Some(logo) = self.logo(faction) {
            let width = t_height * logo.aspect();
            canvas.image(x, y, width, t_height, logo);
            return;
        }

        let (text, background, foreground) = match self.theme.badges.get(faction) {
            Some(style) => {
                let background = Rgb::parse_or(&style.background, header);
                (
                    style.text.clone(),
                    background,
                    Rgb::parse_or(&style.foreground, background.contrasting_text()),
                )
            }
            None => (abbreviate(faction), header, header.contrasting_text()),
        };

        let style = TextStyle::bold(self.theme.badge_text_size);
        let width = style.estimated_width(&text) + 6.0;
        canvas.set_fill_color(background);
        canvas.rect(x, y, width, t_height, PaintMode::Fill);
        canvas.set_fill_color(foreground);
        canvas.centered_text(x + width / 2.0, y + (t_height - style.size) / 2.0 + 1.0, &text, style);
    }

    fn logo(&mut self, faction: &str) -> Option<&RasterImage> {
        let path = self.theme.logos.get(faction)?;
        let background = self.theme.background;
        let px = (self.theme.badge_height / 72.0 * IMAGE_DPI).ceil() as u32;

        self.logos
            .entry(faction.to_string())
            .or_insert_with(|| match load_image(path, px * 4, px) {
                Ok(image) => Some(apply_edge_gradient(&image, background, 0, 1.0)),
                Err(e) => {
                    tracing::warn!(faction, path = %path.display(), "logo unavailable: {e}");
                    None
                }
            })
            .as_ref()
    }

    fn draw_cost_badge(&self, canvas: &mut dyn Canvas, card: &Card, y: f32) {
        let t = &self.theme;
        let text = cost_label(card);
        let style = TextStyle::bold(t.badge_text_size);
        let width = style.estimated_width(&text) + 8.0;
        let x = t.card_width - t.padding - width;

        canvas.set_fill_color(t.border);
        canvas.rect(x, y, width, t.badge_height, PaintMode::Fill);
        canvas.set_fill_color(t.border.contrasting_text());
        canvas.centered_text(x + width / 2.0, y + (t.badge_height - style.size) / 2.0 + 1.0, &text, style);
    }

    /// Draws artwork in the band `[bottom, bottom + height]`; false if the
    /// image could not be used.
    fn draw_artwork(&self, canvas: &mut dyn Canvas, path: &Path, bottom: f32, height: f32) -> bool {
        let t = &self.theme;
        let width = t.card_width - 2.0 * t.padding;
        let max_w = (width / 72.0 * IMAGE_DPI).ceil() as u32;
        let max_h = (height / 72.0 * IMAGE_DPI).ceil() as u32;

        let image = match load_image(path, max_w, max_h) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping card image: {e}");
                return false;
            }
        };
        if image.width() == 0 || image.height() == 0 {
            tracing::warn!(path = %path.display(), "skipping empty card image");
            return false;
        }

        let feather = if t.gradient { t.gradient_feather_px } else { 0 };
        let masked = apply_edge_gradient(&image, t.background, feather, t.image_opacity);
        let (dx, dy, w, h) = fit_box(masked.aspect(), width, height);
        canvas.image(t.padding + dx, bottom + dy, w, h, &masked);
        true
    }

    /// Returns true when some text did not fit.
    fn draw_body(&self, canvas: &mut dyn Canvas, card: &Card, top: f32) -> bool {
        let t = &self.theme;
        let labels = section_labels(card.language());
        let budget = char_budget(t.card_width, t.padding, t.body_size);
        let bottom = t.padding;
        let mut y = top - t.line_height;

        canvas.set_fill_color(t.text);
        for (key, value) in card.body.sections() {
            let lines = wrap_text(value, budget);
            if lines.is_empty() {
                continue;
            }

            if y < bottom {
                return true;
            }
            canvas.text(t.padding, y, labels.for_key(key), TextStyle::bold(t.label_size));
            y -= t.line_height;

            for line in lines {
                if y < bottom {
                    return true;
                }
                canvas.text(t.padding, y, &line, TextStyle::regular(t.body_size));
                y -= t.line_height;
            }
            y -= t.line_height * 0.3;
        }
        false
    }
}

fn resolve_image(card: &Card, images: &mut dyn ImageProvider) -> Option<PathBuf> {
    if let Some(explicit) = card.image.as_deref().filter(|p| !p.trim().is_empty()) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!(title = %card.title, path = explicit, "card image not found");
    }
    images.image_for(card)
}

/// `"2 CP"`, or every dimension joined when the cost has several.
fn cost_label(card: &Card) -> String {
    if card.cost.is_empty() {
        return "0 CP".to_string();
    }
    card.cost
        .iter()
        .map(|(dimension, amount)| format!("{amount} {}", dimension.to_uppercase()))
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Initials of up to four words, e.g. `"Adeptus Mechanicus"` → `"AM"`.
fn abbreviate(faction: &str) -> String {
    let initials: String = faction
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(4)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.chars().count() == 1 {
        faction.chars().take(4).flat_map(char::to_uppercase).collect()
    } else {
        initials
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
