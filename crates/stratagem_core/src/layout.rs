//! Page layout calculator
//!
//! All measurements are PDF points with the origin at the lower-left corner
//! of the page. Cards sit on a grid with a gutter around and between them.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Poker size, 2.5in × 3.5in.
pub const DEFAULT_CARD_WIDTH_PT: f32 = 180.0;
pub const DEFAULT_CARD_HEIGHT_PT: f32 = 252.0;
/// 1/8in
pub const DEFAULT_GUTTER_PT: f32 = 9.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// (width, height) in points
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

impl FromStr for PageSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            other => Err(CoreError::InvalidLayout(format!(
                "unknown page size '{other}' (expected letter or a4)"
            ))),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageSize::Letter => write!(f, "letter"),
            PageSize::A4 => write!(f, "A4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Cards in their natural orientation
    Upright,
    /// Every card turned 90°
    Rotated,
    /// Upright grid plus turned cards in the leftover strips
    Mixed,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LayoutMode::Upright => write!(f, "upright"),
            LayoutMode::Rotated => write!(f, "rotated"),
            LayoutMode::Mixed => write!(f, "mixed"),
        }
    }
}

/// Placement of one card on a page.
///
/// `(x, y)` is the lower-left corner of the box the card occupies. A rotated
/// card occupies `card_height × card_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub x: f32,
    pub y: f32,
    pub rotated: bool,
}

/// Cards per page under each policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTotals {
    pub upright: u32,
    pub rotated: u32,
    pub mixed: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Grid {
    cols: u32,
    rows: u32,
}

impl Grid {
    fn fit(avail_w: f32, avail_h: f32, cell_w: f32, cell_h: f32, gutter: f32) -> Self {
        Self {
            cols: count_fit(avail_w, cell_w + gutter),
            rows: count_fit(avail_h, cell_h + gutter),
        }
    }

    fn total(&self) -> u32 {
        self.cols * self.rows
    }
}

fn count_fit(avail: f32, step: f32) -> u32 {
    if avail <= 0.0 || step <= 0.0 {
        return 0;
    }
    // absorb float noise so an exact fit is not lost
    (avail / step + 1e-4).floor() as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub mode: LayoutMode,
    pub cards_per_row: u32,
    pub cards_per_col: u32,
    /// Extra rotated cards placed by the mixed policy; 0 otherwise
    pub rotated_fill: u32,
    pub cards_per_page: u32,
    pub page_width: f32,
    pub page_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub gutter: f32,
    pub totals: LayoutTotals,
    right_strip: Grid,
    bottom_strip: Grid,
}

impl PageLayout {
    /// Picks the policy fitting the most cards. Mixed wins only when strictly
    /// better than both pure policies; ties prefer upright, then rotated.
    pub fn compute(page_width: f32, page_height: f32, card_width: f32, card_height: f32, gutter: f32) -> Result<Self> {
        for (name, value) in [
            ("page width", page_width),
            ("page height", page_height),
            ("card width", card_width),
            ("card height", card_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::InvalidLayout(format!("{name} must be positive, got {value}")));
            }
        }
        if !gutter.is_finite() || gutter < 0.0 {
            return Err(CoreError::InvalidLayout(format!("gutter must be non-negative, got {gutter}")));
        }

        let (w, h, g) = (card_width, card_height, gutter);
        let avail_w = page_width - g;
        let avail_h = page_height - g;

        let upright = Grid::fit(avail_w, avail_h, w, h, g);
        let rotated = Grid::fit(avail_w, avail_h, h, w, g);

        let used_w = g + upright.cols as f32 * (w + g);
        let used_h = g + upright.rows as f32 * (h + g);
        let right_strip = Grid {
            cols: count_fit(page_width - used_w, h + g),
            rows: count_fit(avail_h, w + g),
        };
        let bottom_strip = Grid {
            cols: count_fit(used_w - g, h + g),
            rows: count_fit(page_height - used_h, w + g),
        };
        let fill = right_strip.total() + bottom_strip.total();

        let totals = LayoutTotals {
            upright: upright.total(),
            rotated: rotated.total(),
            mixed: upright.total() + fill,
        };

        let base = Self {
            mode: LayoutMode::Upright,
            cards_per_row: upright.cols,
            cards_per_col: upright.rows,
            rotated_fill: 0,
            cards_per_page: totals.upright,
            page_width,
            page_height,
            card_width,
            card_height,
            gutter,
            totals,
            right_strip: Grid::default(),
            bottom_strip: Grid::default(),
        };

        let layout = if totals.mixed > totals.upright.max(totals.rotated) {
            Self {
                mode: LayoutMode::Mixed,
                rotated_fill: fill,
                cards_per_page: totals.mixed,
                right_strip,
                bottom_strip,
                ..base
            }
        } else if totals.rotated > totals.upright {
            Self {
                mode: LayoutMode::Rotated,
                cards_per_row: rotated.cols,
                cards_per_col: rotated.rows,
                cards_per_page: totals.rotated,
                ..base
            }
        } else {
            base
        };

        if layout.cards_per_page == 0 {
            return Err(CoreError::InvalidLayout(format!(
                "a {card_width}x{card_height}pt card does not fit on a {page_width}x{page_height}pt page"
            )));
        }

        tracing::debug!(
            mode = %layout.mode,
            per_page = layout.cards_per_page,
            upright = totals.upright,
            rotated = totals.rotated,
            mixed = totals.mixed,
            "computed page layout"
        );
        Ok(layout)
    }

    pub fn for_page(page: PageSize, card_width: f32, card_height: f32, gutter: f32) -> Result<Self> {
        let (page_width, page_height) = page.dimensions();
        Self::compute(page_width, page_height, card_width, card_height, gutter)
    }

    pub fn pages_needed(&self, cards: usize) -> usize {
        cards.div_ceil(self.cards_per_page as usize)
    }

    /// Card positions in reading order: grid rows top to bottom, then the
    /// right strip, then the bottom strip.
    pub fn slots(&self) -> Vec<Slot> {
        let (w, h, g) = (self.card_width, self.card_height, self.gutter);
        let top = self.page_height;
        let mut slots = Vec::with_capacity(self.cards_per_page as usize);

        let grid_rotated = self.mode == LayoutMode::Rotated;
        let (cell_w, cell_h) = if grid_rotated { (h, w) } else { (w, h) };
        push_grid(
            &mut slots,
            g,
            top,
            Grid {
                cols: self.cards_per_row,
                rows: self.cards_per_col,
            },
            cell_w,
            cell_h,
            g,
            grid_rotated,
        );

        if self.mode == LayoutMode::Mixed {
            let used_w = g + self.cards_per_row as f32 * (w + g);
            let used_h = g + self.cards_per_col as f32 * (h + g);
            // rotated cells are h wide and w tall
            push_grid(&mut slots, used_w, top, self.right_strip, h, w, g, true);
            push_grid(&mut slots, g, top - used_h + g, self.bottom_strip, h, w, g, true);
        }

        slots
    }
}

/// Lays out `grid` with its first cell's top-left corner at `(left, top - gutter)`.
fn push_grid(slots: &mut Vec<Slot>, left: f32, top: f32, grid: Grid, cell_w: f32, cell_h: f32, gutter: f32, rotated: bool) {
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            slots.push(Slot {
                x: left + col as f32 * (cell_w + gutter),
                y: top - (row + 1) as f32 * (cell_h + gutter),
                rotated,
            });
        }
    }
}

impl fmt::Display for PageLayout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} layout: {} x {}",
            self.mode, self.cards_per_row, self.cards_per_col
        )?;
        if self.rotated_fill > 0 {
            write!(f, " + {} rotated", self.rotated_fill)?;
        }
        write!(f, " = {} cards per page", self.cards_per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slot_box(layout: &PageLayout, slot: &Slot) -> (f32, f32, f32, f32) {
        let (w, h) = if slot.rotated {
            (layout.card_height, layout.card_width)
        } else {
            (layout.card_width, layout.card_height)
        };
        (slot.x, slot.y, slot.x + w, slot.y + h)
    }

    #[test]
    fn test_letter_poker_cards() {
        let layout = PageLayout::for_page(PageSize::Letter, 180.0, 252.0, 9.0).unwrap();
        // (612-9)/189 = 3 cols, (792-9)/261 = 3 rows
        assert_eq!(layout.totals.upright, 9);
        assert_eq!(layout.mode, LayoutMode::Upright);
        assert_eq!(layout.cards_per_page, 9);
        assert_eq!(layout.slots().len(), 9);
    }

    #[test]
    fn test_landscape_cards_stay_upright_on_tie_break() {
        // 3.5in x 2in cards on letter
        let layout = PageLayout::compute(612.0, 792.0, 252.0, 144.0, 9.0).unwrap();
        // upright: 2 x 5 = 10, rotated: 3 x 3 = 9
        assert_eq!(layout.totals.upright, 10);
        assert_eq!(layout.totals.rotated, 9);
        assert_eq!(layout.totals.mixed, 10);
        assert_eq!(layout.mode, LayoutMode::Upright);
    }

    #[test]
    fn test_rotated_wins_when_it_fits_more() {
        // upright 2 x 1, rotated 3 x 1
        let layout = PageLayout::compute(200.0, 100.0, 100.0, 60.0, 0.0).unwrap();
        assert_eq!(layout.totals.upright, 2);
        assert_eq!(layout.totals.rotated, 3);
        assert_eq!(layout.mode, LayoutMode::Rotated);
        assert_eq!(layout.cards_per_row, 3);
        assert!(layout.slots().iter().all(|s| s.rotated));
    }

    #[test]
    fn test_mixed_chosen_when_strictly_better() {
        let layout = PageLayout::compute(170.0, 110.0, 100.0, 60.0, 0.0).unwrap();
        // upright 1x1 = 1, rotated 2x1 = 2, mixed 1 + right strip (70/60=1 x 110/100=1) = 2
        assert_eq!(layout.totals.upright, 1);
        assert_eq!(layout.totals.rotated, 2);
        assert_eq!(layout.mode, LayoutMode::Rotated);

        let layout = PageLayout::compute(160.0, 160.0, 100.0, 60.0, 0.0).unwrap();
        // upright 1x2 = 2, rotated 2x1 = 2, mixed 2 + right strip 1x1 = 3
        assert_eq!(layout.totals.upright, 2);
        assert_eq!(layout.totals.rotated, 2);
        assert_eq!(layout.totals.mixed, 3);
        assert_eq!(layout.mode, LayoutMode::Mixed);
        assert_eq!(layout.rotated_fill, 1);
        assert_eq!(
            layout.cards_per_page,
            layout.cards_per_row * layout.cards_per_col + layout.rotated_fill
        );
        assert_eq!(layout.slots().iter().filter(|s| s.rotated).count(), 1);
    }

    #[test]
    fn test_degenerate_inputs() {
        for (w, h, cw, ch, g) in [
            (0.0, 792.0, 180.0, 252.0, 9.0),
            (612.0, 792.0, -1.0, 252.0, 9.0),
            (612.0, 792.0, 180.0, f32::NAN, 9.0),
            (612.0, 792.0, 180.0, 252.0, -1.0),
            (612.0, 792.0, 700.0, 900.0, 0.0),
        ] {
            assert!(
                matches!(PageLayout::compute(w, h, cw, ch, g), Err(CoreError::InvalidLayout(_))),
                "{w} {h} {cw} {ch} {g}"
            );
        }
    }

    #[test]
    fn test_page_size_parse() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("legal".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_pages_needed() {
        let layout = PageLayout::for_page(PageSize::Letter, 180.0, 252.0, 9.0).unwrap();
        assert_eq!(layout.pages_needed(0), 0);
        assert_eq!(layout.pages_needed(9), 1);
        assert_eq!(layout.pages_needed(10), 2);
    }

    proptest! {
        #[test]
        fn prop_layout_invariants(
            page_w in 100.0f32..1000.0,
            page_h in 100.0f32..1000.0,
            card_w in 40.0f32..400.0,
            card_h in 40.0f32..400.0,
            gutter in 0.0f32..20.0,
        ) {
            let Ok(layout) = PageLayout::compute(page_w, page_h, card_w, card_h, gutter) else {
                return Ok(());
            };

            prop_assert_eq!(
                layout.cards_per_page,
                layout.cards_per_row * layout.cards_per_col + layout.rotated_fill
            );
            if layout.mode != LayoutMode::Mixed {
                prop_assert_eq!(layout.rotated_fill, 0);
            }
            let t = layout.totals;
            prop_assert!(layout.cards_per_page >= t.upright.max(t.rotated).max(t.mixed));

            let slots = layout.slots();
            prop_assert_eq!(slots.len(), layout.cards_per_page as usize);

            let eps = 0.1;
            let boxes: Vec<_> = slots.iter().map(|s| slot_box(&layout, s)).collect();
            for (x0, y0, x1, y1) in &boxes {
                prop_assert!(*x0 >= -eps && *y0 >= -eps);
                prop_assert!(*x1 <= page_w + eps && *y1 <= page_h + eps);
            }
            for i in 0..boxes.len() {
                for j in i + 1..boxes.len() {
                    let (a, b) = (boxes[i], boxes[j]);
                    let overlap = a.0 < b.2 - eps && b.0 < a.2 - eps && a.1 < b.3 - eps && b.1 < a.3 - eps;
                    prop_assert!(!overlap, "slots {} and {} overlap", i, j);
                }
            }
        }
    }
}
