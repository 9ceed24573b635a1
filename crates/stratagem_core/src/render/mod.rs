//! Card drawing over a backend-agnostic [`Canvas`]
//!
//! The PDF writer lives in the tool crate; everything here only needs
//! rectangles, text and raster images.

mod canvas;
mod card;
mod imaging;
mod wrap;

pub use canvas::{Canvas, PaintMode, RasterImage, TextStyle, AVG_GLYPH_WIDTH};
pub use card::{CardRenderer, DrawnCard, ImageProvider, NoImages, RenderTheme};
pub use imaging::{apply_edge_gradient, fit_box, load_image};
pub use wrap::{char_budget, wrap_text};
