use crate::color::Rgb;

/// Average Helvetica glyph advance as a fraction of the font size.
pub const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    Fill,
    Stroke,
    FillStroke,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Width estimate used for centring and fitting; no font metrics needed.
    pub fn estimated_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * AVG_GLYPH_WIDTH
    }
}

/// Opaque 8-bit RGB pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgb(image: image::RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            rgb: image.into_raw(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some(Rgb::new(self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]))
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Drawing surface the card renderer paints on.
///
/// Coordinates are points with the origin at the lower-left corner of the
/// current user space. `translate` and `rotate` compose with the current
/// transform until the matching `restore_state`.
pub trait Canvas {
    fn save_state(&mut self);
    fn restore_state(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    /// Counter-clockwise, in degrees.
    fn rotate(&mut self, degrees: f32);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_stroke_color(&mut self, color: Rgb);
    fn set_line_width(&mut self, width: f32);
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, mode: PaintMode);
    /// `(x, y)` is the left end of the baseline.
    fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle);
    /// Stretches `image` over the given box.
    fn image(&mut self, x: f32, y: f32, width: f32, height: f32, image: &RasterImage);

    fn centered_text(&mut self, center_x: f32, y: f32, text: &str, style: TextStyle) {
        let width = style.estimated_width(text);
        self.text(center_x - width / 2.0, y, text, style);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Save,
        Restore,
        Translate(f32, f32),
        Rotate(f32),
        Fill(Rgb),
        Stroke(Rgb),
        LineWidth(f32),
        Rect { x: f32, y: f32, w: f32, h: f32, mode: PaintMode },
        Text { x: f32, y: f32, text: String, style: TextStyle },
        Image { x: f32, y: f32, w: f32, h: f32 },
    }

    /// Canvas that remembers every call.
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub ops: Vec<Op>,
    }

    impl RecordingCanvas {
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn images(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::Image { .. })).count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn save_state(&mut self) {
            self.ops.push(Op::Save);
        }

        fn restore_state(&mut self) {
            self.ops.push(Op::Restore);
        }

        fn translate(&mut self, dx: f32, dy: f32) {
            self.ops.push(Op::Translate(dx, dy));
        }

        fn rotate(&mut self, degrees: f32) {
            self.ops.push(Op::Rotate(degrees));
        }

        fn set_fill_color(&mut self, color: Rgb) {
            self.ops.push(Op::Fill(color));
        }

        fn set_stroke_color(&mut self, color: Rgb) {
            self.ops.push(Op::Stroke(color));
        }

        fn set_line_width(&mut self, width: f32) {
            self.ops.push(Op::LineWidth(width));
        }

        fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, mode: PaintMode) {
            self.ops.push(Op::Rect { x, y, w, h, mode });
        }

        fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) {
            self.ops.push(Op::Text {
                x,
                y,
                text: text.to_string(),
                style,
            });
        }

        fn image(&mut self, x: f32, y: f32, w: f32, h: f32, _image: &RasterImage) {
            self.ops.push(Op::Image { x, y, w, h });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{Op, RecordingCanvas};
    use super::*;

    #[test]
    fn test_centered_text_uses_estimate() {
        let mut canvas = RecordingCanvas::default();
        canvas.centered_text(100.0, 10.0, "abcd", TextStyle::regular(10.0));
        // 4 chars * 5pt = 20pt wide
        assert_eq!(
            canvas.ops[0],
            Op::Text {
                x: 90.0,
                y: 10.0,
                text: "abcd".into(),
                style: TextStyle::regular(10.0)
            }
        );
    }

    #[test]
    fn test_raster_pixel_lookup() {
        let image = RasterImage {
            width: 2,
            height: 1,
            rgb: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(image.pixel(1, 0), Some(Rgb::new(4, 5, 6)));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.aspect(), 2.0);
    }
}
