use super::canvas::RasterImage;
use crate::color::Rgb;
use crate::error::Result;
use image::imageops::FilterType;
use image::{Rgb as Pixel, RgbImage, RgbaImage};
use std::path::Path;

/// Opens an image and shrinks it to fit `max_width × max_height` pixels,
/// keeping the aspect ratio. Smaller images are left alone.
pub fn load_image(path: &Path, max_width: u32, max_height: u32) -> Result<RgbaImage> {
    let mut image = image::open(path)?;
    if image.width() > max_width || image.height() > max_height {
        image = image.resize(max_width.max(1), max_height.max(1), FilterType::Triangle);
    }
    Ok(image.to_rgba8())
}

/// Flattens `image` onto `background`, fading it out towards the edges.
///
/// Per pixel, `alpha = min(1, edge_distance / feather) * opacity`, further
/// scaled by the pixel's own alpha. `feather = 0` gives a uniform blend.
pub fn apply_edge_gradient(image: &RgbaImage, background: Rgb, feather: u32, opacity: f32) -> RasterImage {
    let (width, height) = image.dimensions();
    let opacity = opacity.clamp(0.0, 1.0);
    let bg = [background.r, background.g, background.b];

    let flattened = RgbImage::from_fn(width, height, |x, y| {
        let px = image.get_pixel(x, y).0;
        let edge = x.min(y).min(width - 1 - x).min(height - 1 - y);
        let fade = if feather == 0 {
            1.0
        } else {
            (edge as f32 / feather as f32).min(1.0)
        };
        let alpha = fade * opacity * (px[3] as f32 / 255.0);
        let blend = |c: usize| (bg[c] as f32 + (px[c] as f32 - bg[c] as f32) * alpha).round() as u8;
        Pixel([blend(0), blend(1), blend(2)])
    });

    RasterImage::from_rgb(flattened)
}

/// Largest box with the image's aspect ratio inside `width × height`,
/// centred. Returns `(x, y, w, h)` relative to the box origin.
pub fn fit_box(aspect: f32, width: f32, height: f32) -> (f32, f32, f32, f32) {
    if aspect <= 0.0 || width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0, width.max(0.0), height.max(0.0));
    }
    let (w, h) = if width / height > aspect {
        (height * aspect, height)
    } else {
        (width, width / aspect)
    };
    ((width - w) / 2.0, (height - h) / 2.0, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use image::Rgba;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))
    }

    #[test]
    fn test_edges_fade_to_background() {
        let masked = apply_edge_gradient(&solid(21, 21), Rgb::WHITE, 5, 1.0);
        assert_eq!(masked.pixel(0, 0), Some(Rgb::WHITE));
        assert_eq!(masked.pixel(10, 10), Some(Rgb::BLACK));
        // 2/5 of the way in
        assert_eq!(masked.pixel(2, 10), Some(Rgb::new(153, 153, 153)));
    }

    #[test]
    fn test_zero_feather_is_uniform_opacity() {
        let masked = apply_edge_gradient(&solid(4, 4), Rgb::WHITE, 0, 0.5);
        for (x, y) in [(0, 0), (3, 3), (1, 2)] {
            assert_eq!(masked.pixel(x, y), Some(Rgb::new(128, 128, 128)));
        }
    }

    #[test]
    fn test_transparent_pixels_show_background() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        let masked = apply_edge_gradient(&image, Rgb::new(10, 20, 30), 0, 1.0);
        assert_eq!(masked.pixel(1, 1), Some(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn test_load_shrinks_large_images() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("art.png");
        RgbImage::from_pixel(400, 200, Pixel([9, 9, 9])).save(&path)?;

        let image = load_image(&path, 100, 100)?;
        assert_eq!(image.dimensions(), (100, 50));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_recoverable() {
        let err = load_image(Path::new("/nonexistent/art.png"), 10, 10).unwrap_err();
        assert!(matches!(err, CoreError::Image(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_fit_box() {
        assert_eq!(fit_box(2.0, 100.0, 100.0), (0.0, 25.0, 100.0, 50.0));
        assert_eq!(fit_box(0.5, 100.0, 100.0), (25.0, 0.0, 50.0, 100.0));
    }
}
