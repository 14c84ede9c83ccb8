//! Producing masks that line up with the image being sorted.
//!
//! Only the alpha channel of a mask matters: any non-zero alpha selects the
//! pixel for sorting.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// A mask selecting every pixel.
pub fn opaque(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

/// Scales `mask` onto a `width`x`height` canvas, keeping its aspect ratio.
///
/// Wide masks are scaled to `width`, all others to `height`. The result is
/// anchored at the top-left corner; whatever overflows is cropped and whatever
/// is left uncovered stays transparent.
pub fn fit(mask: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (mask_width, mask_height) = mask.dimensions();
    if (mask_width, mask_height) == (width, height) {
        return mask.clone();
    }
    let mut canvas = RgbaImage::new(width, height);
    if mask_width == 0 || mask_height == 0 || width == 0 || height == 0 {
        return canvas;
    }

    let ratio = mask_width as f64 / mask_height as f64;
    let (fit_width, fit_height) = if ratio > 1.0 {
        (width, scale(mask_height, width, mask_width))
    } else {
        (scale(mask_width, height, mask_height), height)
    };
    log::debug!(
        "fitting {}x{} mask to {}x{} via {}x{}",
        mask_width,
        mask_height,
        width,
        height,
        fit_width,
        fit_height
    );
    let scaled = imageops::resize(mask, fit_width, fit_height, FilterType::Lanczos3);
    imageops::replace(&mut canvas, &scaled, 0, 0);
    canvas
}

fn scale(len: u32, to: u32, from: u32) -> u32 {
    ((len as f64 * to as f64 / from as f64).round() as u32).max(1)
}

/// A mask selecting the Canny edges of `image`.
#[cfg(feature = "imageproc")]
pub fn from_edges(image: &RgbaImage, low_thresh: f32, high_thresh: f32) -> RgbaImage {
    let gray = imageops::colorops::grayscale(image);
    let edges = imageproc::edges::canny(&gray, low_thresh, high_thresh);
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        Rgba([255, 255, 255, edges.get_pixel(x, y)[0]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let alpha = if (x / 2 + y / 2) % 2 == 0 { 255 } else { 0 };
            Rgba([0, 0, 0, alpha])
        })
    }

    #[test]
    fn fitted_mask_matches_target_dimensions() {
        for &(mask, target) in &[
            ((40, 10), (30, 30)),
            ((10, 40), (30, 30)),
            ((20, 20), (50, 10)),
            ((7, 3), (300, 2)),
            ((3, 7), (2, 300)),
        ] {
            let fitted = fit(&checker(mask.0, mask.1), target.0, target.1);
            assert_eq!(fitted.dimensions(), target);
        }
    }

    #[test]
    fn wide_mask_leaves_bottom_transparent() {
        let fitted = fit(&opaque(40, 10), 20, 20);
        assert!(fitted.get_pixel(10, 2)[3] > 0);
        assert_eq!(fitted.get_pixel(10, 15)[3], 0);
    }

    #[test]
    fn tall_mask_leaves_right_side_transparent() {
        let fitted = fit(&opaque(10, 40), 20, 20);
        assert!(fitted.get_pixel(2, 10)[3] > 0);
        assert_eq!(fitted.get_pixel(15, 10)[3], 0);
    }

    #[test]
    fn matching_mask_is_unchanged() {
        let mask = checker(9, 5);
        assert_eq!(fit(&mask, 9, 5), mask);
    }

    #[test]
    fn empty_mask_fits_as_transparent() {
        let fitted = fit(&RgbaImage::new(0, 0), 4, 3);
        assert_eq!(fitted.dimensions(), (4, 3));
        assert!(fitted.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn opaque_selects_everything() {
        assert!(opaque(5, 5).pixels().all(|p| p[3] == 255));
    }

    #[cfg(feature = "imageproc")]
    #[test]
    fn edges_are_opaque() {
        let image = RgbaImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let mask = from_edges(&image, 50.0, 100.0);
        assert_eq!(mask.dimensions(), (32, 32));
        assert!(mask.pixels().any(|p| p[3] != 0));
        assert_eq!(mask.get_pixel(2, 16)[3], 0);
        assert_eq!(mask.get_pixel(29, 16)[3], 0);
    }
}
