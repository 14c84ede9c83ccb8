use image::{Pixel, Rgba, RgbaImage};
use rand::Rng;
use rayon::prelude::*;

use std::ops::Range;

pub mod error;
pub mod mask;
pub mod matrix;
pub mod segment;
pub mod sorting;

pub use self::error::{Error, InvalidRange, Result};
pub use self::matrix::PixelMatrix;
use self::segment::{MaskRowSegments, SegmentConfig};

const CHANNELS: usize = <Rgba<u8> as Pixel>::CHANNEL_COUNT as usize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on worker threads, `None` uses the available parallelism.
    pub threads: Option<usize>,
}

/// Sorts every masked range of `image` by brightness.
///
/// `matrix` must have been extracted from `image` and `segments` must come
/// from a mask of the same dimensions. All ranges are checked before any row is touched, so
/// on error `image` is left as it was.
pub fn sort_pixels(
    image: &mut RgbaImage,
    matrix: PixelMatrix,
    segments: &MaskRowSegments,
    config: &EngineConfig,
) -> Result<()> {
    let (width, height) = image.dimensions();
    if matrix.dimensions() != (width, height) {
        return Err(Error::DimensionMismatch {
            what: "pixel matrix",
            expected: (width, height),
            found: matrix.dimensions(),
        });
    }
    if segments.width() != width as usize || segments.height() != height as usize {
        return Err(Error::DimensionMismatch {
            what: "mask segments",
            expected: (width, height),
            found: (segments.width() as u32, segments.height() as u32),
        });
    }
    segments.check(width as usize)?;
    if width == 0 || height == 0 {
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.unwrap_or(0))
        .thread_name(|idx| format!("maskmelt-row-{}", idx))
        .build()?;
    log::debug!(
        "sorting {} ranges over {} rows on {} threads",
        segments.range_count(),
        height,
        pool.current_num_threads()
    );

    let buffer: &mut [u8] = &mut *image;
    let failures: Vec<InvalidRange> = pool.install(|| {
        matrix
            .into_rows()
            .into_par_iter()
            .zip(buffer.par_chunks_mut(width as usize * CHANNELS))
            .zip(segments.rows().par_iter())
            .enumerate()
            .filter_map(|(y, ((pixels, out), ranges))| sort_row(y, pixels, out, ranges).err())
            .collect()
    });
    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidRanges(failures))
    }
}

// Sorts the ranges of one row in order, writing each back into `out` before
// moving on to the next.
fn sort_row(
    y: usize,
    mut pixels: Vec<Rgba<u8>>,
    out: &mut [u8],
    ranges: &[Range<usize>],
) -> Result<(), InvalidRange> {
    for range in ranges {
        // Re-checked per row so a bad range fails its own task instead of panicking.
        if let Some(invalid) = InvalidRange::check(y, range, pixels.len()) {
            return Err(invalid);
        }
        let sorted = &mut pixels[range.clone()];
        sorting::sort_by_brightness(sorted);
        for (slot, pixel) in out
            .chunks_exact_mut(CHANNELS)
            .skip(range.start)
            .zip(sorted.iter())
        {
            slot.copy_from_slice(pixel.channels());
        }
    }
    log::trace!("row {}: sorted {} ranges", y, ranges.len());
    Ok(())
}

/// Segments `mask`, then sorts the selected ranges of `image` in place.
///
/// `mask` must already have the dimensions of `image`, see [`mask::fit`].
pub fn melt<R>(
    image: &mut RgbaImage,
    mask: &RgbaImage,
    segment_config: &SegmentConfig,
    engine_config: &EngineConfig,
    rng: &mut R,
) -> Result<()>
where
    R: Rng + ?Sized,
{
    if mask.dimensions() != image.dimensions() {
        return Err(Error::DimensionMismatch {
            what: "mask",
            expected: image.dimensions(),
            found: mask.dimensions(),
        });
    }
    let segments = segment::segment_mask(mask, segment_config, rng)?;
    let matrix = PixelMatrix::from_image(image);
    sort_pixels(image, matrix, &segments, engine_config)
}
