use image::RgbaImage;
use rand::Rng;

use std::ops::Range;

use crate::error::{Error, InvalidRange, Result};

/// Chance that an opaque pixel inside an open run cuts the run short.
pub const DEFAULT_SPLIT_CHANCE: f64 = 0.05;

/// What happens to a run that is still open when its row ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingRun {
    /// Discard it. Only runs closed by a transparent pixel or a random split
    /// are sorted, which leaves the right edge of opaque rows untouched.
    Drop,
    /// Close it at the row's end like a transparent pixel would.
    Close,
}

impl Default for TrailingRun {
    fn default() -> Self {
        TrailingRun::Drop
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    pub split_chance: f64,
    pub trailing_run: TrailingRun,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        SegmentConfig {
            split_chance: DEFAULT_SPLIT_CHANCE,
            trailing_run: TrailingRun::default(),
        }
    }
}

impl SegmentConfig {
    pub fn validate(&self) -> Result<()> {
        if (0.0..=1.0).contains(&self.split_chance) {
            Ok(())
        } else {
            Err(Error::SplitChance(self.split_chance))
        }
    }

    fn split<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.split_chance > 0.0 && rng.gen::<f64>() < self.split_chance
    }
}

/// The column ranges to sort, one left-to-right list per image row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskRowSegments {
    width: usize,
    rows: Vec<Vec<Range<usize>>>,
}

impl MaskRowSegments {
    /// Wraps precomputed ranges without checking them, see [`check`](Self::check).
    pub fn from_rows(width: usize, rows: Vec<Vec<Range<usize>>>) -> Self {
        MaskRowSegments { width, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, y: usize) -> Option<&[Range<usize>]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Range<usize>]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub(crate) fn rows(&self) -> &[Vec<Range<usize>>] {
        &self.rows
    }

    pub fn range_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Collects every range that is empty, reversed or reaches past `width`.
    pub fn check(&self, width: usize) -> Result<()> {
        let invalid: Vec<_> = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(row, ranges)| {
                ranges
                    .iter()
                    .filter_map(move |range| InvalidRange::check(row, range, width))
            })
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidRanges(invalid))
        }
    }
}

/// Splits every row of `mask` into runs of non-transparent pixels.
///
/// A run opens at the first opaque pixel and closes at the next transparent
/// one. While a run is open each further opaque pixel may end it early with
/// probability `config.split_chance`; that pixel is left out and the next
/// opaque pixel opens a fresh run. Runs reaching the end of a row are handled
/// according to `config.trailing_run`.
pub fn segment_mask<R>(mask: &RgbaImage, config: &SegmentConfig, rng: &mut R) -> Result<MaskRowSegments>
where
    R: Rng + ?Sized,
{
    config.validate()?;
    let (width, height) = mask.dimensions();
    let rows: Vec<_> = (0..height)
        .map(|y| {
            let alphas = (0..width).map(|x| mask.get_pixel(x, y)[3]);
            segment_row(alphas, config, &mut *rng)
        })
        .collect();
    let segments = MaskRowSegments::from_rows(width as usize, rows);
    log::debug!(
        "segmented {}x{} mask into {} ranges",
        width,
        height,
        segments.range_count()
    );
    Ok(segments)
}

fn segment_row<I, R>(alphas: I, config: &SegmentConfig, rng: &mut R) -> Vec<Range<usize>>
where
    I: IntoIterator<Item = u8>,
    R: Rng + ?Sized,
{
    let mut ranges = Vec::new();
    let mut run = None;
    let mut width = 0;
    for (x, alpha) in alphas.into_iter().enumerate() {
        width = x + 1;
        match (alpha, run) {
            (0, Some(start)) => {
                ranges.push(start..x);
                run = None;
            }
            (0, None) => (),
            (_, None) => run = Some(x),
            (_, Some(start)) => {
                if config.split(rng) {
                    ranges.push(start..x);
                    run = None;
                }
            }
        }
    }
    if let (Some(start), TrailingRun::Close) = (run, config.trailing_run) {
        ranges.push(start..width);
    }
    ranges
}
