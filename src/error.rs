use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{what} has dimensions {found:?} but the image has {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("{} invalid range(s), first: {}", .0.len(), first(.0))]
    InvalidRanges(Vec<InvalidRange>),
    #[error("split chance must lie in [0, 1], got {0}")]
    SplitChance(f64),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

fn first(ranges: &[InvalidRange]) -> String {
    ranges
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// A range that does not fit `0 <= start < end <= width` in its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRange {
    pub row: usize,
    pub start: usize,
    pub end: usize,
    pub width: usize,
}

impl InvalidRange {
    pub(crate) fn check(row: usize, range: &std::ops::Range<usize>, width: usize) -> Option<Self> {
        if range.start < range.end && range.end <= width {
            None
        } else {
            Some(InvalidRange {
                row,
                start: range.start,
                end: range.end,
                width,
            })
        }
    }
}

impl fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {}..{} outside of 0..{}",
            self.row, self.start, self.end, self.width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_overflowing_ranges_are_invalid() {
        assert!(InvalidRange::check(0, &(0..4), 4).is_none());
        assert!(InvalidRange::check(0, &(2..2), 4).is_some());
        assert!(InvalidRange::check(0, &(3..1), 4).is_some());
        assert_eq!(
            InvalidRange::check(7, &(1..5), 4),
            Some(InvalidRange { row: 7, start: 1, end: 5, width: 4 })
        );
    }

    #[test]
    fn aggregated_error_names_the_first_range() {
        let err = Error::InvalidRanges(vec![
            InvalidRange { row: 1, start: 0, end: 9, width: 8 },
            InvalidRange { row: 2, start: 4, end: 4, width: 8 },
        ]);
        assert_eq!(
            err.to_string(),
            "2 invalid range(s), first: row 1: 0..9 outside of 0..8"
        );
    }
}
