use image::{Rgba, RgbaImage};

use std::ops::Index;

/// Row-major copy of an image's pixels, addressed by row and column.
///
/// This is the working buffer the sort engine reorders before writing the
/// results back into the image it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMatrix {
    width: u32,
    rows: Vec<Vec<Rgba<u8>>>,
}

impl PixelMatrix {
    pub fn from_image(image: &RgbaImage) -> Self {
        PixelMatrix {
            width: image.width(),
            rows: (0..image.height())
                .map(|y| (0..image.width()).map(|x| *image.get_pixel(x, y)).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn row(&self, y: u32) -> Option<&[Rgba<u8>]> {
        self.rows.get(y as usize).map(Vec::as_slice)
    }

    pub fn row_mut(&mut self, y: u32) -> Option<&mut [Rgba<u8>]> {
        self.rows.get_mut(y as usize).map(Vec::as_mut_slice)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Rgba<u8>> {
        self.row(y)?.get(x as usize)
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<Rgba<u8>>> {
        self.rows
    }
}

impl Index<(u32, u32)> for PixelMatrix {
    type Output = Rgba<u8>;

    /// Indexes by `(x, y)`, the same order as `GenericImageView::get_pixel`.
    fn index(&self, (x, y): (u32, u32)) -> &Rgba<u8> {
        &self.rows[y as usize][x as usize]
    }
}
