//! Row-major pixel storage handed between the pipeline stages.

use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

pub type Pixel = Rgba<u8>;

/// Fully transparent black, the value snapped pixels are replaced with.
pub const TRANSPARENT: Pixel = Rgba([0, 0, 0, 0]);

/// A rectangular grid of RGBA pixels stored as a sequence of rows.
///
/// The dimensions are fixed at construction. Stages that reorder pixels consume
/// the buffer and build a new one instead of resizing it in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    rows: Vec<Vec<Pixel>>,
    width: usize,
}

impl PixelBuffer {
    pub fn from_image(image: &RgbaImage) -> Self {
        let rows = image
            .rows()
            .map(|row| row.copied().collect::<Vec<_>>())
            .collect();
        PixelBuffer {
            rows,
            width: image.width() as usize,
        }
    }

    /// Builds a buffer from raw rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(Error::RaggedRows {
                row,
                expected: width,
                found,
            });
        }
        Ok(PixelBuffer { rows, width })
    }

    pub fn to_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width as u32, self.height() as u32);
        for (y, row) in self.rows.iter().enumerate() {
            for (x, pixel) in row.iter().enumerate() {
                image.put_pixel(x as u32, y as u32, *pixel);
            }
        }
        image
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Pixel>] {
        &self.rows
    }

    /// Mutable access to the rows as fixed-length slices.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [Pixel]> {
        self.rows.iter_mut().map(Vec::as_mut_slice)
    }

    pub fn into_rows(self) -> Vec<Vec<Pixel>> {
        self.rows
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the buffer.
    pub fn get(&self, x: usize, y: usize) -> Pixel {
        self.rows[y][x]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the buffer.
    pub fn put(&mut self, x: usize, y: usize, pixel: Pixel) {
        self.rows[y][x] = pixel;
    }
}
