use rand::seq::SliceRandom;
use rand::Rng;

use crate::buffer::PixelBuffer;
use crate::error::Result;

/// Shuffles the pixels of every row independently.
pub fn total<R: Rng + ?Sized>(mut buffer: PixelBuffer, rng: &mut R) -> PixelBuffer {
    for row in buffer.rows_mut() {
        row.shuffle(rng);
    }
    buffer
}

/// Shuffles whole rows, leaving the content of each row untouched.
pub fn axis<R: Rng + ?Sized>(buffer: PixelBuffer, rng: &mut R) -> Result<PixelBuffer> {
    let mut rows = buffer.into_rows();
    rows.shuffle(rng);
    PixelBuffer::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> PixelBuffer {
        let image = RgbaImage::from_fn(9, 6, |x, y| Rgba([x as u8, y as u8, (x * y) as u8, 255]));
        PixelBuffer::from_image(&image)
    }

    fn sorted<T: Ord + Clone>(items: &[T]) -> Vec<T> {
        let mut items = items.to_vec();
        items.sort();
        items
    }

    #[test]
    fn total_keeps_each_row_multiset() {
        let input = sample();
        let output = total(input.clone(), &mut StdRng::seed_from_u64(2));
        assert_eq!(output.width(), input.width());
        for (before, after) in input.rows().iter().zip(output.rows()) {
            let key = |row: &[Rgba<u8>]| sorted(&row.iter().map(|p| p.0).collect::<Vec<_>>());
            assert_eq!(key(before), key(after));
        }
    }

    #[test]
    fn axis_keeps_rows_whole() {
        let input = sample();
        let output = axis(input.clone(), &mut StdRng::seed_from_u64(2)).unwrap();
        let key = |buffer: &PixelBuffer| {
            sorted(
                &buffer
                    .rows()
                    .iter()
                    .map(|row| row.iter().map(|p| p.0).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
            )
        };
        assert_eq!(key(&input), key(&output));
    }
}
