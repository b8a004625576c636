//! Snap: erase exactly half of the pixels, then look for edges in what is left.

use rand::seq::index;
use rand::Rng;

use crate::backend::ScratchImage;
use crate::buffer::{PixelBuffer, TRANSPARENT};
use crate::error::Result;
use crate::interval::{self, CutPoints};
use crate::params::RunParameters;
use crate::sort_image;

/// Picks `floor(width * height / 2)` distinct coordinates uniformly at random.
pub fn select_half<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Vec<(usize, usize)> {
    let total = width * height;
    index::sample(rng, total, total / 2)
        .into_iter()
        .map(|idx| (idx % width, idx / width))
        .collect()
}

/// Replaces a random half of the pixels with transparent black.
pub fn snap<R: Rng + ?Sized>(mut buffer: PixelBuffer, rng: &mut R) -> PixelBuffer {
    let chosen = select_half(buffer.width(), buffer.height(), rng);
    log::info!("snapping {} of {} pixels", chosen.len(), buffer.width() * buffer.height());
    for (x, y) in chosen {
        buffer.put(x, y, TRANSPARENT);
    }
    buffer
}

/// Sorts `buffer` along random intervals, snaps the result and computes edge intervals on the
/// snapped raster. Returns the snapped buffer together with those intervals.
pub fn snap_sort<R: Rng + ?Sized>(
    buffer: PixelBuffer,
    params: &RunParameters,
    rng: &mut R,
) -> Result<(PixelBuffer, Vec<CutPoints>)> {
    let cuts = interval::random(&buffer, params.characteristic_length, rng);
    let sorted = sort_image(buffer, &cuts, params.sort_key, params.randomness, rng);
    let snapped = snap(sorted, rng);

    let reloaded = if snapped.width() == 0 || snapped.height() == 0 {
        // png cannot hold an empty raster
        snapped.to_image()
    } else {
        let scratch = ScratchImage::write(&snapped.to_image(), "snapped")?;
        let reloaded = scratch.reload()?;
        scratch.close()?;
        reloaded
    };

    let (width, height) = (reloaded.width() as usize, reloaded.height() as usize);
    let cuts = interval::edges(&reloaded, width, height, params.bottom_threshold);
    Ok((PixelBuffer::from_image(&reloaded), cuts))
}
