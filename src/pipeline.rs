//! The whole transform: rotate, find intervals, sort, rotate back.

use image::RgbaImage;
use rand::Rng;

use crate::error::Result;
use crate::interval::{run_interval, IntervalMode, IntervalOutcome};
use crate::{backend, sort_image, PixelBuffer, RunParameters};

/// Pixel sorts `image` along `params.angle` using the interval function `mode`.
///
/// The result has the dimensions of `image`. Rotated runs are turned back and the expanded
/// canvas is cropped around its centre.
pub fn pixelsort<R: Rng + ?Sized>(
    image: &RgbaImage,
    mode: IntervalMode,
    params: &RunParameters,
    rng: &mut R,
) -> Result<RgbaImage> {
    log::debug!("rotating input by {} degrees", params.angle);
    let rotated = backend::rotate(image, params.angle);
    let buffer = PixelBuffer::from_image(&rotated);

    let sorted = match run_interval(mode, &buffer, params, rng)? {
        IntervalOutcome::Cuts(cuts) => {
            log::debug!("sorting {} rows by {}", cuts.len(), params.sort_key);
            sort_image(buffer, &cuts, params.sort_key, params.randomness, rng)
        }
        IntervalOutcome::Shuffled(shuffled) => {
            log::info!("image shuffled, skipping sort");
            shuffled
        }
        IntervalOutcome::Snapped { buffer, .. } => {
            log::info!("perfectly balanced, as all things should be");
            buffer
        }
    };

    let mut output = sorted.to_image();
    if params.angle != 0.0 {
        log::debug!("rotating output back to its original orientation");
        output = backend::rotate(&output, 360.0 - params.angle);
        output = backend::crop_center(&output, image.width(), image.height());
    }
    Ok(output)
}
