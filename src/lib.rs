use rand::Rng;

pub mod automaton;
pub mod backend;
pub mod buffer;
pub mod error;
pub mod interval;
pub mod ledger;
pub mod params;
pub mod pipeline;
pub mod shuffle;
pub mod snap;
pub mod sorting;
pub mod source;

pub use self::buffer::{Pixel, PixelBuffer};
pub use self::error::{Error, Result};
use self::interval::CutPoints;
pub use self::interval::{run_interval, IntervalMode, IntervalOutcome};
pub use self::params::{Preset, RunParameters};
use self::sorting::SortKey;

/// Sorts every interval of every row by `key`, leaving an interval untouched whenever the
/// percentage draw lands below `bypass`.
///
/// Column 0 of each output row is always reset to its original pixel, whatever the sort moved
/// there. A `bypass` of 100 or more leaves every interval as it is.
pub fn sort_image<R: Rng + ?Sized>(
    mut buffer: PixelBuffer,
    cuts: &[CutPoints],
    key: SortKey,
    bypass: f64,
    rng: &mut R,
) -> PixelBuffer {
    let sorting_function = key.function();
    // allocate buffer outside to prevent frequent reallocations
    let mut scratch: Vec<(f64, Pixel)> = Vec::new();
    for (row, set) in buffer.rows_mut().zip(cuts) {
        let width = row.len();
        let first = row.first().copied();
        for range in set.intervals() {
            let draw: u8 = rng.gen_range(0..=100);
            if bypass >= 100.0 || f64::from(draw) < bypass {
                continue;
            }
            let interval = &mut row[range.start.min(width)..range.end.min(width)];
            scratch.extend(interval.iter().map(|pixel| (sorting_function(pixel), *pixel)));
            // stable, so equal keys keep their order
            scratch.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (slot, (_, pixel)) in interval.iter_mut().zip(scratch.drain(..)) {
                *slot = pixel;
            }
        }
        if let (Some(slot), Some(first)) = (row.first_mut(), first) {
            *slot = first;
        }
    }
    buffer
}
