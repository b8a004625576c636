//! Interval functions: each one decides, per row, where the sortable runs of pixels end.

use image::RgbaImage;
use rand::Rng;

use std::ops::Range;
use std::{fmt, str};

use crate::automaton::Automaton;
use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::params::RunParameters;
use crate::sorting::lightness;
use crate::{backend, shuffle, snap};

/// The column boundaries of a single row.
///
/// Cut points only ever grow to the right and the last one is always the row width, so
/// consecutive pairs describe the half-open intervals `[x_min, x_max)` covering the row.
/// Repeated bounds are allowed and describe empty intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutPoints(Vec<usize>);

impl CutPoints {
    /// A single interval spanning the whole row.
    pub fn new(width: usize) -> Self {
        CutPoints(vec![width])
    }

    /// Wraps raw cut points without checking the sentinel.
    pub fn from_vec(vec: Vec<usize>) -> Self {
        CutPoints(vec)
    }

    pub fn cuts_from_buffer(buffer: &PixelBuffer) -> Vec<CutPoints> {
        (0..buffer.height())
            .map(|_| CutPoints::new(buffer.width()))
            .collect()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn end(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// The intervals between consecutive cut points, starting at column 0.
    pub fn intervals<'this>(&'this self) -> impl Iterator<Item = Range<usize>> + 'this {
        let starts = std::iter::once(0).chain(self.0.iter().copied());
        starts
            .zip(self.0.iter().copied())
            .map(|(start, end)| start..end.max(start))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IntervalMode {
    #[default]
    Random,
    Threshold,
    Edges,
    Waves,
    Snap,
    File,
    FileEdges,
    ShuffleTotal,
    ShuffleAxis,
    None,
}

impl IntervalMode {
    pub const ALL: [IntervalMode; 10] = [
        IntervalMode::Random,
        IntervalMode::Threshold,
        IntervalMode::Edges,
        IntervalMode::Waves,
        IntervalMode::Snap,
        IntervalMode::ShuffleTotal,
        IntervalMode::ShuffleAxis,
        IntervalMode::File,
        IntervalMode::FileEdges,
        IntervalMode::None,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntervalMode::Random => "random",
            IntervalMode::Threshold => "threshold",
            IntervalMode::Edges => "edges",
            IntervalMode::Waves => "waves",
            IntervalMode::Snap => "snap",
            IntervalMode::File => "file",
            IntervalMode::FileEdges => "file-edges",
            IntervalMode::ShuffleTotal => "shuffle-total",
            IntervalMode::ShuffleAxis => "shuffle-axis",
            IntervalMode::None => "none",
        }
    }

    /// Parses `name`, falling back to [`IntervalMode::Random`] for anything unknown.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|unknown| {
            log::warn!("unknown interval function `{}`, using random", unknown);
            IntervalMode::Random
        })
    }

    /// Picks one of the run-based modes, as offered by the "random select" menu entry.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        IntervalMode::ALL[rng.gen_range(0..4)]
    }

    /// Whether the mode produces its final pixels itself instead of handing cut points to
    /// the row sorter.
    pub fn bypasses_sorter(self) -> bool {
        matches!(
            self,
            IntervalMode::Snap | IntervalMode::ShuffleTotal | IntervalMode::ShuffleAxis
        )
    }
}

impl str::FromStr for IntervalMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        IntervalMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| String::from(s))
    }
}

impl fmt::Display for IntervalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What an interval function hands back to the pipeline.
#[derive(Debug, Clone)]
pub enum IntervalOutcome {
    /// Cut points for the row sorter.
    Cuts(Vec<CutPoints>),
    /// A pixel buffer that already is the final result.
    Shuffled(PixelBuffer),
    /// The snapped buffer, together with the edge intervals found on it.
    Snapped {
        buffer: PixelBuffer,
        cuts: Vec<CutPoints>,
    },
}

impl IntervalOutcome {
    pub fn cuts(&self) -> Option<&[CutPoints]> {
        match self {
            IntervalOutcome::Cuts(cuts) | IntervalOutcome::Snapped { cuts, .. } => Some(cuts),
            IntervalOutcome::Shuffled(_) => None,
        }
    }
}

/// Runs the interval function selected by `mode` over `buffer`.
pub fn run_interval<R: Rng + ?Sized>(
    mode: IntervalMode,
    buffer: &PixelBuffer,
    params: &RunParameters,
    rng: &mut R,
) -> Result<IntervalOutcome> {
    log::debug!("determining intervals with `{}`", mode);
    let outcome = match mode {
        IntervalMode::Random => {
            IntervalOutcome::Cuts(random(buffer, params.characteristic_length, rng))
        }
        IntervalMode::Waves => {
            IntervalOutcome::Cuts(waves(buffer, params.characteristic_length, rng))
        }
        IntervalMode::Threshold => IntervalOutcome::Cuts(threshold(
            buffer,
            params.bottom_threshold,
            params.upper_threshold,
        )),
        IntervalMode::Edges => IntervalOutcome::Cuts(edges(
            &buffer.to_image(),
            buffer.width(),
            buffer.height(),
            params.bottom_threshold,
        )),
        IntervalMode::File => {
            let raster = automaton_raster(rng);
            IntervalOutcome::Cuts(file(buffer, &raster, params.bottom_threshold))
        }
        IntervalMode::FileEdges => {
            let raster = automaton_raster(rng);
            IntervalOutcome::Cuts(file_edges(buffer, &raster, params))
        }
        IntervalMode::ShuffleTotal => {
            IntervalOutcome::Shuffled(shuffle::total(buffer.clone(), rng))
        }
        IntervalMode::ShuffleAxis => {
            IntervalOutcome::Shuffled(shuffle::axis(buffer.clone(), rng)?)
        }
        IntervalMode::Snap => {
            let (buffer, cuts) = snap::snap_sort(buffer.clone(), params, rng)?;
            IntervalOutcome::Snapped { buffer, cuts }
        }
        IntervalMode::None => IntervalOutcome::Cuts(none(buffer)),
    };
    Ok(outcome)
}

fn automaton_raster<R: Rng + ?Sized>(rng: &mut R) -> RgbaImage {
    let automaton = Automaton::random(rng);
    log::info!("generated mask automaton {}", automaton.describe());
    automaton.render(&automaton.generate(rng))
}

/// Cuts wherever a pixel is darker than `low` or brighter than `high`.
pub fn threshold(buffer: &PixelBuffer, low: f64, high: f64) -> Vec<CutPoints> {
    buffer
        .rows()
        .iter()
        .map(|row| {
            let mut cuts: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|(_, pixel)| {
                    let l = lightness(pixel);
                    l < low || l > high
                })
                .map(|(x, _)| x)
                .collect();
            cuts.push(row.len());
            CutPoints(cuts)
        })
        .collect()
}

/// Accumulates widths drawn by `width` until the row is exhausted.
fn running_sum<R, F>(buffer: &PixelBuffer, rng: &mut R, mut width: F) -> Vec<CutPoints>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> usize,
{
    let row_width = buffer.width();
    (0..buffer.height())
        .map(|_| {
            let mut cuts = Vec::new();
            let mut acc = 0;
            loop {
                acc = width(rng).saturating_add(acc);
                if acc > row_width {
                    cuts.push(row_width);
                    break;
                }
                cuts.push(acc);
            }
            CutPoints(cuts)
        })
        .collect()
}

/// Runs of width `floor(clength * (1 - U))` with `U` uniform in `[0, 1)`.
pub fn random<R: Rng + ?Sized>(
    buffer: &PixelBuffer,
    clength: usize,
    rng: &mut R,
) -> Vec<CutPoints> {
    if clength <= 1 {
        // every draw would be zero and the running sum would never leave the row
        return none(buffer);
    }
    running_sum(buffer, rng, |rng| {
        (clength as f64 * (1.0 - rng.gen::<f64>())).floor() as usize
    })
}

/// Runs of width `clength + k` with `k` uniform in `0..=10`.
pub fn waves<R: Rng + ?Sized>(buffer: &PixelBuffer, clength: usize, rng: &mut R) -> Vec<CutPoints> {
    running_sum(buffer, rng, |rng| clength.saturating_add(rng.gen_range(0..=10)))
}

/// One interval per row spanning the full width.
pub fn none(buffer: &PixelBuffer) -> Vec<CutPoints> {
    CutPoints::cuts_from_buffer(buffer)
}

/// Edge intervals of `source`: the raster is edge filtered, binarized and cleaned up before
/// every remaining black column becomes a cut point.
///
/// `source` is expected to already be in the frame of the buffer being sorted. Rows and
/// columns outside of `source` produce no cuts.
pub fn edges(source: &RgbaImage, width: usize, height: usize, low: f64) -> Vec<CutPoints> {
    let filtered = backend::find_edges(source);
    let mut mask = binarize(&filtered, width, height, low);
    clean_up(&mut mask);
    mask_cuts(&mask, width)
}

/// Cuts at the dark cells of a generated automaton raster stretched over the buffer.
pub fn file(buffer: &PixelBuffer, raster: &RgbaImage, low: f64) -> Vec<CutPoints> {
    let (width, height) = (buffer.width(), buffer.height());
    let resized = backend::resize(raster, width as u32, height as u32);
    let mut mask: Vec<Vec<bool>> = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| lightness(resized.get_pixel(x as u32, y as u32)) < low)
                .collect()
        })
        .collect();
    clean_up(&mut mask);
    mask_cuts(&mask, width)
}

/// Edge intervals of a generated automaton raster, rotated like the buffer and stretched over it.
pub fn file_edges(buffer: &PixelBuffer, raster: &RgbaImage, params: &RunParameters) -> Vec<CutPoints> {
    let (width, height) = (buffer.width(), buffer.height());
    let rotated = backend::rotate(raster, params.angle);
    let resized = backend::resize(&rotated, width as u32, height as u32);
    edges(&resized, width, height, params.bottom_threshold)
}

/// Binarizes `image` into boundary markers. A pixel darker than `low` reads as white, anything
/// else is a black marker (`true`).
fn binarize(image: &RgbaImage, width: usize, height: usize, low: f64) -> Vec<Vec<bool>> {
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| match image.get_pixel_checked(x as u32, y as u32) {
                    Some(pixel) => lightness(pixel) >= low,
                    None => false,
                })
                .collect()
        })
        .collect()
}

/// Whitens every black marker directly right of another black marker, so that a run of
/// boundary pixels yields a single cut. Rows `0..2` and columns `0..2` are left untouched.
fn clean_up(mask: &mut [Vec<bool>]) {
    for y in (2..mask.len()).rev() {
        let row = &mut mask[y];
        for x in (2..row.len()).rev() {
            if row[x] && row[x - 1] {
                row[x] = false;
            }
        }
    }
}

fn mask_cuts(mask: &[Vec<bool>], width: usize) -> Vec<CutPoints> {
    mask.iter()
        .map(|row| {
            let mut cuts: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|&(_, &black)| black)
                .map(|(x, _)| x)
                .collect();
            cuts.push(width);
            CutPoints(cuts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::buffer::Pixel;
    use image::Rgba;

    fn gray(level: u8) -> Pixel {
        Rgba([level, level, level, 255])
    }

    fn buffer(rows: Vec<Vec<Pixel>>) -> PixelBuffer {
        PixelBuffer::from_rows(rows).unwrap()
    }

    fn assert_well_formed(cuts: &[CutPoints], width: usize) {
        for row in cuts {
            assert_eq!(row.end(), width);
            assert!(row.as_slice().windows(2).all(|w| w[0] <= w[1]), "{:?}", row);
        }
    }

    #[test]
    fn intervals_cover_the_row() {
        let cuts = CutPoints::from_vec(vec![0, 2, 2, 5]);
        let intervals: Vec<_> = cuts.intervals().collect();
        assert_eq!(intervals, vec![0..0, 0..2, 2..2, 2..5]);
    }

    #[test]
    fn threshold_cuts_at_dark_and_bright_pixels() {
        let buffer = buffer(vec![vec![gray(0), gray(128), gray(255), gray(128)]]);
        let cuts = threshold(&buffer, 0.25, 0.8);
        assert_eq!(cuts, vec![CutPoints::from_vec(vec![0, 2, 4])]);
    }

    #[test]
    fn none_spans_each_row() {
        let buffer = buffer(vec![vec![gray(1)]; 3]);
        let cuts = none(&buffer);
        assert_eq!(cuts.len(), 3);
        assert!(cuts.iter().all(|row| row.as_slice() == [1]));
    }

    #[test]
    fn empty_image_yields_no_rows() {
        let buffer = PixelBuffer::from_rows(Vec::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random(&buffer, 10, &mut rng).is_empty());
        assert!(threshold(&buffer, 0.25, 0.8).is_empty());
        assert!(none(&buffer).is_empty());
    }

    #[test]
    fn narrow_rows_end_with_their_width() {
        let mut rng = StdRng::seed_from_u64(3);
        for width in 0..2 {
            let buffer = buffer(vec![vec![gray(9); width]; 2]);
            assert_well_formed(&random(&buffer, 4, &mut rng), width);
            assert_well_formed(&waves(&buffer, 4, &mut rng), width);
            assert_well_formed(&threshold(&buffer, 0.25, 0.8), width);
        }
    }

    #[test]
    fn random_runs_never_exceed_characteristic_length() {
        let mut rng = StdRng::seed_from_u64(42);
        let buffer = buffer(vec![vec![gray(9); 200]; 8]);
        let cuts = random(&buffer, 30, &mut rng);
        assert_well_formed(&cuts, 200);
        for row in &cuts {
            assert!(row.intervals().all(|range| range.len() <= 30));
        }
    }

    #[test]
    fn random_with_zero_length_is_one_interval() {
        let mut rng = StdRng::seed_from_u64(0);
        let buffer = buffer(vec![vec![gray(9); 12]]);
        assert_eq!(random(&buffer, 0, &mut rng), vec![CutPoints::new(12)]);
    }

    #[test]
    fn random_with_unit_length_is_one_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let buffer = buffer(vec![vec![gray(9); 8]; 2]);
        assert_eq!(random(&buffer, 1, &mut rng), vec![CutPoints::new(8); 2]);
    }

    #[test]
    fn waves_survive_huge_lengths() {
        let mut rng = StdRng::seed_from_u64(2);
        let buffer = buffer(vec![vec![gray(9); 5]]);
        assert_eq!(waves(&buffer, usize::MAX - 3, &mut rng), vec![CutPoints::new(5)]);
    }

    #[test]
    fn thresholds_are_exclusive_at_exact_levels() {
        // grey 51, 102 and 153 sit exactly on 0.2, 0.4 and 0.6
        for &(level, low) in &[(51, 0.2), (102, 0.4), (153, 0.6)] {
            let buffer = buffer(vec![vec![gray(level); 3]]);
            assert_eq!(threshold(&buffer, low, 0.8), vec![CutPoints::new(3)], "{}", level);
        }
        let buffer = buffer(vec![vec![gray(204); 3]]);
        assert_eq!(threshold(&buffer, 0.1, 0.8), vec![CutPoints::new(3)]);
    }

    #[test]
    fn waves_stay_within_ten_of_characteristic_length() {
        let mut rng = StdRng::seed_from_u64(7);
        let buffer = buffer(vec![vec![gray(9); 500]; 4]);
        let cuts = waves(&buffer, 20, &mut rng);
        assert_well_formed(&cuts, 500);
        for row in &cuts {
            let full: Vec<_> = row.intervals().collect();
            // the final interval is truncated by the row end
            for range in &full[..full.len() - 1] {
                assert!((20..=30).contains(&range.len()), "{:?}", range);
            }
        }
    }

    #[test]
    fn clean_up_keeps_first_of_each_run() {
        let mut mask = vec![vec![true; 6]; 3];
        mask[2][3] = false;
        clean_up(&mut mask);
        assert_eq!(mask[2], vec![true, true, false, false, true, false]);
        // the two top rows are never touched
        assert_eq!(mask[0], vec![true; 6]);
        assert_eq!(mask[1], vec![true; 6]);
    }

    #[test]
    fn edges_cut_at_a_vertical_boundary() {
        let image = RgbaImage::from_fn(8, 5, |x, _| if x < 4 { gray(0) } else { gray(255) });
        let cuts = edges(&image, 8, 5, 0.25);
        assert_well_formed(&cuts, 8);
        // the boundary collapses to one cut, the bright right border column adds another
        for row in &cuts[2..4] {
            assert_eq!(row.as_slice(), [4, 7, 8]);
        }
    }

    #[test]
    fn flat_image_only_cuts_at_its_border() {
        let image = RgbaImage::from_pixel(6, 4, gray(200));
        let cuts = edges(&image, 6, 4, 0.25);
        assert_well_formed(&cuts, 6);
        assert_eq!(cuts[0].as_slice(), [0, 1, 2, 3, 4, 5, 6]);
        for row in &cuts[1..3] {
            assert_eq!(row.as_slice(), [0, 5, 6]);
        }
        // the bottom border row is cleaned down to its first two markers
        assert_eq!(cuts[3].as_slice(), [0, 1, 6]);
    }

    #[test]
    fn dark_border_makes_no_cuts() {
        let image = RgbaImage::from_pixel(6, 4, gray(20));
        let cuts = edges(&image, 6, 4, 0.25);
        assert!(cuts.iter().all(|row| row.as_slice() == [6]));
    }

    #[test]
    fn file_cuts_at_dark_cells() {
        let raster = RgbaImage::from_fn(6, 4, |x, _| if x == 3 { gray(0) } else { gray(255) });
        let buffer = buffer(vec![vec![gray(9); 6]; 4]);
        let cuts = file(&buffer, &raster, 0.25);
        assert!(cuts.iter().all(|row| row.as_slice() == [3, 6]));
    }

    #[test]
    fn names_parse_leniently() {
        for mode in IntervalMode::ALL.iter() {
            assert_eq!(IntervalMode::from_name_lenient(mode.name()), *mode);
        }
        assert_eq!(IntervalMode::from_name_lenient("spiral"), IntervalMode::Random);
        assert!(IntervalMode::Snap.bypasses_sorter());
        assert!(!IntervalMode::Edges.bypasses_sorter());
    }
}
