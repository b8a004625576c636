//! Run configuration and the built-in presets.

use rand::Rng;

use std::{fmt, str};

use crate::interval::IntervalMode;
use crate::sorting::SortKey;

/// Everything an interval function or the sorter may look at during a run.
///
/// Values are taken as given: thresholds outside `0.0..=1.0` simply produce full-row or
/// empty intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct RunParameters {
    /// Pixels darker than this are boundaries (`threshold`) or non-edges (`edges`).
    pub bottom_threshold: f64,
    /// Pixels brighter than this are boundaries (`threshold`).
    pub upper_threshold: f64,
    /// Characteristic run length for `random`, `waves` and `snap`.
    pub characteristic_length: usize,
    /// Degrees to rotate the image by before sorting.
    pub angle: f32,
    /// Percentage of intervals left unsorted.
    pub randomness: f64,
    pub sort_key: SortKey,
    /// Where the image came from, kept for the run ledger.
    pub source: String,
}

impl Default for RunParameters {
    fn default() -> Self {
        RunParameters {
            bottom_threshold: 0.25,
            upper_threshold: 0.8,
            characteristic_length: 50,
            angle: 0.0,
            randomness: 15.0,
            sort_key: SortKey::Lightness,
            source: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Main,
    MainFile,
    FullRandom,
    SnapSort,
}

/// Parameter overrides produced by a preset. `None` leaves the caller's value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresetChoice {
    pub mode: IntervalMode,
    pub sort_key: SortKey,
    pub mode_randomized: bool,
    pub sort_randomized: bool,
    pub bottom_threshold: Option<f64>,
    pub upper_threshold: Option<f64>,
    pub characteristic_length: Option<usize>,
    pub angle: Option<f32>,
    pub randomness: Option<f64>,
}

impl PresetChoice {
    pub fn apply(&self, params: &mut RunParameters) {
        if let Some(v) = self.bottom_threshold {
            params.bottom_threshold = v;
        }
        if let Some(v) = self.upper_threshold {
            params.upper_threshold = v;
        }
        if let Some(v) = self.characteristic_length {
            params.characteristic_length = v;
        }
        if let Some(v) = self.angle {
            params.angle = v;
        }
        if let Some(v) = self.randomness {
            params.randomness = v;
        }
        params.sort_key = self.sort_key;
    }
}

/// Uniform draw from `start, start + step, ...` below `end`.
fn step_range<R: Rng + ?Sized>(rng: &mut R, start: u32, end: u32, step: u32) -> u32 {
    start + step * rng.gen_range(0..(end - start + step - 1) / step)
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Preset::Main => "main",
            Preset::MainFile => "main file",
            Preset::FullRandom => "full random",
            Preset::SnapSort => "snap-sort",
        }
    }

    /// Looks up a preset, warning and returning `None` for unknown names.
    pub fn from_name_lenient(name: &str) -> Option<Self> {
        match name.parse() {
            Ok(preset) => Some(preset),
            Err(unknown) => {
                log::warn!("invalid preset name `{}`, no preset will be applied", unknown);
                None
            }
        }
    }

    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> PresetChoice {
        match self {
            Preset::Main => PresetChoice {
                mode: IntervalMode::Random,
                sort_key: SortKey::Intensity,
                characteristic_length: Some(250),
                angle: Some(45.0),
                randomness: Some(50.0),
                ..PresetChoice::default()
            },
            Preset::MainFile => PresetChoice {
                mode: IntervalMode::File,
                sort_key: SortKey::choose(rng),
                sort_randomized: true,
                bottom_threshold: Some(0.65),
                randomness: Some(50.0),
                ..PresetChoice::default()
            },
            Preset::FullRandom => {
                let angle = rng.gen_range(0..360) as f32;
                let clength = step_range(rng, 50, 500, 15) as usize;
                let upper = f64::from(step_range(rng, 50, 100, 5)) / 100.0;
                let bottom = f64::from(step_range(rng, 5, 50, 5)) / 100.0;
                let randomness = f64::from(step_range(rng, 5, 100, 5));
                let modes = [
                    IntervalMode::Random,
                    IntervalMode::Threshold,
                    IntervalMode::Edges,
                    IntervalMode::Waves,
                    IntervalMode::File,
                    IntervalMode::FileEdges,
                ];
                PresetChoice {
                    mode: modes[rng.gen_range(0..modes.len())],
                    sort_key: SortKey::choose(rng),
                    mode_randomized: true,
                    sort_randomized: true,
                    bottom_threshold: Some(bottom),
                    upper_threshold: Some(upper),
                    characteristic_length: Some(clength),
                    angle: Some(angle),
                    randomness: Some(randomness),
                }
            }
            Preset::SnapSort => PresetChoice {
                mode: IntervalMode::Snap,
                sort_key: SortKey::Intensity,
                characteristic_length: Some(250),
                angle: Some(45.0),
                randomness: Some(50.0),
                ..PresetChoice::default()
            },
        }
    }
}

impl str::FromStr for Preset {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "main" => Ok(Preset::Main),
            "2" | "main file" | "main-file" => Ok(Preset::MainFile),
            "3" | "full random" | "full-random" => Ok(Preset::FullRandom),
            "4" | "snap-sort" | "snap sort" => Ok(Preset::SnapSort),
            _ => Err(String::from(s)),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn presets_parse_by_name_and_number() {
        assert_eq!("main".parse::<Preset>(), Ok(Preset::Main));
        assert_eq!("2".parse::<Preset>(), Ok(Preset::MainFile));
        assert_eq!("Full Random".parse::<Preset>(), Ok(Preset::FullRandom));
        assert_eq!("snap-sort".parse::<Preset>(), Ok(Preset::SnapSort));
        assert_eq!(Preset::from_name_lenient("deluxe"), None);
    }

    #[test]
    fn main_preset_overrides_parameters() {
        let mut params = RunParameters::default();
        let choice = Preset::Main.resolve(&mut StdRng::seed_from_u64(0));
        choice.apply(&mut params);
        assert_eq!(choice.mode, IntervalMode::Random);
        assert_eq!(params.sort_key, SortKey::Intensity);
        assert_eq!(params.characteristic_length, 250);
        assert_eq!(params.angle, 45.0);
        assert_eq!(params.randomness, 50.0);
        // untouched by the preset
        assert_eq!(params.bottom_threshold, 0.25);
    }

    #[test]
    fn full_random_stays_on_its_grid() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            let choice = Preset::FullRandom.resolve(&mut rng);
            let clength = choice.characteristic_length.unwrap();
            assert!((50..500).contains(&clength) && (clength - 50) % 15 == 0);
            let bottom = choice.bottom_threshold.unwrap();
            assert!((0.05..0.5).contains(&bottom));
            let upper = choice.upper_threshold.unwrap();
            assert!((0.5..1.0).contains(&upper));
            assert!(!choice.mode.bypasses_sorter());
        }
    }
}
