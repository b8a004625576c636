//! Plain text record of past runs.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::interval::IntervalMode;
use crate::params::{Preset, RunParameters};

#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub params: &'a RunParameters,
    pub resolution: (u32, u32),
    pub preset: Option<Preset>,
    pub mode: IntervalMode,
    pub mode_randomized: bool,
    pub sort_randomized: bool,
    pub output: &'a Path,
    /// Seconds since the unix epoch.
    pub sorted_at: u64,
}

impl<'a> Entry<'a> {
    pub fn now(params: &'a RunParameters, mode: IntervalMode, output: &'a Path) -> Self {
        let sorted_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Entry {
            params,
            resolution: (0, 0),
            preset: None,
            mode,
            mode_randomized: false,
            sort_randomized: false,
            output,
            sorted_at,
        }
    }
}

impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.params;
        writeln!(f, "Starting image: {}", p.source)?;
        writeln!(f, "Resolution: {}x{}", self.resolution.0, self.resolution.1)?;
        match self.preset {
            Some(preset) => writeln!(f, "Preset: {}", preset)?,
            None => writeln!(f, "No preset applied")?,
        }
        let chosen = |randomized| if randomized { " (randomly chosen)" } else { "" };
        writeln!(f, "Int func{}: {}", chosen(self.mode_randomized), self.mode)?;
        writeln!(f, "Sort func{}: {}", chosen(self.sort_randomized), p.sort_key)?;
        writeln!(
            f,
            "Args: -r {} -c {} -a {} -t {} -u {}",
            p.randomness, p.characteristic_length, p.angle, p.bottom_threshold, p.upper_threshold
        )?;
        writeln!(f, "Sorted on: {}", Timestamp(self.sorted_at))?;
        writeln!(f, "Sorted image: {}", self.output.display())?;
        write!(f, "{}", "-".repeat(35))
    }
}

/// Unix seconds rendered as a UTC `MM/DD/YYYY HH:MM` stamp.
struct Timestamp(u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (days, secs) = (self.0 / 86_400, self.0 % 86_400);
        // days since the epoch to a proleptic gregorian date, in 400 year eras starting at march
        let z = days + 719_468;
        let era = z / 146_097;
        let doe = z % 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + u64::from(month <= 2);
        write!(
            f,
            "{:02}/{:02}/{} {:02}:{:02}",
            month,
            day,
            year,
            secs / 3600,
            secs % 3600 / 60
        )
    }
}

/// Appends `entry` to the ledger at `path`, creating the file if needed.
pub fn append(path: &Path, entry: &Entry<'_>) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "\n{}", entry)?;
    Ok(())
}
