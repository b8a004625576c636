use image::Pixel as _;
use rand::Rng;

use std::{fmt, str};

use crate::buffer::Pixel;

/// Hue, saturation and value of an 8-bit colour, with value kept in the `0..=255` domain
/// and hue/saturation in `0.0..1.0`.
fn hsv(pixel: &Pixel) -> (f64, f64, f64) {
    let [r, g, b] = pixel.to_rgb().0.map(f64::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return (0.0, 0.0, max);
    }
    let delta = max - min;
    let saturation = delta / max;
    let (rc, gc, bc) = ((max - r) / delta, (max - g) / delta, (max - b) / delta);
    let hue = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((hue / 6.0).rem_euclid(1.0), saturation, max)
}

#[inline]
pub fn lightness(pixel: &Pixel) -> f64 {
    hsv(pixel).2 / 255.0
}

#[inline]
pub fn hue(pixel: &Pixel) -> f64 {
    hsv(pixel).0 / 255.0
}

#[inline]
pub fn saturation(pixel: &Pixel) -> f64 {
    hsv(pixel).1 / 255.0
}

#[inline]
pub fn intensity(pixel: &Pixel) -> f64 {
    pixel.0[..3].iter().map(|&c| f64::from(c)).sum()
}

#[inline]
pub fn minimum(pixel: &Pixel) -> f64 {
    pixel.0[..3].iter().copied().min().map_or(0.0, f64::from)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Lightness,
    Hue,
    Intensity,
    Minimum,
    Saturation,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Lightness,
        SortKey::Hue,
        SortKey::Intensity,
        SortKey::Minimum,
        SortKey::Saturation,
    ];

    pub fn function(self) -> fn(&Pixel) -> f64 {
        match self {
            SortKey::Lightness => lightness,
            SortKey::Hue => hue,
            SortKey::Intensity => intensity,
            SortKey::Minimum => minimum,
            SortKey::Saturation => saturation,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortKey::Lightness => "lightness",
            SortKey::Hue => "hue",
            SortKey::Intensity => "intensity",
            SortKey::Minimum => "minimum",
            SortKey::Saturation => "saturation",
        }
    }

    /// Parses `name`, falling back to [`SortKey::Lightness`] for anything unknown.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|unknown| {
            log::warn!("unknown sorting function `{}`, using lightness", unknown);
            SortKey::Lightness
        })
    }

    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        SortKey::ALL[rng.gen_range(0..SortKey::ALL.len())]
    }
}

impl str::FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lightness" => Ok(SortKey::Lightness),
            "hue" => Ok(SortKey::Hue),
            "intensity" => Ok(SortKey::Intensity),
            "minimum" => Ok(SortKey::Minimum),
            "saturation" => Ok(SortKey::Saturation),
            _ => Err(String::from(s)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
