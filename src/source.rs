use image::RgbaImage;

use std::path::Path;

use crate::backend;
use crate::error::{Error, Result};

/// Image used whenever the requested one cannot be read.
pub const FALLBACK_IMAGE: &str = "images/default.jpg";

#[derive(Debug, Clone)]
pub struct Source {
    pub image: RgbaImage,
    /// The locator the image was actually read from.
    pub locator: String,
    pub used_fallback: bool,
}

pub fn load(locator: &str) -> Result<Source> {
    load_with_fallback(locator, Path::new(FALLBACK_IMAGE))
}

/// Decodes `locator`, substituting `fallback` if it is empty or unreadable. Only a failing
/// fallback is an error.
pub fn load_with_fallback(locator: &str, fallback: &Path) -> Result<Source> {
    let locator = locator.trim();
    if locator.is_empty() {
        log::warn!("no image given, using default image {}", fallback.display());
    } else {
        match backend::open(locator) {
            Ok(image) => {
                return Ok(Source {
                    image,
                    locator: locator.to_owned(),
                    used_fallback: false,
                })
            }
            Err(e) => log::warn!(
                "could not read '{}' ({}), using default image {}",
                locator,
                e,
                fallback.display()
            ),
        }
    }
    match backend::open(fallback) {
        Ok(image) => Ok(Source {
            image,
            locator: fallback.display().to_string(),
            used_fallback: true,
        }),
        Err(e) => {
            log::error!("default image failed as well: {}", e);
            Err(Error::SourceUnavailable {
                locator: locator.to_owned(),
                fallback: fallback.to_path_buf(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn unreadable_source_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("default.png");
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
            .save(&fallback)
            .unwrap();

        let source = load_with_fallback("/definitely/not/here.png", &fallback).unwrap();
        assert!(source.used_fallback);
        assert_eq!(source.image.dimensions(), (3, 2));

        let source = load_with_fallback(fallback.to_str().unwrap(), &fallback).unwrap();
        assert!(!source.used_fallback);
    }

    #[test]
    fn missing_fallback_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_with_fallback("", &dir.path().join("nope.png"));
        assert!(matches!(result, Err(Error::SourceUnavailable { .. })));
    }
}
