//! Thin layer over `image`/`imageproc` for the raster operations the pipeline needs.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tempfile::TempDir;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Laplacian style kernel matching the classic "find edges" filter.
const FIND_EDGES: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

pub fn open<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

pub fn save<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image.save(path)?;
    Ok(())
}

/// Rotates `image` counter-clockwise by `degrees`, growing the canvas so that no part of the
/// image is cut off. Uncovered pixels are transparent.
pub fn rotate(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let turn = degrees.rem_euclid(360.0);
    match turn {
        t if t == 0.0 => image.clone(),
        t if t == 90.0 => imageops::rotate270(image),
        t if t == 180.0 => imageops::rotate180(image),
        t if t == 270.0 => imageops::rotate90(image),
        _ => rotate_expand(image, turn.to_radians()),
    }
}

fn rotate_expand(image: &RgbaImage, theta: f32) -> RgbaImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let (sin, cos) = theta.sin_cos();
    // rounding first keeps e.g. 45 degrees from spilling into an extra column
    let expand = |len: f32| ((len * 1e4).round() / 1e4).ceil() as u32;
    let (new_w, new_h) = (
        expand(w * cos.abs() + h * sin.abs()),
        expand(w * sin.abs() + h * cos.abs()),
    );
    let mut out = RgbaImage::new(new_w, new_h);
    if image.width() == 0 || image.height() == 0 {
        return out;
    }
    // image rows grow downwards, so a visually counter-clockwise turn is a negative angle
    let projection = Projection::translate(new_w as f32 / 2.0, new_h as f32 / 2.0)
        * Projection::rotate(-theta)
        * Projection::translate(-w / 2.0, -h / 2.0);
    warp_into(
        image,
        &projection,
        Interpolation::Nearest,
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    out
}

/// Applies the 3x3 edge kernel to the colour channels. The result is opaque.
///
/// The kernel has no full neighbourhood on the outermost ring of pixels, so that ring keeps the
/// source colours.
pub fn find_edges(image: &RgbaImage) -> RgbaImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut filtered = imageops::filter3x3(&rgb, &FIND_EDGES);
    let (w, h) = rgb.dimensions();
    for (x, y, pixel) in rgb.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            filtered.put_pixel(x, y, *pixel);
        }
    }
    DynamicImage::ImageRgb8(filtered).to_rgba8()
}

pub fn resize(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    if image.width() == 0 || image.height() == 0 {
        return RgbaImage::new(width, height);
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Cuts a centred `width` x `height` window out of `image`.
pub fn crop_center(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let left = image.width().saturating_sub(width) / 2;
    let top = image.height().saturating_sub(height) / 2;
    imageops::crop_imm(image, left, top, width, height).to_image()
}

/// A raster written to a private temporary directory. The file and directory are removed
/// when the value is dropped.
pub struct ScratchImage {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchImage {
    pub fn write(image: &RgbaImage, name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("pixelsort").tempdir()?;
        let path = dir.path().join(name).with_extension("png");
        save(image, &path)?;
        log::debug!("wrote scratch raster {}", path.display());
        Ok(ScratchImage { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reload(&self) -> Result<RgbaImage> {
        open(&self.path)
    }

    /// Removes the artifact now, reporting failures instead of ignoring them on drop.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        let image = striped(5, 3);
        assert_eq!(rotate(&image, 90.0).dimensions(), (3, 5));
        assert_eq!(rotate(&image, -90.0).dimensions(), (3, 5));
        assert_eq!(rotate(&image, 180.0).dimensions(), (5, 3));
        assert_eq!(rotate(&image, 360.0), image);
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let image = striped(5, 3);
        let rotated = rotate(&image, 90.0);
        // the top right corner ends up top left
        assert_eq!(rotated.get_pixel(0, 0), image.get_pixel(4, 0));
    }

    #[test]
    fn arbitrary_turns_expand_the_canvas() {
        let image = striped(10, 10);
        let rotated = rotate(&image, 45.0);
        assert_eq!(rotated.dimensions(), (15, 15));
        // corners of the grown canvas are not covered by the source
        assert_eq!(*rotated.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn find_edges_keeps_the_outer_ring() {
        let image = RgbaImage::from_pixel(5, 4, Rgba([200, 200, 200, 255]));
        let edges = find_edges(&image);
        for (x, y, pixel) in edges.enumerate_pixels() {
            let border = x == 0 || y == 0 || x == 4 || y == 3;
            let expected = if border { [200, 200, 200, 255] } else { [0, 0, 0, 255] };
            assert_eq!(pixel.0, expected, "({}, {})", x, y);
        }
    }

    #[test]
    fn crop_center_takes_the_middle() {
        let image = striped(7, 5);
        let cropped = crop_center(&image, 3, 3);
        assert_eq!(cropped.dimensions(), (3, 3));
        assert_eq!(*cropped.get_pixel(0, 0), Rgba([2, 1, 0, 255]));
    }

    #[test]
    fn scratch_image_is_removed_on_drop() {
        let image = striped(4, 4);
        let scratch = ScratchImage::write(&image, "snapped").unwrap();
        let path = scratch.path().to_path_buf();
        assert_eq!(scratch.reload().unwrap(), image);
        drop(scratch);
        assert!(!path.exists());
    }
}
