//! PNG reading and writing of masks.
//!
//! Feature-gated behind `png` (default on). Masks are stored as 8-bit
//! grayscale; colour inputs are converted to luma on read.

use std::path::Path;

use mask_forge_core::{Mask, MaskError};

use crate::pixel::{luma8_to_mask, mask_to_luma8};

/// Writes `mask` as an 8-bit grayscale PNG.
///
/// Returns `MaskError::InvalidDimensions` if the mask dimensions overflow
/// `u32`, or `MaskError::Io` on write failure.
pub fn write_png(mask: &Mask, path: &Path) -> Result<(), MaskError> {
    let w = u32::try_from(mask.width()).map_err(|_| MaskError::InvalidDimensions)?;
    let h = u32::try_from(mask.height()).map_err(|_| MaskError::InvalidDimensions)?;
    let img = image::GrayImage::from_raw(w, h, mask_to_luma8(mask))
        .ok_or_else(|| MaskError::Io("luma buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| MaskError::Io(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), width = w, height = h, "wrote mask");
    Ok(())
}

/// Reads an image file as a mask, converting it to 8-bit luma first.
///
/// Returns `MaskError::Io` if the file cannot be opened or decoded.
pub fn read_png(path: &Path) -> Result<Mask, MaskError> {
    let img = image::open(path)
        .map_err(|e| MaskError::Io(format!("{}: {e}", path.display())))?
        .to_luma8();
    let (w, h) = img.dimensions();
    tracing::debug!(path = %path.display(), width = w, height = h, "read mask");
    luma8_to_mask(w as usize, h as usize, img.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trip() {
        let mask = Mask::from_fn(16, 9, |x, y| ((x + y) % 2) as f64).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");

        write_png(&mask, &path).unwrap();
        let back = read_png(&path).unwrap();

        assert_eq!((back.width(), back.height()), (16, 9));
        assert_eq!(back, mask);
    }

    #[test]
    fn written_file_is_grayscale() {
        let mask = Mask::filled(4, 4, 0.5).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        write_png(&mask, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.color(), image::ColorType::L8);
        assert_eq!(img.to_luma8().get_pixel(0, 0).0, [128]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_png(&dir.path().join("absent.png"));
        assert!(matches!(result, Err(MaskError::Io(_))));
    }
}
