//! Pure-computation conversion between [`Mask`] and 8-bit pixel buffers.
//!
//! Always available (no feature gate) so hosts that bring their own image
//! encoder can share the same quantization.

use mask_forge_core::{Mask, MaskError};

fn quantize(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantizes a mask to one byte per pixel, row-major.
pub fn mask_to_luma8(mask: &Mask) -> Vec<u8> {
    mask.data().iter().map(|&v| quantize(v)).collect()
}

/// Expands a mask to an opaque RGBA8 preview (white foreground on black).
pub fn mask_to_rgba(mask: &Mask) -> Vec<u8> {
    mask.data()
        .iter()
        .flat_map(|&v| {
            let l = quantize(v);
            [l, l, l, 255u8]
        })
        .collect()
}

/// Builds a mask from one byte per pixel, mapping 0..=255 onto [0, 1].
///
/// Returns `MaskError::DimensionMismatch` if `pixels.len() != width * height`.
pub fn luma8_to_mask(width: usize, height: usize, pixels: &[u8]) -> Result<Mask, MaskError> {
    Mask::from_data(
        width,
        height,
        pixels.iter().map(|&p| f64::from(p) / 255.0).collect(),
    )
}
