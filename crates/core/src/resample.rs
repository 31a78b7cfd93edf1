//! Separable resampling kernels shared by every size-changing operation.
//!
//! Sample positions use pixel-center alignment, `src = (dst + 0.5) * ratio - 0.5`,
//! with replicated borders. Nearest-neighbour uses `src = floor(dst * ratio)`.
//! Each output pixel's tap weights are normalized, and the final mask is
//! clamped, so ringing from the cubic and Lanczos kernels never leaves [0, 1].

use serde::{Deserialize, Serialize};

use crate::error::MaskError;
use crate::mask::Mask;

/// Interpolation kernel used when a mask changes size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
    Bicubic,
    Lanczos,
}

named_enum!(Interpolation, "interpolation", {
    Nearest => "nearest",
    Bilinear => "bilinear",
    Bicubic => "bicubic",
    Lanczos => "lanczos",
});

/// Keys cubic coefficient (matches the common `a = -0.75` convention).
const CUBIC_A: f64 = -0.75;
/// Lanczos window half-width in source pixels.
const LANCZOS_A: f64 = 4.0;

impl Interpolation {
    /// Kernel half-width in source pixels.
    fn support(self) -> isize {
        match self {
            Interpolation::Nearest => 0,
            Interpolation::Bilinear => 1,
            Interpolation::Bicubic => 2,
            Interpolation::Lanczos => LANCZOS_A as isize,
        }
    }

    fn weight(self, x: f64) -> f64 {
        let ax = x.abs();
        match self {
            Interpolation::Nearest => f64::from(u8::from(ax < 0.5)),
            Interpolation::Bilinear => (1.0 - ax).max(0.0),
            Interpolation::Bicubic => {
                if ax <= 1.0 {
                    ((CUBIC_A + 2.0) * ax - (CUBIC_A + 3.0)) * ax * ax + 1.0
                } else if ax < 2.0 {
                    ((CUBIC_A * ax - 5.0 * CUBIC_A) * ax + 8.0 * CUBIC_A) * ax - 4.0 * CUBIC_A
                } else {
                    0.0
                }
            }
            Interpolation::Lanczos => {
                if ax < LANCZOS_A {
                    sinc(ax) * sinc(ax / LANCZOS_A)
                } else {
                    0.0
                }
            }
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = std::f64::consts::PI * x;
        px.sin() / px
    }
}

/// Source indices and normalized weights contributing to one output sample.
#[derive(Debug, Clone)]
struct Taps {
    indices: Vec<usize>,
    weights: Vec<f64>,
}

fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else {
        (i as usize).min(len - 1)
    }
}

/// Precomputes the taps for every output position along one axis.
fn axis_taps(src_len: usize, dst_len: usize, interpolation: Interpolation) -> Vec<Taps> {
    let ratio = src_len as f64 / dst_len as f64;

    if interpolation == Interpolation::Nearest {
        return (0..dst_len)
            .map(|d| Taps {
                indices: vec![((d as f64 * ratio).floor() as usize).min(src_len - 1)],
                weights: vec![1.0],
            })
            .collect();
    }

    let support = interpolation.support();
    (0..dst_len)
        .map(|d| {
            let center = (d as f64 + 0.5) * ratio - 0.5;
            let base = center.floor() as isize;
            let (indices, mut weights): (Vec<usize>, Vec<f64>) = (base - support + 1
                ..=base + support)
                .map(|i| {
                    (
                        clamp_index(i, src_len),
                        interpolation.weight(center - i as f64),
                    )
                })
                .unzip();
            let total: f64 = weights.iter().sum();
            if total.abs() > f64::EPSILON {
                weights.iter_mut().for_each(|w| *w /= total);
            }
            Taps { indices, weights }
        })
        .collect()
}

/// Resamples `mask` to `width × height` with the given kernel.
///
/// Returns `MaskError::InvalidDimensions` if the target size is zero.
pub fn resample(
    mask: &Mask,
    width: usize,
    height: usize,
    interpolation: Interpolation,
) -> Result<Mask, MaskError> {
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidDimensions);
    }
    if mask.width() == width && mask.height() == height {
        return Ok(mask.clone());
    }

    let src_w = mask.width();
    let src_h = mask.height();
    let x_taps = axis_taps(src_w, width, interpolation);
    let y_taps = axis_taps(src_h, height, interpolation);

    // Horizontal pass: src_h rows of `width` samples.
    let mut horizontal = vec![0.0_f64; src_h * width];
    for y in 0..src_h {
        let row = mask.row(y);
        let out = &mut horizontal[y * width..(y + 1) * width];
        for (o, taps) in out.iter_mut().zip(&x_taps) {
            *o = taps
                .indices
                .iter()
                .zip(&taps.weights)
                .map(|(&i, &w)| row[i] * w)
                .sum();
        }
    }

    // Vertical pass.
    let mut data = vec![0.0_f64; width * height];
    for (y, taps) in y_taps.iter().enumerate() {
        let out = &mut data[y * width..(y + 1) * width];
        for (&i, &w) in taps.indices.iter().zip(&taps.weights) {
            let src_row = &horizontal[i * width..(i + 1) * width];
            out.iter_mut()
                .zip(src_row)
                .for_each(|(o, &s)| *o += s * w);
        }
    }

    Mask::from_data(width, height, data)
}

/// Resamples `mask` to match `reference`'s size with bilinear filtering.
///
/// This is the silent size-reconciliation policy for two-operand operations.
pub(crate) fn match_size(mask: &Mask, reference: &Mask) -> Result<Mask, MaskError> {
    if mask.same_size(reference) {
        return Ok(mask.clone());
    }
    tracing::warn!(
        from_w = mask.width(),
        from_h = mask.height(),
        to_w = reference.width(),
        to_h = reference.height(),
        "operand size mismatch, resampling bilinearly"
    );
    resample(
        mask,
        reference.width(),
        reference.height(),
        Interpolation::Bilinear,
    )
}
