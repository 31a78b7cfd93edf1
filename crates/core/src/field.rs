//! Field generators: gradients, layered value noise and checkerboards.
//!
//! These fill the whole canvas rather than drawing a bounded shape, and have
//! no analytic edge to antialias. Noise draws every random number from the
//! `Xorshift64` it is handed, so a seed fully determines the output.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::MaskError;
use crate::mask::Mask;
use crate::prng::Xorshift64;
use crate::resample::{resample, Interpolation};

/// Guard for the noise normalization denominator.
const NORMALIZE_EPS: f64 = 1e-8;

/// Smallest accepted noise `scale`.
pub const MIN_NOISE_SCALE: f64 = 0.1;

/// Smallest random grid side of a noise octave.
const MIN_GRID_SIDE: usize = 4;

/// Gradient geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
    Angular,
}

named_enum!(GradientKind, "gradient", {
    Linear => "linear",
    Radial => "radial",
    Angular => "angular",
});

/// Noise flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Independent uniform sample per pixel.
    Random,
    /// Three bilinearly upsampled octaves of value noise.
    #[default]
    Value,
    /// Four bicubically upsampled octaves with a strength-dependent contrast curve.
    Cloud,
}

named_enum!(NoiseKind, "noise", {
    Random => "random",
    Value => "value",
    Cloud => "cloud",
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientParams {
    pub kind: GradientKind,
    /// Direction of a linear gradient, in degrees.
    pub angle: f64,
    pub reverse: bool,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            angle: 0.0,
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    /// Output gain in [0, 1]; also shapes the cloud contrast curve.
    pub strength: f64,
    /// Base feature size divisor; larger values give coarser noise.
    pub scale: f64,
    pub seed: u64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Value,
            strength: 0.5,
            scale: 5.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerboardParams {
    pub cells_x: usize,
    pub cells_y: usize,
}

impl Default for CheckerboardParams {
    fn default() -> Self {
        Self {
            cells_x: 8,
            cells_y: 8,
        }
    }
}

/// Renders a linear, radial or angular gradient.
pub fn gradient(params: &GradientParams, width: usize, height: usize) -> Result<Mask, MaskError> {
    let half_w = width as f64 / 2.0;
    let half_h = height as f64 / 2.0;
    let (sin, cos) = params.angle.to_radians().sin_cos();
    let max_dist = (half_w * half_w + half_h * half_h).sqrt();

    Mask::from_fn(width, height, |x, y| {
        let dx = x as f64 - half_w;
        let dy = y as f64 - half_h;
        let value = match params.kind {
            GradientKind::Linear => {
                let projection = dx / half_w * cos + dy / half_h * sin;
                (projection + 1.0) / 2.0
            }
            GradientKind::Radial => 1.0 - (dx * dx + dy * dy).sqrt() / max_dist,
            GradientKind::Angular => (dy.atan2(dx) + PI) / (2.0 * PI),
        };
        if params.reverse {
            1.0 - value
        } else {
            value
        }
    })
}

/// Octave layout for the layered noise kinds.
struct OctavePlan {
    octaves: u32,
    base_frequency: f64,
    upsample: Interpolation,
}

/// Sums `plan.octaves` layers of upsampled random grids and normalizes by the
/// maximum, yielding raw values in [0, 1].
fn layered_noise(
    plan: &OctavePlan,
    width: usize,
    height: usize,
    rng: &mut Xorshift64,
) -> Result<Vec<f64>, MaskError> {
    let mut acc = vec![0.0_f64; width * height];
    for octave in 0..plan.octaves {
        let frequency = 2f64.powi(octave as i32) * plan.base_frequency;
        let amplitude = 0.5f64.powi(octave as i32);
        // A grid finer than the canvas adds no detail.
        let grid_w = ((width as f64 / frequency) as usize)
            .min(width)
            .max(MIN_GRID_SIDE);
        let grid_h = ((height as f64 / frequency) as usize)
            .min(height)
            .max(MIN_GRID_SIDE);
        let grid = Mask::from_data(grid_w, grid_h, rng.unit_samples(grid_w * grid_h))?;
        let layer = resample(&grid, width, height, plan.upsample)?;
        acc.iter_mut()
            .zip(layer.data())
            .for_each(|(a, &v)| *a += v * amplitude);
    }
    let max = acc.iter().copied().fold(0.0_f64, f64::max).max(NORMALIZE_EPS);
    acc.iter_mut().for_each(|v| *v /= max);
    Ok(acc)
}

/// Renders a noise field, drawing randomness from `rng`.
///
/// Returns `MaskError::InvalidConfiguration` for a `scale` below
/// [`MIN_NOISE_SCALE`] on the layered kinds.
pub fn noise(
    params: &NoiseParams,
    width: usize,
    height: usize,
    rng: &mut Xorshift64,
) -> Result<Mask, MaskError> {
    let raw = match params.kind {
        NoiseKind::Random => {
            Mask::new(width, height)?;
            rng.unit_samples(width * height)
        }
        NoiseKind::Value | NoiseKind::Cloud if !(params.scale >= MIN_NOISE_SCALE) => {
            return Err(MaskError::invalid("scale", params.scale));
        }
        NoiseKind::Value => layered_noise(
            &OctavePlan {
                octaves: 3,
                base_frequency: params.scale,
                upsample: Interpolation::Bilinear,
            },
            width,
            height,
            rng,
        )?,
        NoiseKind::Cloud => {
            let exponent = 1.0 / (params.strength + 0.1);
            layered_noise(
                &OctavePlan {
                    octaves: 4,
                    base_frequency: params.scale * 0.5,
                    upsample: Interpolation::Bicubic,
                },
                width,
                height,
                rng,
            )?
            .into_iter()
            .map(|v| v.powf(exponent))
            .collect()
        }
    };
    Mask::from_data(
        width,
        height,
        raw.into_iter().map(|v| v * params.strength).collect(),
    )
}

/// Renders a `cells_x × cells_y` checkerboard whose top-left cell is filled.
///
/// Cell counts above the canvas size are capped to one cell per pixel.
/// Returns `MaskError::InvalidConfiguration` if either cell count is zero.
pub fn checkerboard(
    params: &CheckerboardParams,
    width: usize,
    height: usize,
) -> Result<Mask, MaskError> {
    if params.cells_x == 0 {
        return Err(MaskError::invalid("cells_x", params.cells_x));
    }
    if params.cells_y == 0 {
        return Err(MaskError::invalid("cells_y", params.cells_y));
    }
    let cells_x = params.cells_x.min(width);
    let cells_y = params.cells_y.min(height);
    let cell_w = width as f64 / cells_x as f64;
    let cell_h = height as f64 / cells_y as f64;

    let mut mask = Mask::new(width, height)?;
    let data = mask.data_mut();
    for i in 0..cells_y {
        let y0 = (i as f64 * cell_h) as usize;
        let y1 = (((i + 1) as f64 * cell_h) as usize).min(height);
        for j in (0..cells_x).filter(|j| (i + j) % 2 == 0) {
            let x0 = (j as f64 * cell_w) as usize;
            let x1 = (((j + 1) as f64 * cell_w) as usize).min(width);
            for y in y0..y1 {
                data[y * width + x0..y * width + x1].fill(1.0);
            }
        }
    }
    Ok(mask)
}
