//! Separable Gaussian blur used as the feather post-pass.
//!
//! Shapes without an analytic distance field (polygons, stars) and the
//! generated fields are softened by blurring instead of smoothstep
//! antialiasing. Borders use half-sample symmetric reflection
//! (`d c b a | a b c d | d c b a`), so a constant mask stays constant.

use crate::mask::Mask;

/// Kernel truncation in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Maps a possibly out-of-range index into `[0, len)` by symmetric reflection.
fn reflect_index(i: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let r = i.rem_euclid(period) as usize;
    if r < len {
        r
    } else {
        2 * len - 1 - r
    }
}

/// Normalized 1D Gaussian kernel of length `2 * radius + 1`.
fn gaussian_kernel(sigma: f64) -> (Vec<f64>, usize) {
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= total);
    (kernel, radius)
}

/// Convolves one line of samples with `kernel`, reading through `fetch`.
fn convolve_line(
    len: usize,
    kernel: &[f64],
    radius: usize,
    fetch: impl Fn(usize) -> f64,
    mut store: impl FnMut(usize, f64),
) {
    for i in 0..len {
        let acc = kernel
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let src = reflect_index(i as isize + k as isize - radius as isize, len);
                fetch(src) * w
            })
            .sum();
        store(i, acc);
    }
}

/// Blurs `mask` with a Gaussian of standard deviation `sigma` pixels.
///
/// Non-positive or non-finite `sigma` returns the mask unchanged.
pub fn gaussian_blur(mask: &Mask, sigma: f64) -> Mask {
    if !sigma.is_finite() || sigma <= 0.0 {
        return mask.clone();
    }
    let (kernel, radius) = gaussian_kernel(sigma);
    let w = mask.width();
    let h = mask.height();

    let mut horizontal = vec![0.0_f64; w * h];
    for y in 0..h {
        let row = mask.row(y);
        convolve_line(w, &kernel, radius, |x| row[x], |x, v| {
            horizontal[y * w + x] = v;
        });
    }

    let mut out = mask.clone();
    let data = out.data_mut();
    for x in 0..w {
        convolve_line(
            h,
            &kernel,
            radius,
            |y| horizontal[y * w + x],
            |y, v| data[y * w + x] = v.clamp(0.0, 1.0),
        );
    }
    out
}
