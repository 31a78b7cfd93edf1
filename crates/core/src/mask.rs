//! Two-dimensional single-channel mask buffer with values clamped to [0, 1].
//!
//! A `Mask` stores `width * height` f64 samples in row-major order. Unlike a
//! simulation field it does not wrap: coordinates outside the mask are
//! background. Every constructor and arithmetic helper keeps samples inside
//! [0, 1] so downstream components can rely on the range.

use serde::{Deserialize, Serialize};

use crate::error::MaskError;

/// Samples strictly above this value count as foreground.
pub const FOREGROUND_THRESHOLD: f64 = 0.5;

/// Axis-aligned pixel rectangle with half-open extents `[x_min, x_max) × [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: usize,
    pub y_min: usize,
    pub x_max: usize,
    pub y_max: usize,
}

impl BoundingBox {
    /// The box covering an entire `width × height` buffer.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x_min: 0,
            y_min: 0,
            x_max: width,
            y_max: height,
        }
    }

    pub fn width(&self) -> usize {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> usize {
        self.y_max - self.y_min
    }

    /// Number of pixels covered by the box.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Grows the box by `padding` pixels on every side, clamped to a
    /// `width × height` buffer.
    pub fn padded(self, padding: usize, width: usize, height: usize) -> Self {
        Self {
            x_min: self.x_min.saturating_sub(padding),
            y_min: self.y_min.saturating_sub(padding),
            x_max: self.x_max.saturating_add(padding).min(width),
            y_max: self.y_max.saturating_add(padding).min(height),
        }
    }

    /// Whether `(x, y)` lies inside the box.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.y_min..self.y_max).contains(&y)
    }
}

/// A 2D mask with values clamped to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

/// Validates dimensions and returns the sample count.
fn checked_len(width: usize, height: usize) -> Result<usize, MaskError> {
    if width == 0 || height == 0 {
        return Err(MaskError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(MaskError::InvalidDimensions)
}

/// Clamps to [0, 1], mapping NaN to background.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Mask {
    /// Creates an all-background mask.
    ///
    /// Returns `MaskError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, MaskError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    /// Creates a mask filled with `value`, clamped to [0, 1].
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, MaskError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![sanitize(value); len],
        })
    }

    /// Creates a mask from a row-major data vector.
    ///
    /// Samples are clamped to [0, 1] and NaN becomes 0. Returns
    /// `MaskError::DimensionMismatch` if `data.len() != width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, MaskError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(MaskError::DimensionMismatch {
                lhs_w: width,
                lhs_h: height,
                rhs_w: data.len(),
                rhs_h: 1,
            });
        }
        Ok(Self {
            width,
            height,
            data: data.into_iter().map(sanitize).collect(),
        })
    }

    /// Builds a mask by evaluating `f(x, y)` at every pixel, clamping each result.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, MaskError> {
        let len = checked_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(sanitize(f(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Mask width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the underlying row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable access to the underlying row-major data.
    ///
    /// Values written here bypass clamping; callers must keep them in [0, 1].
    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Whether `other` has the same width and height.
    pub fn same_size(&self, other: &Mask) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// One row of samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[f64] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Gets the sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the mask.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside mask");
        self.data[y * self.width + x]
    }

    /// Sets the sample at `(x, y)`, clamped to [0, 1].
    ///
    /// Returns `MaskError::OutOfBounds` for coordinates outside the mask.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<(), MaskError> {
        if x >= self.width || y >= self.height {
            return Err(MaskError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.data[y * self.width + x] = sanitize(value);
        Ok(())
    }

    /// Applies `f` to every sample, clamping the result.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Mask {
        Mask {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| sanitize(f(v))).collect(),
        }
    }

    /// Combines two equally sized masks sample by sample, clamping the result.
    ///
    /// Returns `MaskError::DimensionMismatch` if the masks differ in size.
    pub fn zip_with(&self, other: &Mask, f: impl Fn(f64, f64) -> f64) -> Result<Mask, MaskError> {
        if !self.same_size(other) {
            return Err(MaskError::DimensionMismatch {
                lhs_w: self.width,
                lhs_h: self.height,
                rhs_w: other.width,
                rhs_h: other.height,
            });
        }
        Ok(Mask {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| sanitize(f(a, b)))
                .collect(),
        })
    }

    /// `1 - v` for every sample.
    pub fn invert(&self) -> Mask {
        self.map(|v| 1.0 - v)
    }

    /// Mean sample value.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Number of samples strictly above `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.data.iter().filter(|&&v| v > threshold).count()
    }

    /// Tight bounding box of the foreground samples, or `None` if there are none.
    pub fn content_bounds(&self) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        for (x, y, v) in self.iter() {
            if v <= FOREGROUND_THRESHOLD {
                continue;
            }
            bounds = Some(match bounds {
                None => BoundingBox {
                    x_min: x,
                    y_min: y,
                    x_max: x + 1,
                    y_max: y + 1,
                },
                Some(b) => BoundingBox {
                    x_min: b.x_min.min(x),
                    y_min: b.y_min.min(y),
                    x_max: b.x_max.max(x + 1),
                    y_max: b.y_max.max(y + 1),
                },
            });
        }
        bounds
    }

    /// Copies the pixels inside `bounds` into a new mask.
    ///
    /// Returns `MaskError::InvalidDimensions` for an empty box and
    /// `MaskError::OutOfBounds` if the box extends past the mask.
    pub fn crop(&self, bounds: &BoundingBox) -> Result<Mask, MaskError> {
        if bounds.x_max > self.width || bounds.y_max > self.height {
            return Err(MaskError::OutOfBounds {
                x: bounds.x_max,
                y: bounds.y_max,
                width: self.width,
                height: self.height,
            });
        }
        if bounds.x_min >= bounds.x_max || bounds.y_min >= bounds.y_max {
            return Err(MaskError::InvalidDimensions);
        }
        let data = (bounds.y_min..bounds.y_max)
            .flat_map(|y| self.row(y)[bounds.x_min..bounds.x_max].iter().copied())
            .collect();
        Ok(Mask {
            width: bounds.width(),
            height: bounds.height(),
            data,
        })
    }

    /// Writes `src` into this mask with its top-left corner at `(x, y)`.
    ///
    /// Pixels falling outside this mask are dropped.
    pub fn paste(&mut self, src: &Mask, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cols = src.width.min(self.width - x);
        let rows = src.height.min(self.height - y);
        for row in 0..rows {
            let dst_start = (y + row) * self.width + x;
            self.data[dst_start..dst_start + cols].copy_from_slice(&src.row(row)[..cols]);
        }
    }

    /// Iterates over all samples yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data.iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Constructors --

    #[test]
    fn new_creates_background_mask() {
        let mask = Mask::new(4, 3).unwrap();
        assert_eq!(mask.width(), 4);
        assert_eq!(mask.height(), 3);
        assert_eq!(mask.data().len(), 12);
        assert!(mask.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(Mask::new(0, 5), Err(MaskError::InvalidDimensions)));
        assert!(matches!(Mask::new(5, 0), Err(MaskError::InvalidDimensions)));
    }

    #[test]
    fn new_rejects_overflowing_dimensions() {
        assert!(Mask::new(usize::MAX, 2).is_err());
        assert!(Mask::filled(usize::MAX, 2, 0.5).is_err());
    }

    #[test]
    fn filled_clamps_value() {
        let high = Mask::filled(2, 2, 1.5).unwrap();
        assert!(high.data().iter().all(|&v| v == 1.0));
        let low = Mask::filled(2, 2, -0.3).unwrap();
        assert!(low.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_data_clamps_and_replaces_nan() {
        let mask = Mask::from_data(2, 2, vec![-1.0, 0.25, 2.0, f64::NAN]).unwrap();
        assert_eq!(mask.data(), &[0.0, 0.25, 1.0, 0.0]);
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        let result = Mask::from_data(2, 2, vec![0.1, 0.2, 0.3]);
        assert!(matches!(result, Err(MaskError::DimensionMismatch { .. })));
    }

    #[test]
    fn from_fn_evaluates_in_row_major_order() {
        let mask = Mask::from_fn(3, 2, |x, y| (y * 3 + x) as f64 / 10.0).unwrap();
        assert_eq!(mask.data(), &[0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
    }

    // -- Access --

    #[test]
    fn set_then_get_round_trips() {
        let mut mask = Mask::new(4, 4).unwrap();
        mask.set(2, 3, 0.42).unwrap();
        assert!((mask.get(2, 3) - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn set_outside_returns_out_of_bounds() {
        let mut mask = Mask::new(4, 4).unwrap();
        assert!(matches!(
            mask.set(4, 0, 1.0),
            Err(MaskError::OutOfBounds { x: 4, y: 0, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn get_outside_panics() {
        let mask = Mask::new(2, 2).unwrap();
        let _ = mask.get(2, 0);
    }

    // -- Arithmetic --

    #[test]
    fn zip_with_rejects_mismatched_sizes() {
        let a = Mask::new(2, 3).unwrap();
        let b = Mask::new(3, 2).unwrap();
        assert!(matches!(
            a.zip_with(&b, f64::max),
            Err(MaskError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn zip_with_clamps_result() {
        let a = Mask::filled(2, 2, 0.8).unwrap();
        let b = Mask::filled(2, 2, 0.5).unwrap();
        let c = a.zip_with(&b, |x, y| x + y).unwrap();
        assert!(c.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn invert_flips_values() {
        let mask = Mask::from_data(2, 1, vec![0.25, 1.0]).unwrap();
        assert_eq!(mask.invert().data(), &[0.75, 0.0]);
    }

    #[test]
    fn mean_and_count_above() {
        let mask = Mask::from_data(2, 2, vec![0.0, 0.5, 0.6, 1.0]).unwrap();
        assert!((mask.mean() - 0.525).abs() < 1e-12);
        assert_eq!(mask.count_above(FOREGROUND_THRESHOLD), 2);
    }

    // -- Bounding boxes, crop, paste --

    #[test]
    fn content_bounds_is_none_for_empty_mask() {
        let mask = Mask::filled(5, 5, 0.5).unwrap();
        assert_eq!(mask.content_bounds(), None);
    }

    #[test]
    fn content_bounds_is_half_open() {
        let mut mask = Mask::new(6, 5).unwrap();
        mask.set(1, 2, 1.0).unwrap();
        mask.set(3, 3, 0.9).unwrap();
        let bounds = mask.content_bounds().unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                x_min: 1,
                y_min: 2,
                x_max: 4,
                y_max: 4
            }
        );
        assert_eq!(bounds.width(), 3);
        assert_eq!(bounds.height(), 2);
    }

    #[test]
    fn padded_box_is_clamped_to_buffer() {
        let b = BoundingBox {
            x_min: 1,
            y_min: 1,
            x_max: 3,
            y_max: 3,
        };
        assert_eq!(b.padded(5, 4, 6), BoundingBox::full(4, 6));
    }

    #[test]
    fn crop_copies_sub_rectangle() {
        let mask = Mask::from_fn(4, 4, |x, y| if x >= 2 && y >= 1 { 1.0 } else { 0.0 }).unwrap();
        let cropped = mask
            .crop(&BoundingBox {
                x_min: 2,
                y_min: 1,
                x_max: 4,
                y_max: 3,
            })
            .unwrap();
        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.height(), 2);
        assert!(cropped.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn crop_rejects_box_outside_mask() {
        let mask = Mask::new(4, 4).unwrap();
        let result = mask.crop(&BoundingBox::full(5, 4));
        assert!(matches!(result, Err(MaskError::OutOfBounds { .. })));
    }

    #[test]
    fn paste_clips_at_edges() {
        let mut canvas = Mask::new(4, 4).unwrap();
        let stamp = Mask::filled(3, 3, 1.0).unwrap();
        canvas.paste(&stamp, 2, 2);
        assert_eq!(canvas.count_above(0.5), 4);
        assert_eq!(canvas.get(3, 3), 1.0);
        assert_eq!(canvas.get(1, 1), 0.0);
    }

    #[test]
    fn iter_yields_row_major_triples() {
        let mask = Mask::from_data(2, 2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let triples: Vec<_> = mask.iter().collect();
        assert_eq!(
            triples,
            vec![(0, 0, 0.1), (1, 0, 0.2), (0, 1, 0.3), (1, 1, 0.4)]
        );
    }

    // -- Property-based tests --

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn dimension() -> impl Strategy<Value = usize> {
            1_usize..=32
        }

        proptest! {
            #[test]
            fn from_data_keeps_every_sample_in_unit_range(
                w in dimension(),
                h in dimension(),
                seed in prop::collection::vec(-10.0_f64..10.0, 1..=64),
            ) {
                let data: Vec<f64> = (0..w * h).map(|i| seed[i % seed.len()]).collect();
                let mask = Mask::from_data(w, h, data).unwrap();
                prop_assert!(mask.data().iter().all(|v| (0.0..=1.0).contains(v)));
            }

            #[test]
            fn double_invert_is_identity(
                w in dimension(),
                h in dimension(),
                seed in prop::collection::vec(0.0_f64..=1.0, 1..=64),
            ) {
                let data: Vec<f64> = (0..w * h).map(|i| seed[i % seed.len()]).collect();
                let mask = Mask::from_data(w, h, data).unwrap();
                let back = mask.invert().invert();
                for (a, b) in mask.data().iter().zip(back.data()) {
                    prop_assert!((a - b).abs() < 1e-12, "{a} vs {b}");
                }
            }
        }
    }
}
