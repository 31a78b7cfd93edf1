//! Geometric post-processing: resize, rotate, translate, crop.
//!
//! Steps run in that fixed order and each is optional. Rotation and
//! translation keep the canvas size and fill uncovered pixels with
//! background.

use std::fmt;

use glam::DVec2;
use serde::Serialize;
use serde_json::Value;

use crate::error::MaskError;
use crate::mask::{BoundingBox, Mask};
use crate::params::{param_bool, param_i64, param_usize};
use crate::resize::{resize, ResizeOptions};
use crate::stats::MaskStats;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformOptions {
    pub resize: Option<ResizeOptions>,
    /// Degrees, counter-clockwise for positive values.
    pub rotation: Option<f64>,
    /// Whole-pixel translation `(dx, dy)`.
    pub offset: Option<(i64, i64)>,
    /// Crop to the content bounding box grown by this many pixels.
    pub crop_padding: Option<usize>,
}

impl TransformOptions {
    /// Reads `resize` (a nested resize options object), `rotation`,
    /// `offset_x`/`offset_y`, and `crop` with `crop_padding`.
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let resize = match params.get("resize") {
            Some(nested @ Value::Object(_)) => Some(ResizeOptions::from_json(nested)?),
            _ => None,
        };
        let offset = (params.get("offset_x").is_some() || params.get("offset_y").is_some())
            .then(|| (param_i64(params, "offset_x", 0), param_i64(params, "offset_y", 0)));
        Ok(Self {
            resize,
            rotation: params.get("rotation").and_then(Value::as_f64),
            offset,
            crop_padding: param_bool(params, "crop", false)
                .then(|| param_usize(params, "crop_padding", 0)),
        })
    }
}

/// One applied transform step, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TransformStep {
    Resize { width: usize, height: usize },
    Rotate { degrees: f64 },
    Offset { dx: i64, dy: i64 },
    Crop { bounds: BoundingBox },
}

impl fmt::Display for TransformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStep::Resize { width, height } => write!(f, "resize to {width}x{height}"),
            TransformStep::Rotate { degrees } => write!(f, "rotate {degrees} deg"),
            TransformStep::Offset { dx, dy } => write!(f, "offset by ({dx}, {dy})"),
            TransformStep::Crop { bounds } => write!(
                f,
                "crop to [{}, {}) x [{}, {})",
                bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutcome {
    pub mask: Mask,
    /// Steps that changed the mask.
    pub steps: Vec<TransformStep>,
    pub stats: MaskStats,
}

/// Bilinear sample with background outside the mask.
fn sample_zero_border(mask: &Mask, p: DVec2) -> f64 {
    let base = p.floor();
    let frac = p - base;
    let fetch = |dx: f64, dy: f64| {
        let x = base.x + dx;
        let y = base.y + dy;
        if x < 0.0 || y < 0.0 || x >= mask.width() as f64 || y >= mask.height() as f64 {
            0.0
        } else {
            mask.get(x as usize, y as usize)
        }
    };
    let top = fetch(0.0, 0.0) * (1.0 - frac.x) + fetch(1.0, 0.0) * frac.x;
    let bottom = fetch(0.0, 1.0) * (1.0 - frac.x) + fetch(1.0, 1.0) * frac.x;
    top * (1.0 - frac.y) + bottom * frac.y
}

/// Rotates `mask` by `degrees` about `(w/2, h/2)`, counter-clockwise on screen.
pub fn rotate(mask: &Mask, degrees: f64) -> Result<Mask, MaskError> {
    let center = DVec2::new(mask.width() as f64, mask.height() as f64) / 2.0;
    // Inverse map: each output pixel looks up its pre-image.
    let inverse = DVec2::from_angle(degrees.to_radians());
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let dst = DVec2::new(x as f64, y as f64) - center;
        sample_zero_border(mask, center + inverse.rotate(dst))
    })
}

/// Translates `mask` by whole pixels, filling vacated pixels with background.
///
/// Offsets of any magnitude are accepted; one past the canvas clears it.
pub fn translate(mask: &Mask, dx: i64, dy: i64) -> Result<Mask, MaskError> {
    let source = |pos: usize, delta: i64, len: usize| {
        i64::try_from(pos)
            .ok()
            .and_then(|p| p.checked_sub(delta))
            .and_then(|s| usize::try_from(s).ok())
            .filter(|&s| s < len)
    };
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        match (source(x, dx, mask.width()), source(y, dy, mask.height())) {
            (Some(sx), Some(sy)) => mask.get(sx, sy),
            _ => 0.0,
        }
    })
}

/// Applies the configured steps to `mask` in order.
pub fn transform(mask: &Mask, options: &TransformOptions) -> Result<TransformOutcome, MaskError> {
    tracing::debug!(width = mask.width(), height = mask.height(), ?options, "transform");
    let mut current = mask.clone();
    let mut steps = Vec::new();

    if let Some(resize_options) = &options.resize {
        current = resize(&current, resize_options)?.mask;
        steps.push(TransformStep::Resize {
            width: current.width(),
            height: current.height(),
        });
    }

    if let Some(degrees) = options.rotation.filter(|d| *d != 0.0) {
        current = rotate(&current, degrees)?;
        steps.push(TransformStep::Rotate { degrees });
    }

    if let Some((dx, dy)) = options.offset.filter(|&o| o != (0, 0)) {
        current = translate(&current, dx, dy)?;
        steps.push(TransformStep::Offset { dx, dy });
    }

    if let Some(padding) = options.crop_padding {
        match current.content_bounds() {
            Some(bounds) => {
                let bounds = bounds.padded(padding, current.width(), current.height());
                current = current.crop(&bounds)?;
                steps.push(TransformStep::Crop { bounds });
            }
            None => tracing::debug!("crop skipped, mask has no foreground"),
        }
    }

    let stats = MaskStats::of(&current);
    Ok(TransformOutcome {
        mask: current,
        steps,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(w: usize, h: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> Mask {
        Mask::from_fn(w, h, |x, y| {
            f64::from(u8::from((x0..x1).contains(&x) && (y0..y1).contains(&y)))
        })
        .unwrap()
    }

    #[test]
    fn no_steps_leaves_mask_unchanged() {
        let mask = block(10, 10, 2, 5, 2, 5);
        let out = transform(&mask, &TransformOptions::default()).unwrap();
        assert_eq!(out.mask, mask);
        assert!(out.steps.is_empty());
        assert_eq!(out.stats.area, 9);
    }

    #[test]
    fn positive_rotation_turns_right_side_to_top() {
        let mask = block(20, 20, 15, 19, 8, 12);
        let out = rotate(&mask, 90.0).unwrap();
        assert!(out.get(10, 3) > 0.99, "{}", out.get(10, 3));
        assert!(out.get(17, 10) < 0.01);
    }

    #[test]
    fn full_turn_is_identity() {
        let mask = block(16, 12, 3, 9, 2, 7);
        let out = rotate(&mask, 360.0).unwrap();
        for (a, b) in out.data().iter().zip(mask.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_fills_corners_with_background() {
        let mask = Mask::filled(20, 20, 1.0).unwrap();
        let out = rotate(&mask, 45.0).unwrap();
        assert_eq!(out.get(0, 0), 0.0);
        assert!((out.get(10, 10) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn translate_shifts_and_zero_fills() {
        let mask = block(6, 6, 0, 2, 0, 2);
        let out = translate(&mask, 3, 1).unwrap();
        assert_eq!(out.get(3, 1), 1.0);
        assert_eq!(out.get(4, 2), 1.0);
        assert_eq!(out.get(0, 0), 0.0);
        assert_eq!(out.count_above(0.5), 4);

        let back = translate(&out, -3, -1).unwrap();
        assert_eq!(back, mask);
        assert_eq!(translate(&mask, 10, 0).unwrap().count_above(0.0), 0);
    }

    #[test]
    fn extreme_offsets_clear_the_canvas() {
        let mask = block(8, 8, 0, 8, 0, 8);
        for (dx, dy) in [(i64::MIN, 0), (0, i64::MAX), (i64::MAX, i64::MIN)] {
            let moved = translate(&mask, dx, dy).unwrap();
            assert!(moved.data().iter().all(|&v| v == 0.0), "({dx}, {dy})");
        }
        let opts = TransformOptions::from_json(&json!({"offset_x": i64::MIN})).unwrap();
        let out = transform(&mask, &opts).unwrap();
        assert_eq!(out.stats.area, 0);
    }

    #[test]
    fn crop_keeps_padded_content() {
        let mask = block(20, 20, 5, 10, 6, 8);
        let opts = TransformOptions {
            crop_padding: Some(2),
            ..TransformOptions::default()
        };
        let out = transform(&mask, &opts).unwrap();
        assert_eq!((out.mask.width(), out.mask.height()), (9, 6));
        assert_eq!(out.stats.area, 10);
        assert_eq!(
            out.steps,
            vec![TransformStep::Crop {
                bounds: BoundingBox {
                    x_min: 3,
                    y_min: 4,
                    x_max: 12,
                    y_max: 10
                }
            }]
        );
    }

    #[test]
    fn crop_of_empty_mask_is_a_no_op() {
        let mask = Mask::new(7, 5).unwrap();
        let opts = TransformOptions {
            crop_padding: Some(0),
            ..TransformOptions::default()
        };
        let out = transform(&mask, &opts).unwrap();
        assert_eq!(out.mask, mask);
        assert!(out.steps.is_empty());
    }

    #[test]
    fn steps_run_in_fixed_order() {
        let mask = block(20, 20, 5, 15, 5, 15);
        let opts = TransformOptions {
            resize: Some(ResizeOptions {
                target_width: 40,
                target_height: 40,
                ..ResizeOptions::default()
            }),
            rotation: Some(90.0),
            offset: Some((2, 0)),
            crop_padding: Some(0),
        };
        let out = transform(&mask, &opts).unwrap();
        let kinds: Vec<_> = out.steps.iter().map(|s| s.to_string()).collect();
        assert_eq!(kinds.len(), 4);
        assert!(kinds[0].starts_with("resize"));
        assert!(kinds[1].starts_with("rotate"));
        assert!(kinds[2].starts_with("offset"));
        assert!(kinds[3].starts_with("crop"));
    }

    #[test]
    fn zero_rotation_and_offset_are_skipped() {
        let mask = block(8, 8, 1, 3, 1, 3);
        let opts = TransformOptions {
            rotation: Some(0.0),
            offset: Some((0, 0)),
            ..TransformOptions::default()
        };
        let out = transform(&mask, &opts).unwrap();
        assert!(out.steps.is_empty());
        assert_eq!(out.mask, mask);
    }

    #[test]
    fn from_json_reads_nested_resize_and_flags() {
        let opts = TransformOptions::from_json(&json!({
            "resize": {"target_width": 64, "target_height": 32},
            "rotation": 30,
            "offset_y": -4,
            "crop": true,
            "crop_padding": 3
        }))
        .unwrap();
        let resize = opts.resize.unwrap();
        assert_eq!((resize.target_width, resize.target_height), (64, 32));
        assert_eq!(opts.rotation, Some(30.0));
        assert_eq!(opts.offset, Some((0, -4)));
        assert_eq!(opts.crop_padding, Some(3));

        assert_eq!(TransformOptions::from_json(&json!({})).unwrap(), TransformOptions::default());
        assert!(TransformOptions::from_json(&json!({"resize": {"basis": "middle"}})).is_err());
    }

    #[test]
    fn steps_serialize_with_a_tag() {
        let json = serde_json::to_value(TransformStep::Offset { dx: 1, dy: -2 }).unwrap();
        assert_eq!(json, json!({"step": "offset", "dx": 1, "dy": -2}));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rotation_keeps_size_and_range(
                w in 1_usize..=20,
                h in 1_usize..=20,
                degrees in -360.0_f64..360.0,
            ) {
                let mask = Mask::from_fn(w, h, |x, y| ((x * 7 + y * 3) % 5) as f64 / 4.0).unwrap();
                let out = rotate(&mask, degrees).unwrap();
                prop_assert_eq!((out.width(), out.height()), (w, h));
                prop_assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
            }
        }
    }
}
