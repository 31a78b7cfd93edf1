//! The mask generation pipeline: rasterize, feather, blend, invert.

use serde_json::Value;

use crate::blend::{combine, BlendMode};
use crate::blur::gaussian_blur;
use crate::error::MaskError;
use crate::mask::Mask;
use crate::params::{param_bool, param_enum, param_f64, param_usize};
use crate::shape::{rasterize, AaQuality, Edge, ShapeParams};
use crate::stats::MaskStats;

const DEFAULT_SIZE: usize = 512;
const DEFAULT_FEATHER: f64 = 2.0;

/// Widest accepted feather, in pixels.
pub const MAX_FEATHER: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Canvas size, ignored when an existing mask is supplied.
    pub width: usize,
    pub height: usize,
    pub shape: ShapeParams,
    /// Edge softening in pixels. Scaled by `aa_quality` for distance-field
    /// shapes; used directly as the blur sigma for the rest.
    pub feather: f64,
    pub aa_quality: AaQuality,
    pub blend: BlendMode,
    pub invert: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            shape: ShapeParams::default(),
            feather: DEFAULT_FEATHER,
            aa_quality: AaQuality::Standard,
            blend: BlendMode::New,
            invert: false,
        }
    }
}

impl GenerateOptions {
    /// Reads `width`, `height`, `feather`, `aa_quality`, `blend`, `invert`
    /// and the flat shape keys of [`ShapeParams::from_json`].
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let edge = Edge::from_json(params)?;
        Ok(Self {
            width: param_usize(params, "width", DEFAULT_SIZE),
            height: param_usize(params, "height", DEFAULT_SIZE),
            shape: ShapeParams::from_json(params)?,
            feather: edge.feather,
            aa_quality: edge.quality,
            blend: param_enum(params, "blend", BlendMode::New)?,
            invert: param_bool(params, "invert", false),
        })
    }

    pub fn edge(&self) -> Edge {
        Edge {
            feather: self.feather,
            quality: self.aa_quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub mask: Mask,
    pub stats: MaskStats,
}

/// Generates a mask, optionally composited onto `existing`.
///
/// When `existing` is given its size overrides `options.width`/`height`.
/// Returns `MaskError::InvalidConfiguration` for a feather outside
/// `0..=MAX_FEATHER`.
pub fn generate(
    options: &GenerateOptions,
    existing: Option<&Mask>,
) -> Result<Generated, MaskError> {
    if !(0.0..=MAX_FEATHER).contains(&options.feather) {
        return Err(MaskError::invalid("feather", options.feather));
    }
    let (width, height) = existing
        .map(|m| (m.width(), m.height()))
        .unwrap_or((options.width, options.height));
    tracing::debug!(
        shape = %options.shape.kind(),
        width,
        height,
        blend = %options.blend,
        invert = options.invert,
        "generate"
    );

    let mut mask = rasterize(&options.shape, options.edge(), width, height)?;
    if !options.shape.has_distance_field() && options.feather > 0.0 {
        mask = gaussian_blur(&mask, options.feather);
    }
    if let Some(existing) = existing {
        mask = combine(&mask, existing, options.blend)?;
    }
    if options.invert {
        mask = mask.invert();
    }

    let stats = MaskStats::of(&mask);
    Ok(Generated { mask, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{CircleParams, PolygonParams, RectangleParams};
    use glam::DVec2;
    use serde_json::json;

    fn options(shape: ShapeParams, width: usize, height: usize) -> GenerateOptions {
        GenerateOptions {
            width,
            height,
            shape,
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn default_options_generate_a_centred_circle() {
        let out = generate(&GenerateOptions::default(), None).unwrap();
        assert_eq!((out.mask.width(), out.mask.height()), (512, 512));
        assert_eq!(out.mask.get(256, 256), 1.0);
        assert_eq!(out.mask.get(0, 0), 0.0);
        assert_eq!(out.stats.area, out.mask.count_above(0.5));
    }

    #[test]
    fn distance_field_shapes_skip_the_blur() {
        let opts = options(ShapeParams::default(), 64, 48);
        let out = generate(&opts, None).unwrap();
        let direct = rasterize(&opts.shape, opts.edge(), 64, 48).unwrap();
        assert_eq!(out.mask, direct);
    }

    #[test]
    fn polygons_are_feathered_by_blur() {
        let shape = ShapeParams::Polygon(PolygonParams::default());
        let soft = generate(&options(shape, 64, 64), None).unwrap();
        assert!(soft.mask.data().iter().any(|&v| v > 0.0 && v < 1.0));

        let hard = GenerateOptions {
            feather: 0.0,
            ..options(shape, 64, 64)
        };
        let out = generate(&hard, None).unwrap();
        assert!(out.mask.data().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn existing_mask_sets_canvas_size_and_blends() {
        let existing = Mask::from_fn(40, 30, |x, _| f64::from(u8::from(x < 4))).unwrap();
        let opts = GenerateOptions {
            blend: BlendMode::Union,
            ..options(ShapeParams::default(), 512, 512)
        };
        let out = generate(&opts, Some(&existing)).unwrap();
        assert_eq!((out.mask.width(), out.mask.height()), (40, 30));
        assert_eq!(out.mask.get(0, 0), 1.0);
        assert_eq!(out.mask.get(20, 15), 1.0);
    }

    #[test]
    fn difference_subtracts_the_new_shape() {
        let existing = Mask::filled(50, 50, 1.0).unwrap();
        let shape = ShapeParams::Rectangle(RectangleParams {
            center: DVec2::splat(0.5),
            width: 0.2,
            height: 0.2,
            ..RectangleParams::default()
        });
        let opts = GenerateOptions {
            blend: BlendMode::Difference,
            ..options(shape, 50, 50)
        };
        let out = generate(&opts, Some(&existing)).unwrap();
        assert_eq!(out.mask.get(25, 25), 0.0);
        assert_eq!(out.mask.get(2, 2), 1.0);
    }

    #[test]
    fn invert_flips_the_final_mask() {
        let shape = ShapeParams::Circle(CircleParams {
            center: DVec2::splat(0.5),
            radius: 0.25,
        });
        let plain = generate(&options(shape, 32, 32), None).unwrap();
        let inverted = generate(
            &GenerateOptions {
                invert: true,
                ..options(shape, 32, 32)
            },
            None,
        )
        .unwrap();
        assert_eq!(inverted.mask, plain.mask.invert());
        assert_eq!(
            inverted.stats.area + plain.stats.area,
            32 * 32 - boundary_half_pixels(&plain.mask)
        );
    }

    /// Pixels at exactly 0.5 count as foreground in neither polarity.
    fn boundary_half_pixels(mask: &Mask) -> usize {
        mask.data().iter().filter(|&&v| v == 0.5).count()
    }

    #[test]
    fn from_json_combines_shape_and_pipeline_keys() {
        let params = json!({
            "width": 128,
            "height": 64,
            "shape": "star",
            "sides": 7,
            "feather": 0.5,
            "aa_quality": "ultra",
            "blend": "intersect",
            "invert": true
        });
        let opts = GenerateOptions::from_json(&params).unwrap();
        assert_eq!((opts.width, opts.height), (128, 64));
        assert_eq!(opts.feather, 0.5);
        assert_eq!(opts.aa_quality, AaQuality::Ultra);
        assert_eq!(opts.blend, BlendMode::Intersect);
        assert!(opts.invert);
        match opts.shape {
            ShapeParams::Star(star) => assert_eq!(star.points, 7),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn from_json_rejects_unknown_blend() {
        let err = GenerateOptions::from_json(&json!({"blend": "overlay"})).unwrap_err();
        assert!(matches!(err, MaskError::InvalidConfiguration { ref field, .. } if field == "blend"));
    }

    #[test]
    fn invalid_shape_parameters_surface_as_errors() {
        let opts = options(
            ShapeParams::Polygon(PolygonParams {
                sides: 1,
                ..PolygonParams::default()
            }),
            16,
            16,
        );
        assert!(matches!(
            generate(&opts, None),
            Err(MaskError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn feather_outside_accepted_range_is_rejected() {
        for feather in [-1.0, MAX_FEATHER + 0.5, 1e12] {
            let opts = GenerateOptions {
                feather,
                ..options(ShapeParams::Polygon(PolygonParams::default()), 16, 16)
            };
            let err = generate(&opts, None).unwrap_err();
            assert!(matches!(err, MaskError::InvalidConfiguration { ref field, .. } if field == "feather"));
        }
        let widest = GenerateOptions {
            feather: MAX_FEATHER,
            ..options(ShapeParams::default(), 8, 8)
        };
        assert!(generate(&widest, None).is_ok());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn double_invert_round_trips(radius in 0.0_f64..0.6, feather in 0.0_f64..5.0) {
                let shape = ShapeParams::Circle(CircleParams { center: DVec2::splat(0.5), radius });
                let opts = GenerateOptions { feather, ..options(shape, 24, 24) };
                let once = generate(&opts, None).unwrap().mask;
                let twice = generate(&GenerateOptions { invert: true, ..opts }, None).unwrap().mask.invert();
                for (a, b) in once.data().iter().zip(twice.data()) {
                    prop_assert!((a - b).abs() < 1e-12);
                }
            }
        }
    }
}
