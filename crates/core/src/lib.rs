#![deny(unsafe_code)]
//! Core types and operations for the mask-forge procedural mask engine.
//!
//! Provides the `Mask` buffer, the shape rasterizer and field generators,
//! blend compositing, content-aware resizing, connected-region selection,
//! mask comparison, geometric transforms, statistics, the `Xorshift64` PRNG,
//! and parameter helpers.

/// Implements `ALL`, `name()`, `FromStr` and `Display` for a fieldless enum
/// from a table of snake_case names. Unknown names parse to
/// `MaskError::InvalidConfiguration` for `$field`.
macro_rules! named_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The snake_case name used in JSON options and on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::error::MaskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err($crate::error::MaskError::invalid($field, other)),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub mod blend;
pub mod blur;
pub mod compare;
pub mod error;
pub mod field;
pub mod generate;
pub mod mask;
pub mod params;
pub mod prng;
pub mod region;
pub mod resample;
pub mod resize;
pub mod shape;
pub mod stats;
pub mod transform;

pub use blend::{combine, BlendMode};
pub use blur::gaussian_blur;
pub use compare::{compare, CompareMetric, Comparison};
pub use error::MaskError;
pub use field::{GradientKind, NoiseKind};
pub use generate::{generate, GenerateOptions, Generated};
pub use mask::{BoundingBox, Mask, FOREGROUND_THRESHOLD};
pub use prng::Xorshift64;
pub use region::{
    detect, select, sort_regions, Region, SelectOptions, SelectOutcome, Selection, SortDirection,
};
pub use resample::{resample, Interpolation};
pub use resize::{resize, AlignMode, ResizeBasis, ResizeOptions, ResizeOutcome};
pub use shape::{rasterize, AaQuality, Edge, ShapeKind, ShapeParams};
pub use stats::MaskStats;
pub use transform::{transform, TransformOptions, TransformOutcome, TransformStep};
