//! Compositing a freshly generated mask with an existing one.

use serde::{Deserialize, Serialize};

use crate::error::MaskError;
use crate::mask::Mask;
use crate::resample::match_size;

/// How a generated mask `a` is combined with an existing mask `b`.
///
/// `Difference` is directional: it keeps what the existing mask has and the
/// new one does not (`max(b − a, 0)`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Discard the existing mask.
    #[default]
    New,
    Union,
    Intersect,
    Difference,
    SymmetricDifference,
}

named_enum!(BlendMode, "blend", {
    New => "new",
    Union => "union",
    Intersect => "intersect",
    Difference => "difference",
    SymmetricDifference => "symmetric_difference",
});

impl BlendMode {
    /// Blends one generated sample `a` with one existing sample `b`.
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BlendMode::New => a,
            BlendMode::Union => a.max(b),
            BlendMode::Intersect => a.min(b),
            BlendMode::Difference => (b - a).max(0.0),
            BlendMode::SymmetricDifference => a + b - 2.0 * a * b,
        }
    }
}

/// Combines `generated` with `existing` under `mode`.
///
/// The result always has `generated`'s size; `existing` is resampled
/// bilinearly if it differs.
pub fn combine(generated: &Mask, existing: &Mask, mode: BlendMode) -> Result<Mask, MaskError> {
    if mode == BlendMode::New {
        return Ok(generated.clone());
    }
    tracing::debug!(
        mode = %mode,
        width = generated.width(),
        height = generated.height(),
        "combine"
    );
    let existing = match_size(existing, generated)?;
    generated.zip_with(&existing, |a, b| mode.apply(a, b))
}
