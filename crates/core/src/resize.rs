//! Content-aware resizing onto a fixed target canvas.
//!
//! The source region is either the tight bounding box of the foreground
//! (optionally padded) or the whole buffer. It is scaled to the target,
//! preserving aspect ratio if requested, and any leftover margin is filled
//! with background according to the alignment.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MaskError;
use crate::mask::{BoundingBox, Mask};
use crate::params::{param_bool, param_enum, param_usize};
use crate::resample::{resample, Interpolation};

/// Which part of the source mask is scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeBasis {
    /// The padded bounding box of samples above 0.5; the whole buffer if none.
    #[default]
    ContentBoundingBox,
    FullCanvas,
}

named_enum!(ResizeBasis, "basis", {
    ContentBoundingBox => "content_bounding_box",
    FullCanvas => "full_canvas",
});

/// Where a scaled region smaller than the target is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignMode {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

named_enum!(AlignMode, "align", {
    Center => "center",
    TopLeft => "top_left",
    TopRight => "top_right",
    BottomLeft => "bottom_left",
    BottomRight => "bottom_right",
});

impl AlignMode {
    /// Offset of the placed region given the free space on each axis.
    pub fn offsets(self, slack_x: usize, slack_y: usize) -> (usize, usize) {
        match self {
            AlignMode::Center => (slack_x / 2, slack_y / 2),
            AlignMode::TopLeft => (0, 0),
            AlignMode::TopRight => (slack_x, 0),
            AlignMode::BottomLeft => (0, slack_y),
            AlignMode::BottomRight => (slack_x, slack_y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub target_width: usize,
    pub target_height: usize,
    pub basis: ResizeBasis,
    pub keep_aspect: bool,
    pub interpolation: Interpolation,
    pub align: AlignMode,
    /// Pixels added around the content bounding box before scaling.
    pub padding: usize,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            target_width: 512,
            target_height: 512,
            basis: ResizeBasis::ContentBoundingBox,
            keep_aspect: true,
            interpolation: Interpolation::Bilinear,
            align: AlignMode::Center,
            padding: 0,
        }
    }
}

impl ResizeOptions {
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let d = Self::default();
        Ok(Self {
            target_width: param_usize(params, "target_width", d.target_width),
            target_height: param_usize(params, "target_height", d.target_height),
            basis: param_enum(params, "basis", d.basis)?,
            keep_aspect: param_bool(params, "keep_aspect", d.keep_aspect),
            interpolation: param_enum(params, "interpolation", d.interpolation)?,
            align: param_enum(params, "align", d.align)?,
            padding: param_usize(params, "padding", d.padding),
        })
    }
}

/// A resized mask together with the geometry that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    /// Always `target_width × target_height`.
    pub mask: Mask,
    /// Size of the scaled region before placement.
    pub actual_width: usize,
    pub actual_height: usize,
    pub offset_x: usize,
    pub offset_y: usize,
    /// Size of the source region that was scaled.
    pub content_width: usize,
    pub content_height: usize,
    /// `min(target_w / content_w, target_h / content_h)`, also reported when stretching.
    pub scale: f64,
}

/// Resizes `mask` onto a `target_width × target_height` canvas.
///
/// Returns `MaskError::InvalidDimensions` if the target size is zero.
pub fn resize(mask: &Mask, options: &ResizeOptions) -> Result<ResizeOutcome, MaskError> {
    let tw = options.target_width;
    let th = options.target_height;
    if tw == 0 || th == 0 {
        return Err(MaskError::InvalidDimensions);
    }
    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        target_width = tw,
        target_height = th,
        basis = %options.basis,
        interpolation = %options.interpolation,
        "resize"
    );

    let full = BoundingBox::full(mask.width(), mask.height());
    let region = match options.basis {
        ResizeBasis::ContentBoundingBox => mask
            .content_bounds()
            .map(|b| b.padded(options.padding, mask.width(), mask.height()))
            .unwrap_or(full),
        ResizeBasis::FullCanvas => full,
    };
    let source = if region == full {
        mask.clone()
    } else {
        mask.crop(&region)?
    };
    let sw = source.width();
    let sh = source.height();

    let scale = (tw as f64 / sw as f64).min(th as f64 / sh as f64);
    let (new_w, new_h) = if options.keep_aspect {
        (
            ((sw as f64 * scale).round() as usize).clamp(1, tw),
            ((sh as f64 * scale).round() as usize).clamp(1, th),
        )
    } else {
        (tw, th)
    };

    let scaled = resample(&source, new_w, new_h, options.interpolation)?;
    let (mask, offset_x, offset_y) = if (new_w, new_h) == (tw, th) {
        (scaled, 0, 0)
    } else {
        let (ox, oy) = options.align.offsets(tw - new_w, th - new_h);
        let mut canvas = Mask::new(tw, th)?;
        canvas.paste(&scaled, ox, oy);
        (canvas, ox, oy)
    };

    Ok(ResizeOutcome {
        mask,
        actual_width: new_w,
        actual_height: new_h,
        offset_x,
        offset_y,
        content_width: sw,
        content_height: sh,
        scale,
    })
}
