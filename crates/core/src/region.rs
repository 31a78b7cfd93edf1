//! Connected-region detection and selection.
//!
//! Samples above 0.5 are foreground. Regions are 8-connected components,
//! labelled in the order their first pixel is met in a row-major scan. That
//! order is also the tie-break for every sort direction.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MaskError;
use crate::mask::{BoundingBox, Mask, FOREGROUND_THRESHOLD};
use crate::params::{param_enum, param_usize};

/// Ordering applied to detected regions before selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
    AreaDescending,
    AreaAscending,
}

named_enum!(SortDirection, "direction", {
    TopToBottom => "top_to_bottom",
    BottomToTop => "bottom_to_top",
    LeftToRight => "left_to_right",
    RightToLeft => "right_to_left",
    AreaDescending => "area_descending",
    AreaAscending => "area_ascending",
});

/// Which sorted regions end up in the output mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// The region at this index; region 0 if out of range.
    Single(usize),
    All,
    /// The first `n` regions (fewer if fewer exist).
    TopN(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Single(0)
    }
}

/// Selection mode names, used to resolve [`Selection`] from flat options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionMode {
    Single,
    All,
    TopN,
}

named_enum!(SelectionMode, "selection", {
    Single => "single",
    All => "all",
    TopN => "top_n",
});

/// One connected foreground component.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Half-open pixel bounds.
    pub bounds: BoundingBox,
    /// Midpoint of the inclusive bounds.
    pub centroid: DVec2,
    /// Pixel count.
    pub area: usize,
    /// Binary membership, sized to `bounds`.
    pub membership: Mask,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectOptions {
    pub direction: SortDirection,
    pub selection: Selection,
    /// Regions with fewer pixels are discarded.
    pub min_area: usize,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            direction: SortDirection::TopToBottom,
            selection: Selection::Single(0),
            min_area: 10,
        }
    }
}

impl SelectOptions {
    /// Reads `direction`, `selection` (`single`, `all`, `top_n`), `index`,
    /// `count` and `min_area`.
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let d = Self::default();
        let selection = match param_enum(params, "selection", SelectionMode::Single)? {
            SelectionMode::Single => Selection::Single(param_usize(params, "index", 0)),
            SelectionMode::All => Selection::All,
            SelectionMode::TopN => Selection::TopN(param_usize(params, "count", 3)),
        };
        Ok(Self {
            direction: param_enum(params, "direction", d.direction)?,
            selection,
            min_area: param_usize(params, "min_area", d.min_area),
        })
    }
}

/// Result of [`select`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOutcome {
    /// Binary mask of the chosen regions, at the source size.
    pub mask: Mask,
    /// Every surviving region, in sorted order.
    pub regions: Vec<Region>,
    /// Set when the request could not be honoured exactly.
    pub warning: Option<String>,
}

const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Labels the 8-connected foreground components of `mask`, dropping those
/// smaller than `min_area`. Regions come back in scan order.
pub fn detect(mask: &Mask, min_area: usize) -> Result<Vec<Region>, MaskError> {
    let w = mask.width();
    let h = mask.height();
    let foreground: Vec<bool> = mask.data().iter().map(|&v| v > FOREGROUND_THRESHOLD).collect();
    let mut visited = vec![false; w * h];
    let mut regions = Vec::new();
    let mut stack = Vec::new();
    let mut pixels = Vec::new();

    for start in 0..w * h {
        if !foreground[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        pixels.clear();
        while let Some(i) = stack.pop() {
            let (x, y) = (i % w, i / w);
            pixels.push((x, y));
            for (dx, dy) in NEIGHBOURS {
                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };
                if nx >= w || ny >= h {
                    continue;
                }
                let j = ny * w + nx;
                if foreground[j] && !visited[j] {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }
        if pixels.len() < min_area {
            continue;
        }
        regions.push(region_from_pixels(&pixels)?);
    }
    Ok(regions)
}

fn region_from_pixels(pixels: &[(usize, usize)]) -> Result<Region, MaskError> {
    let bounds = pixels.iter().fold(
        BoundingBox {
            x_min: usize::MAX,
            y_min: usize::MAX,
            x_max: 0,
            y_max: 0,
        },
        |b, &(x, y)| BoundingBox {
            x_min: b.x_min.min(x),
            y_min: b.y_min.min(y),
            x_max: b.x_max.max(x + 1),
            y_max: b.y_max.max(y + 1),
        },
    );
    let mut membership = vec![0.0; bounds.area()];
    for &(x, y) in pixels {
        membership[(y - bounds.y_min) * bounds.width() + (x - bounds.x_min)] = 1.0;
    }
    let centroid = DVec2::new(
        (bounds.x_min + bounds.x_max - 1) as f64 / 2.0,
        (bounds.y_min + bounds.y_max - 1) as f64 / 2.0,
    );
    Ok(Region {
        bounds,
        centroid,
        area: pixels.len(),
        membership: Mask::from_data(bounds.width(), bounds.height(), membership)?,
    })
}

/// Stable sort of `regions` by `direction`; equal keys keep their order.
pub fn sort_regions(regions: &mut [Region], direction: SortDirection) {
    match direction {
        SortDirection::TopToBottom => regions.sort_by(|a, b| a.centroid.y.total_cmp(&b.centroid.y)),
        SortDirection::BottomToTop => regions.sort_by(|a, b| b.centroid.y.total_cmp(&a.centroid.y)),
        SortDirection::LeftToRight => regions.sort_by(|a, b| a.centroid.x.total_cmp(&b.centroid.x)),
        SortDirection::RightToLeft => regions.sort_by(|a, b| b.centroid.x.total_cmp(&a.centroid.x)),
        SortDirection::AreaDescending => regions.sort_by(|a, b| b.area.cmp(&a.area)),
        SortDirection::AreaAscending => regions.sort_by(|a, b| a.area.cmp(&b.area)),
    }
}

/// Detects, sorts and selects regions of `mask`.
///
/// With no surviving regions the result is all background at the source
/// size. An out-of-range single index falls back to region 0 and sets
/// `warning`.
pub fn select(mask: &Mask, options: &SelectOptions) -> Result<SelectOutcome, MaskError> {
    let mut regions = detect(mask, options.min_area)?;
    sort_regions(&mut regions, options.direction);
    tracing::debug!(
        regions = regions.len(),
        direction = %options.direction,
        min_area = options.min_area,
        "select"
    );

    let mut out = Mask::new(mask.width(), mask.height())?;
    let mut warning = None;
    if !regions.is_empty() {
        let chosen: &[Region] = match options.selection {
            Selection::Single(i) if i < regions.len() => &regions[i..=i],
            Selection::Single(i) => {
                let message = format!(
                    "region index {i} out of range ({} regions), using region 0",
                    regions.len()
                );
                tracing::warn!(
                    index = i,
                    regions = regions.len(),
                    "region index out of range, using region 0"
                );
                warning = Some(message);
                &regions[..1]
            }
            Selection::All => &regions,
            Selection::TopN(n) => &regions[..n.min(regions.len())],
        };
        for region in chosen {
            paint(region, &mut out);
        }
    }

    Ok(SelectOutcome {
        mask: out,
        regions,
        warning,
    })
}

/// Sets `region`'s pixels to 1.0 in `target`, which has the source size.
fn paint(region: &Region, target: &mut Mask) {
    let width = target.width();
    let data = target.data_mut();
    for (x, y, v) in region.membership.iter() {
        if v > 0.0 {
            data[(region.bounds.y_min + y) * width + region.bounds.x_min + x] = 1.0;
        }
    }
}
