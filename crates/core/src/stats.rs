//! Summary statistics reported alongside generated and transformed masks.

use std::fmt;

use serde::Serialize;

use crate::mask::{Mask, FOREGROUND_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaskStats {
    pub width: usize,
    pub height: usize,
    /// Pixels above 0.5.
    pub area: usize,
    /// `area` as a percentage of all pixels.
    pub coverage: f64,
    pub mean: f64,
}

impl MaskStats {
    pub fn of(mask: &Mask) -> Self {
        let area = mask.count_above(FOREGROUND_THRESHOLD);
        let total = mask.width() * mask.height();
        Self {
            width: mask.width(),
            height: mask.height(),
            area,
            coverage: area as f64 / total as f64 * 100.0,
            mean: mask.mean(),
        }
    }
}

impl fmt::Display for MaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "size:     {}x{}", self.width, self.height)?;
        writeln!(f, "area:     {} px", self.area)?;
        writeln!(f, "coverage: {:.1}%", self.coverage)?;
        write!(f, "mean:     {:.3}", self.mean)
    }
}
