//! Shape rasterizer: turns a shape descriptor into a mask.
//!
//! Rectangles, circles and ellipses are evaluated through a signed distance
//! to their boundary and a smoothstep ramp of `edge` pixels centred on it.
//! Polygons and stars are filled by scanline on integer vertices and come out
//! binary; the generation pipeline softens them afterwards with a blur.
//! Gradients, noise and checkerboards are delegated to [`crate::field`].

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MaskError;
use crate::field::{self, CheckerboardParams, GradientParams, NoiseParams};
use crate::mask::Mask;
use crate::params::{param_bool, param_enum, param_f64, param_u64, param_usize};
use crate::prng::Xorshift64;

/// Narrowest antialiasing ramp, in pixels.
const MIN_EDGE_WIDTH: f64 = 0.5;

/// Accepted range for polygon `sides` and star `points`.
pub const MIN_SIDES: usize = 3;
pub const MAX_SIDES: usize = 20;

/// Antialiasing strength; scales the feather width of distance-field shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AaQuality {
    /// Hard threshold at the boundary.
    Off,
    #[default]
    Standard,
    High,
    Ultra,
}

named_enum!(AaQuality, "aa_quality", {
    Off => "off",
    Standard => "standard",
    High => "high",
    Ultra => "ultra",
});

impl AaQuality {
    /// Feather multiplier.
    pub fn multiplier(self) -> f64 {
        match self {
            AaQuality::Off => 0.0,
            AaQuality::Standard => 1.0,
            AaQuality::High => 1.5,
            AaQuality::Ultra => 2.0,
        }
    }
}

/// Shared edge-softening controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Feather width in pixels.
    pub feather: f64,
    pub quality: AaQuality,
}

impl Default for Edge {
    fn default() -> Self {
        Self {
            feather: 2.0,
            quality: AaQuality::Standard,
        }
    }
}

impl Edge {
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let defaults = Self::default();
        Ok(Self {
            feather: param_f64(params, "feather", defaults.feather),
            quality: param_enum(params, "aa_quality", defaults.quality)?,
        })
    }

    /// Width of the smoothstep ramp, or `None` for a hard edge.
    fn band(&self) -> Option<f64> {
        match self.quality {
            AaQuality::Off => None,
            q => Some((self.feather * q.multiplier()).max(MIN_EDGE_WIDTH)),
        }
    }
}

/// Shape kind selector, as named in JSON options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    #[default]
    Circle,
    Ellipse,
    Polygon,
    Star,
    Gradient,
    Noise,
    Checkerboard,
}

named_enum!(ShapeKind, "shape", {
    Rectangle => "rectangle",
    Circle => "circle",
    Ellipse => "ellipse",
    Polygon => "polygon",
    Star => "star",
    Gradient => "gradient",
    Noise => "noise",
    Checkerboard => "checkerboard",
});

/// Centers are canvas fractions; rotations are degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleParams {
    pub center: DVec2,
    /// Width as a fraction of the canvas width.
    pub width: f64,
    /// Height as a fraction of the canvas height.
    pub height: f64,
    /// Corner radius in pixels.
    pub corner_radius: f64,
    pub rotation: f64,
}

impl Default for RectangleParams {
    fn default() -> Self {
        Self {
            center: DVec2::splat(0.5),
            width: 0.5,
            height: 0.5,
            corner_radius: 0.0,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleParams {
    pub center: DVec2,
    /// Radius as a fraction of the shorter canvas side.
    pub radius: f64,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            center: DVec2::splat(0.5),
            radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseParams {
    pub center: DVec2,
    /// Horizontal semi-axis as a fraction of the canvas width.
    pub major_axis: f64,
    /// Vertical semi-axis as a fraction of the canvas height.
    pub minor_axis: f64,
    pub rotation: f64,
}

impl Default for EllipseParams {
    fn default() -> Self {
        Self {
            center: DVec2::splat(0.5),
            major_axis: 0.3,
            minor_axis: 0.2,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonParams {
    pub center: DVec2,
    pub radius: f64,
    pub sides: usize,
    pub rotation: f64,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self {
            center: DVec2::splat(0.5),
            radius: 0.3,
            sides: 5,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarParams {
    pub center: DVec2,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub points: usize,
    pub rotation: f64,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            center: DVec2::splat(0.5),
            outer_radius: 0.3,
            inner_radius: 0.15,
            points: 5,
            rotation: 0.0,
        }
    }
}

/// A shape descriptor: one variant per kind, each with its own geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeParams {
    Rectangle(RectangleParams),
    Circle(CircleParams),
    Ellipse(EllipseParams),
    Polygon(PolygonParams),
    Star(StarParams),
    Gradient(GradientParams),
    Noise(NoiseParams),
    Checkerboard(CheckerboardParams),
}

impl Default for ShapeParams {
    fn default() -> Self {
        ShapeParams::Circle(CircleParams::default())
    }
}

impl ShapeParams {
    /// Builds a descriptor from a flat JSON object.
    ///
    /// `shape` names the kind (default `circle`); the remaining keys are read
    /// only for that kind: `center_x`, `center_y`, `width`, `height`,
    /// `corner_radius`, `rotation`, `radius`, `major_axis`, `minor_axis`,
    /// `sides`, `inner_radius`, `points` (falls back to `sides`), `gradient`,
    /// `angle`, `reverse`, `noise`, `strength`, `scale`, `seed`, `cells_x`,
    /// `cells_y`.
    pub fn from_json(params: &Value) -> Result<Self, MaskError> {
        let kind = param_enum(params, "shape", ShapeKind::default())?;
        let center = DVec2::new(
            param_f64(params, "center_x", 0.5),
            param_f64(params, "center_y", 0.5),
        );
        let shape = match kind {
            ShapeKind::Rectangle => {
                let d = RectangleParams::default();
                ShapeParams::Rectangle(RectangleParams {
                    center,
                    width: param_f64(params, "width", d.width),
                    height: param_f64(params, "height", d.height),
                    corner_radius: param_f64(params, "corner_radius", d.corner_radius),
                    rotation: param_f64(params, "rotation", d.rotation),
                })
            }
            ShapeKind::Circle => ShapeParams::Circle(CircleParams {
                center,
                radius: param_f64(params, "radius", CircleParams::default().radius),
            }),
            ShapeKind::Ellipse => {
                let d = EllipseParams::default();
                ShapeParams::Ellipse(EllipseParams {
                    center,
                    major_axis: param_f64(params, "major_axis", d.major_axis),
                    minor_axis: param_f64(params, "minor_axis", d.minor_axis),
                    rotation: param_f64(params, "rotation", d.rotation),
                })
            }
            ShapeKind::Polygon => {
                let d = PolygonParams::default();
                ShapeParams::Polygon(PolygonParams {
                    center,
                    radius: param_f64(params, "radius", d.radius),
                    sides: param_usize(params, "sides", d.sides),
                    rotation: param_f64(params, "rotation", d.rotation),
                })
            }
            ShapeKind::Star => {
                let d = StarParams::default();
                ShapeParams::Star(StarParams {
                    center,
                    outer_radius: param_f64(params, "radius", d.outer_radius),
                    inner_radius: param_f64(params, "inner_radius", d.inner_radius),
                    points: param_usize(params, "points", param_usize(params, "sides", d.points)),
                    rotation: param_f64(params, "rotation", d.rotation),
                })
            }
            ShapeKind::Gradient => {
                let d = GradientParams::default();
                ShapeParams::Gradient(GradientParams {
                    kind: param_enum(params, "gradient", d.kind)?,
                    angle: param_f64(params, "angle", d.angle),
                    reverse: param_bool(params, "reverse", d.reverse),
                })
            }
            ShapeKind::Noise => {
                let d = NoiseParams::default();
                ShapeParams::Noise(NoiseParams {
                    kind: param_enum(params, "noise", d.kind)?,
                    strength: param_f64(params, "strength", d.strength),
                    scale: param_f64(params, "scale", d.scale),
                    seed: param_u64(params, "seed", d.seed),
                })
            }
            ShapeKind::Checkerboard => {
                let d = CheckerboardParams::default();
                ShapeParams::Checkerboard(CheckerboardParams {
                    cells_x: param_usize(params, "cells_x", d.cells_x),
                    cells_y: param_usize(params, "cells_y", d.cells_y),
                })
            }
        };
        Ok(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeParams::Rectangle(_) => ShapeKind::Rectangle,
            ShapeParams::Circle(_) => ShapeKind::Circle,
            ShapeParams::Ellipse(_) => ShapeKind::Ellipse,
            ShapeParams::Polygon(_) => ShapeKind::Polygon,
            ShapeParams::Star(_) => ShapeKind::Star,
            ShapeParams::Gradient(_) => ShapeKind::Gradient,
            ShapeParams::Noise(_) => ShapeKind::Noise,
            ShapeParams::Checkerboard(_) => ShapeKind::Checkerboard,
        }
    }

    /// Whether the shape antialiases its own edge through a distance field.
    pub fn has_distance_field(&self) -> bool {
        matches!(
            self,
            ShapeParams::Rectangle(_) | ShapeParams::Circle(_) | ShapeParams::Ellipse(_)
        )
    }
}

/// Hermite smoothstep `3t² − 2t³` of `t` clamped to [0, 1].
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Coverage of a sample at signed distance `dist` (negative inside).
fn coverage(dist: f64, band: Option<f64>) -> f64 {
    match band {
        None => f64::from(u8::from(dist <= 0.0)),
        Some(edge) => smoothstep((-dist + edge / 2.0) / edge),
    }
}

/// Pixel position of a fractional center on a `width × height` canvas.
fn canvas_point(center: DVec2, width: usize, height: usize) -> DVec2 {
    center * DVec2::new(width as f64, height as f64)
}

/// Maps a pixel into a frame centred on `origin` and rotated by `-degrees`.
fn local_frame(x: usize, y: usize, origin: DVec2, degrees: f64) -> DVec2 {
    let offset = DVec2::new(x as f64, y as f64) - origin;
    if degrees == 0.0 {
        offset
    } else {
        DVec2::from_angle(-degrees.to_radians()).rotate(offset)
    }
}

/// Signed distance to an axis-aligned box of half-extents `half` with
/// corners rounded by `radius`.
fn rounded_box_distance(p: DVec2, half: DVec2, radius: f64) -> f64 {
    let q = p.abs() - half + DVec2::splat(radius);
    if radius > 0.0 {
        q.max(DVec2::ZERO).length() + q.x.max(q.y).min(0.0) - radius
    } else {
        q.x.max(q.y)
    }
}

fn rectangle(
    p: &RectangleParams,
    edge: Edge,
    width: usize,
    height: usize,
) -> Result<Mask, MaskError> {
    let origin = canvas_point(p.center, width, height);
    let half = DVec2::new(p.width * width as f64, p.height * height as f64) / 2.0;
    let band = edge.band();
    Mask::from_fn(width, height, |x, y| {
        let local = local_frame(x, y, origin, p.rotation);
        coverage(rounded_box_distance(local, half, p.corner_radius), band)
    })
}

fn circle(p: &CircleParams, edge: Edge, width: usize, height: usize) -> Result<Mask, MaskError> {
    let origin = canvas_point(p.center, width, height);
    let radius = p.radius * width.min(height) as f64;
    let band = edge.band();
    Mask::from_fn(width, height, |x, y| {
        let dist = DVec2::new(x as f64, y as f64).distance(origin) - radius;
        coverage(dist, band)
    })
}

fn ellipse(p: &EllipseParams, edge: Edge, width: usize, height: usize) -> Result<Mask, MaskError> {
    let axes = DVec2::new(p.major_axis * width as f64, p.minor_axis * height as f64);
    if axes.x <= 0.0 || axes.y <= 0.0 {
        return Mask::new(width, height);
    }
    let origin = canvas_point(p.center, width, height);
    // The ramp is measured in normalized radius units.
    let band = edge.band().map(|e| e / axes.max_element());
    Mask::from_fn(width, height, |x, y| {
        let n = (local_frame(x, y, origin, p.rotation) / axes).length();
        coverage(n - 1.0, band)
    })
}

/// Vertices on a ring around `center`, cycling through `radii`.
///
/// Center, radii and per-vertex offsets are truncated to whole pixels.
fn ring_vertices(
    center: DVec2,
    radii: &[f64],
    count: usize,
    rotation: f64,
    width: usize,
    height: usize,
) -> Vec<DVec2> {
    let origin = canvas_point(center, width, height).trunc();
    let scale = width.min(height) as f64;
    (0..count)
        .map(|i| {
            let angle = TAU * i as f64 / count as f64 + rotation.to_radians();
            let r = (radii[i % radii.len()] * scale).trunc();
            origin + (DVec2::from_angle(angle) * r).trunc()
        })
        .collect()
}

/// Clips segment `a → b` to the box `lo..=hi` (Liang-Barsky).
fn clip_segment(a: DVec2, b: DVec2, lo: DVec2, hi: DVec2) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-d.x, a.x - lo.x),
        (d.x, hi.x - a.x),
        (-d.y, a.y - lo.y),
        (d.y, hi.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Fills the closed polygon `vertices` with 1.0, boundary included.
///
/// Interior spans use the even-odd rule on half-open edges; the outline is
/// then traced so the bottom rows and apexes are covered too. Edges leaving
/// the canvas are clipped before tracing.
fn fill_polygon(vertices: &[DVec2], width: usize, height: usize) -> Result<Mask, MaskError> {
    let mut mask = Mask::new(width, height)?;
    let data = mask.data_mut();
    let edges: Vec<(DVec2, DVec2)> = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b))
        .collect();

    let mut crossings = Vec::with_capacity(edges.len());
    for y in 0..height {
        let yf = y as f64;
        crossings.clear();
        for &(a, b) in &edges {
            let (top, bottom) = if a.y <= b.y { (a, b) } else { (b, a) };
            if yf < top.y || yf >= bottom.y {
                continue;
            }
            let t = (yf - top.y) / (bottom.y - top.y);
            crossings.push(top.x + t * (bottom.x - top.x));
        }
        crossings.sort_by(f64::total_cmp);
        let row = &mut data[y * width..(y + 1) * width];
        for span in crossings.chunks_exact(2) {
            let x0 = span[0].ceil().max(0.0);
            let x1 = span[1].floor().min(width as f64 - 1.0);
            if x0 <= x1 {
                row[x0 as usize..=x1 as usize].fill(1.0);
            }
        }
    }

    let lo = DVec2::splat(-0.5);
    let hi = DVec2::new(width as f64 - 0.5, height as f64 - 0.5);
    for &(a, b) in &edges {
        let inside = |p: DVec2| p.cmpge(lo).all() && p.cmple(hi).all();
        let (a, b) = if inside(a) && inside(b) {
            (a, b)
        } else {
            match clip_segment(a, b, lo, hi) {
                Some(clipped) => clipped,
                None => continue,
            }
        };
        let steps = (b - a).abs().max_element() as usize;
        for s in 0..=steps {
            let t = if steps == 0 { 0.0 } else { s as f64 / steps as f64 };
            let p = a.lerp(b, t).round();
            if p.x >= 0.0 && p.y >= 0.0 && (p.x as usize) < width && (p.y as usize) < height {
                data[p.y as usize * width + p.x as usize] = 1.0;
            }
        }
    }
    Ok(mask)
}

/// Rejects vertex rings whose radius overflowed to a non-finite pixel position.
fn finite_ring(vertices: Vec<DVec2>, radius: f64) -> Result<Vec<DVec2>, MaskError> {
    if vertices.iter().all(|v| v.is_finite()) {
        Ok(vertices)
    } else {
        Err(MaskError::invalid("radius", radius))
    }
}

fn polygon(p: &PolygonParams, width: usize, height: usize) -> Result<Mask, MaskError> {
    if !(MIN_SIDES..=MAX_SIDES).contains(&p.sides) {
        return Err(MaskError::invalid("sides", p.sides));
    }
    let vertices = finite_ring(
        ring_vertices(p.center, &[p.radius], p.sides, p.rotation, width, height),
        p.radius,
    )?;
    fill_polygon(&vertices, width, height)
}

fn star(p: &StarParams, width: usize, height: usize) -> Result<Mask, MaskError> {
    if !(MIN_SIDES..=MAX_SIDES).contains(&p.points) {
        return Err(MaskError::invalid("points", p.points));
    }
    let vertices = finite_ring(
        ring_vertices(
            p.center,
            &[p.outer_radius, p.inner_radius],
            p.points * 2,
            p.rotation,
            width,
            height,
        ),
        p.outer_radius.max(p.inner_radius),
    )?;
    fill_polygon(&vertices, width, height)
}

/// Rasterizes `shape` onto a `width × height` canvas.
///
/// `edge` affects only the distance-field shapes; the caller is responsible
/// for feathering the others. Noise draws from a generator seeded with the
/// descriptor's seed.
pub fn rasterize(
    shape: &ShapeParams,
    edge: Edge,
    width: usize,
    height: usize,
) -> Result<Mask, MaskError> {
    tracing::debug!(
        shape = %shape.kind(),
        width,
        height,
        feather = edge.feather,
        quality = %edge.quality,
        "rasterize"
    );
    match shape {
        ShapeParams::Rectangle(p) => rectangle(p, edge, width, height),
        ShapeParams::Circle(p) => circle(p, edge, width, height),
        ShapeParams::Ellipse(p) => ellipse(p, edge, width, height),
        ShapeParams::Polygon(p) => polygon(p, width, height),
        ShapeParams::Star(p) => star(p, width, height),
        ShapeParams::Gradient(p) => field::gradient(p, width, height),
        ShapeParams::Noise(p) => field::noise(p, width, height, &mut Xorshift64::new(p.seed)),
        ShapeParams::Checkerboard(p) => field::checkerboard(p, width, height),
    }
}
