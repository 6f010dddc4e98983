//! Patch orientation and gradient histogram descriptors.
//!
//! The patch around a keypoint is sampled in a frame rotated by the
//! keypoint's intensity-centroid angle, so the descriptor is unchanged when
//! the image content rotates. Gradients are accumulated into a 4x4 grid of
//! 8-bin orientation histograms, gaussian weighted from the centre, then
//! normalised, clipped at 0.2 and normalised again to damp illumination
//! changes.

use super::types::{DESCRIPTOR_LEN, Descriptor};
use image::GrayImage;
use std::f32::consts::TAU;

const GRID: usize = 4;
const BINS: usize = 8;
const CLIP: f32 = 0.2;

/// Pixel value with coordinates clamped into the image.
#[inline]
fn pixel(img: &GrayImage, x: i64, y: i64) -> f32 {
    let cx = x.clamp(0, img.width() as i64 - 1) as u32;
    let cy = y.clamp(0, img.height() as i64 - 1) as u32;
    img.get_pixel(cx, cy)[0] as f32
}

/// Bilinear sample at a sub-pixel position, edges clamped.
#[inline]
fn sample(img: &GrayImage, x: f32, y: f32) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (ix, iy) = (x0 as i64, y0 as i64);

    let top = pixel(img, ix, iy) * (1.0 - fx) + pixel(img, ix + 1, iy) * fx;
    let bottom = pixel(img, ix, iy + 1) * (1.0 - fx) + pixel(img, ix + 1, iy + 1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Offsets of the `2*radius` square sampling grid, on half-pixel centres so
/// the grid maps onto itself under quarter turns.
fn grid(radius: u32) -> impl Iterator<Item = (f32, f32)> {
    let r = radius as i32;
    (-r..r).flat_map(move |v| (-r..r).map(move |u| (u as f32 + 0.5, v as f32 + 0.5)))
}

/// Orientation of the patch from its intensity centroid (ORB style),
/// measured over the disk of the descriptor sampling grid.
pub fn intensity_angle(img: &GrayImage, cx: f32, cy: f32, radius: u32) -> f32 {
    let r_sq = (radius * radius) as f32;
    let mut m10 = 0.0f64;
    let mut m01 = 0.0f64;

    for (u, v) in grid(radius).filter(|(u, v)| u * u + v * v <= r_sq) {
        let value = sample(img, cx + u, cy + v) as f64;
        m10 += u as f64 * value;
        m01 += v as f64 * value;
    }

    (m01 as f32).atan2(m10 as f32)
}

/// Describe the `2*radius` square patch centred on `(cx, cy)`.
///
/// Every sample, and the central differences around it, is taken at its true
/// position in the rotated patch frame. Orientation votes are split linearly
/// between the two nearest bins.
///
/// Returns `None` for a flat patch, which has nothing to match on.
pub fn gradient_histogram(
    img: &GrayImage,
    cx: f32,
    cy: f32,
    angle: f32,
    radius: u32,
) -> Option<Descriptor> {
    let (sin, cos) = angle.sin_cos();
    let half = radius as f32;
    let side = 2.0 * half;
    let two_sigma_sq = 2.0 * half * half;
    // Patch frame -> image frame
    let at = |u: f32, v: f32| sample(img, cx + u * cos - v * sin, cy + u * sin + v * cos);

    let mut desc = [0.0f32; DESCRIPTOR_LEN];

    for (u, v) in grid(radius) {
        let gu = at(u + 1.0, v) - at(u - 1.0, v);
        let gv = at(u, v + 1.0) - at(u, v - 1.0);
        let magnitude = (gu * gu + gv * gv).sqrt();
        if magnitude <= f32::EPSILON {
            continue;
        }

        let weight = (-(u * u + v * v) / two_sigma_sq).exp() * magnitude;
        let cell_x = (((u + half) / side * GRID as f32) as usize).min(GRID - 1);
        let cell_y = (((v + half) / side * GRID as f32) as usize).min(GRID - 1);
        let cell = (cell_y * GRID + cell_x) * BINS;

        let position = gv.atan2(gu).rem_euclid(TAU) / TAU * BINS as f32;
        let lower = position.floor();
        let frac = position - lower;
        let lower = lower as usize % BINS;
        desc[cell + lower] += weight * (1.0 - frac);
        desc[cell + (lower + 1) % BINS] += weight * frac;
    }

    if !normalize(&mut desc) {
        return None;
    }
    for value in desc.iter_mut() {
        *value = value.min(CLIP);
    }
    normalize(&mut desc).then_some(desc)
}

/// Scale to unit length; false when the vector is all zeros.
fn normalize(desc: &mut Descriptor) -> bool {
    let norm = desc.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return false;
    }
    for value in desc.iter_mut() {
        *value /= norm;
    }
    true
}
