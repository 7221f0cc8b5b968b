//! Field storage for per-cell height and mask values.
//!
//! A [`HeightField`] is a dense row-major grid of height ratios; a [`MaskField`]
//! is a dense grid of [`Rgba`] blend weights. Both are exclusively owned by the
//! node that produced them: downstream nodes borrow them read-only and deep-copy
//! before mutating.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGBA color with f32 channels, used as a blend/selection weight.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque grayscale color with all color channels set to `v`.
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Componentwise linear interpolation between `self` and `other`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// Dense row-major grid of per-cell height values (`index = row * resolution + col`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    resolution: usize,
    data: Vec<f32>,
}

impl HeightField {
    /// Create a zero-initialized field with the given resolution.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            data: vec![0.0; resolution * resolution],
        }
    }

    /// Wrap existing row-major data. `data.len()` must equal `resolution²`.
    pub fn from_data(resolution: usize, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            resolution * resolution,
            "height data length must equal resolution squared"
        );
        Self { resolution, data }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.resolution + col
    }

    /// Value at the given cell, returning `0.0` if out of bounds.
    pub fn get(&self, col: isize, row: isize) -> f32 {
        let n = self.resolution as isize;
        if col < 0 || row < 0 || col >= n || row >= n {
            return 0.0;
        }
        self.data[row as usize * self.resolution + col as usize]
    }

    /// Bilinear sample in normalized `[0,1]²` space. Samples at exact cell
    /// coordinates reproduce the stored value.
    pub fn sample_normalized(&self, u: f32, v: f32) -> f32 {
        let n = self.resolution;
        let fx = (u.clamp(0.0, 1.0) * (n - 1) as f32).min((n - 1) as f32);
        let fy = (v.clamp(0.0, 1.0) * (n - 1) as f32).min((n - 1) as f32);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(n - 1);
        let y1 = (y0 + 1).min(n - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.data[y0 * n + x0] * (1.0 - tx) + self.data[y0 * n + x1] * tx;
        let bottom = self.data[y1 * n + x0] * (1.0 - tx) + self.data[y1 * n + x1] * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Global minimum and maximum over all cells.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

/// Dense row-major grid of [`Rgba`] values. Its resolution may differ from the
/// height resolution (WeightMap stores a map of its own size).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MaskField {
    resolution: usize,
    data: Vec<Rgba>,
}

impl MaskField {
    /// Create a field of black cells with the given resolution.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            data: vec![Rgba::BLACK; resolution * resolution],
        }
    }

    /// Wrap existing row-major data. `data.len()` must equal `resolution²`.
    pub fn from_data(resolution: usize, data: Vec<Rgba>) -> Self {
        assert_eq!(
            data.len(),
            resolution * resolution,
            "mask data length must equal resolution squared"
        );
        Self { resolution, data }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn data(&self) -> &[Rgba] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Rgba] {
        &mut self.data
    }

    #[inline]
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.resolution + col
    }

    /// Bilinear sample in normalized `[0,1]²` space. Samples at exact cell
    /// coordinates reproduce the stored value.
    pub fn sample_normalized(&self, u: f32, v: f32) -> Rgba {
        let n = self.resolution;
        let fx = (u.clamp(0.0, 1.0) * (n - 1) as f32).min((n - 1) as f32);
        let fy = (v.clamp(0.0, 1.0) * (n - 1) as f32).min((n - 1) as f32);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(n - 1);
        let y1 = (y0 + 1).min(n - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.data[y0 * n + x0].lerp(self.data[y0 * n + x1], tx);
        let bottom = self.data[y1 * n + x0].lerp(self.data[y1 * n + x1], tx);
        top.lerp(bottom, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_height_field_is_zeroed() {
        let field = HeightField::new(4);
        assert_eq!(field.data().len(), 16);
        assert!(field.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn height_get_returns_zero_outside_bounds() {
        let field = HeightField::from_data(2, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(field.get(-1, 0), 0.0);
        assert_eq!(field.get(0, 2), 0.0);
        assert_eq!(field.get(1, 1), 4.0);
    }

    #[test]
    fn min_max_scans_all_cells() {
        let field = HeightField::from_data(2, vec![0.5, -1.0, 3.0, 0.0]);
        assert_eq!(field.min_max(), (-1.0, 3.0));
    }

    #[test]
    fn mask_sample_is_exact_at_corners() {
        let mut mask = MaskField::new(3);
        let last = mask.index(2, 2);
        mask.data_mut()[0] = Rgba::gray(0.25);
        mask.data_mut()[last] = Rgba::gray(0.75);

        assert_eq!(mask.sample_normalized(0.0, 0.0), Rgba::gray(0.25));
        assert_eq!(mask.sample_normalized(1.0, 1.0), Rgba::gray(0.75));
    }

    #[test]
    fn mask_sample_interpolates_between_cells() {
        let mask = MaskField::from_data(
            2,
            vec![
                Rgba::gray(0.0),
                Rgba::gray(1.0),
                Rgba::gray(0.0),
                Rgba::gray(1.0),
            ],
        );
        let mid = mask.sample_normalized(0.5, 0.0);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }
}
