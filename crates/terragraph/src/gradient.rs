//! Keyed 1D color gradient used by the ColorGradient node.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::{MaskField, Rgba};

/// One gradient key at a position in [0, 1].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientKey {
    pub position: f32,
    pub color: Rgba,
}

/// A 1D color gradient with keys sorted by position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    keys: Vec<GradientKey>,
}

impl Gradient {
    /// Build a gradient from keys; keys are sorted by position. At least one
    /// key is required, otherwise the default black-to-white ramp is used.
    pub fn new(mut keys: Vec<GradientKey>) -> Self {
        if keys.is_empty() {
            return Self::default();
        }
        keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { keys }
    }

    pub fn keys(&self) -> &[GradientKey] {
        &self.keys
    }

    /// Evaluate the gradient at `t`, clamping beyond the first and last key.
    pub fn evaluate(&self, t: f32) -> Rgba {
        let first = self.keys[0];
        if t <= first.position {
            return first.color;
        }
        let last = self.keys[self.keys.len() - 1];
        if t >= last.position {
            return last.color;
        }

        for pair in self.keys.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.position {
                let span = hi.position - lo.position;
                if span <= f32::EPSILON {
                    return hi.color;
                }
                return lo.color.lerp(hi.color, (t - lo.position) / span);
            }
        }
        last.color
    }

    /// Evaluate the gradient at each cell of `mask`, keyed by the red channel.
    pub fn map(&self, mask: &MaskField) -> MaskField {
        let data = mask.data().iter().map(|c| self.evaluate(c.r)).collect();
        MaskField::from_data(mask.resolution(), data)
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            keys: vec![
                GradientKey {
                    position: 0.0,
                    color: Rgba::BLACK,
                },
                GradientKey {
                    position: 1.0,
                    color: Rgba::WHITE,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ramp_interpolates_linearly() {
        let g = Gradient::default();
        assert_eq!(g.evaluate(0.0), Rgba::BLACK);
        assert_eq!(g.evaluate(1.0), Rgba::WHITE);
        let mid = g.evaluate(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }

    #[test]
    fn evaluate_clamps_outside_key_range() {
        let g = Gradient::new(vec![
            GradientKey {
                position: 0.25,
                color: Rgba::gray(0.2),
            },
            GradientKey {
                position: 0.75,
                color: Rgba::gray(0.8),
            },
        ]);
        assert_eq!(g.evaluate(0.0), Rgba::gray(0.2));
        assert_eq!(g.evaluate(1.0), Rgba::gray(0.8));
    }

    #[test]
    fn keys_are_sorted_on_construction() {
        let g = Gradient::new(vec![
            GradientKey {
                position: 0.9,
                color: Rgba::WHITE,
            },
            GradientKey {
                position: 0.1,
                color: Rgba::BLACK,
            },
        ]);
        assert!(g.keys()[0].position < g.keys()[1].position);
    }

    #[test]
    fn map_reads_red_channel() {
        let mask = MaskField::from_data(2, vec![Rgba::gray(0.0); 4]);
        let g = Gradient::default();
        let out = g.map(&mask);
        assert!(out.data().iter().all(|c| *c == Rgba::BLACK));
    }
}
