//! Fault formation: superimposed step/sinusoidal offsets across random lines.
//!
//! Each iteration draws two distinct random points in the physical rectangle,
//! adds a decaying height contribution split by the line through them, and the
//! final field is linearly rescaled so its minimum maps to 0 and maximum to 1.
use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::RngCore;

use crate::field::HeightField;
use crate::grid::GridDescriptor;
use crate::node::{FaultMode, FaultSettings};
use crate::rng::{rand_in, seeded};

/// Generate a fault-formation height field sized to `grid`.
pub fn generate(grid: &GridDescriptor, settings: &FaultSettings) -> HeightField {
    let n = grid.resolution;
    let mut field = HeightField::new(n);
    if settings.iterations == 0 {
        return field;
    }

    let mut rng = seeded(settings.seed);

    for i in 0..settings.iterations {
        let delta_height = 1.0 - i as f32 / settings.iterations as f32;
        let (p1, dir) = random_line(&mut rng, grid);

        for row in 0..n {
            for col in 0..n {
                let ps = grid.index_to_physical(col, row) - offset(grid) - p1;
                let signed = ps.x * dir.y - ps.y * dir.x;

                let contribution = match settings.mode {
                    FaultMode::Step => {
                        if signed > 0.0 {
                            delta_height
                        } else {
                            0.0
                        }
                    }
                    FaultMode::Sin => {
                        if signed > 0.0 {
                            ((signed / settings.falloff).clamp(0.0, 1.0) * FRAC_PI_2).sin()
                                * delta_height
                        } else {
                            0.0
                        }
                    }
                    FaultMode::Cos => {
                        // Smooth variant of Step: full contribution on the
                        // positive side, cosine falloff band on the other.
                        ((-signed / settings.falloff).clamp(0.0, 1.0) * FRAC_PI_2).cos()
                            * delta_height
                    }
                };

                let idx = field.index(col, row);
                field.data_mut()[idx] += contribution;
            }
        }
    }

    normalize(&mut field);
    field
}

/// Grid origin as an XZ offset; fault lines are drawn in local grid space.
fn offset(grid: &GridDescriptor) -> Vec2 {
    Vec2::new(grid.origin.x, grid.origin.z)
}

/// Two distinct random points in the physical rectangle, returned as the
/// first point and the normalized direction towards the second.
fn random_line(rng: &mut dyn RngCore, grid: &GridDescriptor) -> (Vec2, Vec2) {
    let p1 = Vec2::new(rand_in(rng, grid.width), rand_in(rng, grid.height));
    loop {
        let p2 = Vec2::new(rand_in(rng, grid.width), rand_in(rng, grid.height));
        if p2 != p1 {
            return (p1, (p2 - p1).normalize());
        }
    }
}

/// Linear rescale so min maps to 0 and max to 1. A flat field is left as-is.
fn normalize(field: &mut HeightField) {
    let (min, max) = field.min_max();
    let span = max - min;
    if span <= f32::EPSILON {
        return;
    }
    for v in field.data_mut() {
        *v = (*v - min) / span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridDescriptor {
        GridDescriptor::new(16, 50.0, 50.0, 10.0, glam::Vec3::ZERO).unwrap()
    }

    fn settings(mode: FaultMode, iterations: u32) -> FaultSettings {
        FaultSettings {
            seed: 7,
            iterations,
            falloff: 10.0,
            mode,
        }
    }

    #[test]
    fn output_is_normalized_to_unit_range() {
        for mode in [FaultMode::Step, FaultMode::Sin, FaultMode::Cos] {
            for iterations in [1, 8, 32] {
                let field = generate(&grid(), &settings(mode, iterations));
                let (min, max) = field.min_max();
                assert_eq!(min, 0.0, "{mode:?} x{iterations}");
                assert_eq!(max, 1.0, "{mode:?} x{iterations}");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_output() {
        let a = generate(&grid(), &settings(FaultMode::Cos, 16));
        let b = generate(&grid(), &settings(FaultMode::Cos, 16));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = generate(&grid(), &settings(FaultMode::Step, 16));
        let mut other = settings(FaultMode::Step, 16);
        other.seed = 8;
        let b = generate(&grid(), &other);
        assert_ne!(a, b);
    }

    #[test]
    fn zero_iterations_stays_flat() {
        let field = generate(&grid(), &settings(FaultMode::Step, 0));
        assert!(field.data().iter().all(|v| *v == 0.0));
    }
}
