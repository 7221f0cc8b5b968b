//! Hydraulic erosion: particle-based droplet simulation.
//!
//! Droplets spawn at random positions, follow the terrain gradient with
//! inertia, pick up sediment on steep descents and deposit it when they slow
//! down or move uphill. Erosion is spread over a precomputed circular brush so
//! channels carve smooth beds instead of single-cell trenches. The inner loop
//! is allocation-free; the brush is built once per execute and reused across
//! all droplets.
use std::collections::HashMap;

use crate::field::HeightField;
use crate::node::ErosionSettings;
use crate::rng::{rand_in, seeded};

/// Precomputed per-cell neighbor/weight lists for one `(resolution, radius)` pair.
///
/// Cells with a fully in-bounds kernel share one normalized offset template;
/// cells within `radius` of a border store their in-bounds subset with weights
/// renormalized to sum 1.
pub struct ErosionBrush {
    resolution: usize,
    radius: usize,
    template: Vec<(i32, i32, f32)>,
    edge: HashMap<usize, Vec<(usize, f32)>>,
}

impl ErosionBrush {
    /// Build the brush for a grid of `resolution` cells per side.
    pub fn new(resolution: usize, radius: usize) -> Self {
        let radius = radius.max(1);
        let r = radius as i32;
        let rf = radius as f32;

        let mut raw = Vec::new();
        let mut sum = 0.0f32;
        for dy in -r..=r {
            for dx in -r..=r {
                let d2 = (dx * dx + dy * dy) as f32;
                if d2 < rf * rf {
                    let w = 1.0 - d2.sqrt() / rf;
                    raw.push((dx, dy, w));
                    sum += w;
                }
            }
        }
        let template: Vec<(i32, i32, f32)> =
            raw.iter().map(|&(dx, dy, w)| (dx, dy, w / sum)).collect();

        let mut edge = HashMap::new();
        let n = resolution as i32;
        for row in 0..resolution {
            for col in 0..resolution {
                if Self::interior(resolution, radius, col, row) {
                    continue;
                }
                let mut subset = Vec::new();
                let mut subset_sum = 0.0f32;
                for &(dx, dy, w) in &raw {
                    let x = col as i32 + dx;
                    let y = row as i32 + dy;
                    if x >= 0 && y >= 0 && x < n && y < n {
                        subset.push((y as usize * resolution + x as usize, w));
                        subset_sum += w;
                    }
                }
                for entry in &mut subset {
                    entry.1 /= subset_sum;
                }
                edge.insert(row * resolution + col, subset);
            }
        }

        Self {
            resolution,
            radius,
            template,
            edge,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    fn interior(resolution: usize, radius: usize, col: usize, row: usize) -> bool {
        col >= radius
            && row >= radius
            && col + radius < resolution
            && row + radius < resolution
    }

    /// Visit the `(neighbor index, weight)` pairs of the given cell.
    #[inline]
    pub fn apply<F: FnMut(usize, f32)>(&self, col: usize, row: usize, mut visit: F) {
        let cell = row * self.resolution + col;
        if let Some(subset) = self.edge.get(&cell) {
            for &(index, weight) in subset {
                visit(index, weight);
            }
        } else {
            for &(dx, dy, weight) in &self.template {
                let x = (col as i32 + dx) as usize;
                let y = (row as i32 + dy) as usize;
                visit(y * self.resolution + x, weight);
            }
        }
    }

    #[cfg(test)]
    fn weights_for(&self, col: usize, row: usize) -> Vec<(usize, f32)> {
        let mut out = Vec::new();
        self.apply(col, row, |i, w| out.push((i, w)));
        out
    }
}

/// Bilinear height and gradient at a continuous position from the 4
/// surrounding grid nodes. `x`/`y` must lie in `[0, resolution - 1)`.
#[inline]
fn sample(data: &[f32], resolution: usize, x: f32, y: f32) -> (f32, f32, f32) {
    let xi = x as usize;
    let yi = y as usize;
    let u = x - xi as f32;
    let v = y - yi as f32;

    let i = yi * resolution + xi;
    let nw = data[i];
    let ne = data[i + 1];
    let sw = data[i + resolution];
    let se = data[i + resolution + 1];

    let grad_x = (ne - nw) * (1.0 - v) + (se - sw) * v;
    let grad_y = (sw - nw) * (1.0 - u) + (se - ne) * u;
    let height =
        nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v;

    (height, grad_x, grad_y)
}

/// Run droplet erosion over a deep copy of `input`.
pub fn erode(input: &HeightField, settings: &ErosionSettings) -> HeightField {
    let mut field = input.clone();
    if settings.iterate_count == 0 {
        return field;
    }

    let n = field.resolution();
    let brush = ErosionBrush::new(n, settings.radius);
    let mut rng = seeded(settings.seed);
    let limit = (n - 1) as f32;

    for _ in 0..settings.iterate_count {
        let mut pos_x = rand_in(&mut rng, limit);
        let mut pos_y = rand_in(&mut rng, limit);
        let mut dir_x = 0.0f32;
        let mut dir_y = 0.0f32;
        let mut speed = settings.initial_speed;
        let mut water = settings.initial_water;
        let mut sediment = 0.0f32;

        for _ in 0..settings.max_droplet_lifetime {
            let cell_x = pos_x as usize;
            let cell_y = pos_y as usize;
            let u = pos_x - cell_x as f32;
            let v = pos_y - cell_y as f32;

            let (height, grad_x, grad_y) = sample(field.data(), n, pos_x, pos_y);

            dir_x = dir_x * settings.inertia - grad_x * (1.0 - settings.inertia);
            dir_y = dir_y * settings.inertia - grad_y * (1.0 - settings.inertia);
            let len = (dir_x * dir_x + dir_y * dir_y).sqrt();
            if len != 0.0 {
                dir_x /= len;
                dir_y /= len;
            }
            pos_x += dir_x;
            pos_y += dir_y;

            // Stop when the droplet is not moving or left the valid interior.
            if (dir_x == 0.0 && dir_y == 0.0)
                || pos_x < 0.0
                || pos_x >= limit
                || pos_y < 0.0
                || pos_y >= limit
            {
                break;
            }

            let (new_height, _, _) = sample(field.data(), n, pos_x, pos_y);
            let delta_height = new_height - height;

            let capacity = (-delta_height * speed * water * settings.sediment_capacity_factor)
                .max(settings.min_sediment_capacity);

            if sediment > capacity || delta_height > 0.0 {
                // Moving uphill fills the pit behind the droplet; otherwise
                // drop the excess over capacity.
                let deposit = if delta_height > 0.0 {
                    delta_height.min(sediment)
                } else {
                    (sediment - capacity) * settings.deposit_speed
                };
                sediment -= deposit;

                let base = cell_y * n + cell_x;
                let data = field.data_mut();
                data[base] += deposit * (1.0 - u) * (1.0 - v);
                data[base + 1] += deposit * u * (1.0 - v);
                data[base + n] += deposit * (1.0 - u) * v;
                data[base + n + 1] += deposit * u * v;
            } else {
                let amount = ((capacity - sediment) * settings.erode_speed).min(-delta_height);
                let data = field.data_mut();
                brush.apply(cell_x, cell_y, |index, weight| {
                    // Never dig a cell below zero; whatever is removed is
                    // carried away as sediment.
                    let removed = data[index].min(weight * amount);
                    data[index] -= removed;
                    sediment += removed;
                });
            }

            speed = (speed * speed + delta_height * settings.gravity).max(0.0).sqrt();
            water *= 1.0 - settings.evaporate_speed;
        }
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope_field(n: usize) -> HeightField {
        let mut data = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                data.push((2 * n - row - col) as f32 / (2 * n) as f32);
            }
        }
        HeightField::from_data(n, data)
    }

    fn settings(iterate_count: u32) -> ErosionSettings {
        ErosionSettings {
            seed: 11,
            iterate_count,
            ..ErosionSettings::default()
        }
    }

    #[test]
    fn brush_weights_sum_to_one_everywhere() {
        let n = 16;
        let brush = ErosionBrush::new(n, 3);
        for (col, row) in [(0, 0), (1, 2), (8, 8), (15, 15), (15, 0), (3, 15)] {
            let sum: f32 = brush.weights_for(col, row).iter().map(|&(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-5, "cell ({col},{row}) sums to {sum}");
        }
    }

    #[test]
    fn brush_stays_in_bounds_at_corners() {
        let n = 8;
        let brush = ErosionBrush::new(n, 4);
        for (col, row) in [(0, 0), (7, 7), (0, 7), (7, 0)] {
            for (index, _) in brush.weights_for(col, row) {
                assert!(index < n * n);
            }
        }
    }

    #[test]
    fn brush_kernel_is_circular() {
        let brush = ErosionBrush::new(32, 3);
        for (index, _) in brush.weights_for(16, 16) {
            let dx = (index % 32) as i32 - 16;
            let dy = (index / 32) as i32 - 16;
            assert!(dx * dx + dy * dy < 9);
        }
    }

    #[test]
    fn zero_iterations_copies_input() {
        let input = slope_field(16);
        let out = erode(&input, &settings(0));
        assert_eq!(out, input);
    }

    #[test]
    fn same_seed_reproduces_output() {
        let input = slope_field(32);
        let a = erode(&input, &settings(500));
        let b = erode(&input, &settings(500));
        assert_eq!(a, b);
    }

    #[test]
    fn erosion_changes_a_sloped_field_but_not_the_input() {
        let input = slope_field(32);
        let before = input.clone();
        let out = erode(&input, &settings(500));
        assert_eq!(input, before);
        assert_ne!(out, input);
    }

    #[test]
    fn bilinear_sample_matches_grid_nodes() {
        let field = HeightField::from_data(2, vec![0.0, 1.0, 2.0, 3.0]);
        let (h, gx, gy) = sample(field.data(), 2, 0.0, 0.0);
        assert_eq!(h, 0.0);
        assert_eq!(gx, 1.0);
        assert_eq!(gy, 2.0);

        let (h, _, _) = sample(field.data(), 2, 0.5, 0.5);
        assert_eq!(h, 1.5);
    }
}
