//! Thermal erosion: conservative talus transfer to the steepest neighbor.
//!
//! Each pass scans every interior cell (one-cell margin from the border),
//! finds the 8-neighbor with the greatest height drop, and when the drop
//! exceeds the talus threshold moves `drop * erosion_rate` from the cell to
//! that neighbor. Total height over the grid is invariant per transfer.
use crate::field::HeightField;
use crate::node::ThermalSettings;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Run `settings.iterate_count` full-grid passes over a copy of `input`.
pub fn erode(input: &HeightField, settings: &ThermalSettings) -> HeightField {
    let n = input.resolution();
    let mut out = input.clone();
    if n < 3 {
        return out;
    }

    for _ in 0..settings.iterate_count {
        for row in 1..n - 1 {
            for col in 1..n - 1 {
                let i = row * n + col;
                let here = out.data()[i];

                let mut best_drop = 0.0f32;
                let mut best_index = i;
                for (dx, dy) in NEIGHBORS {
                    let j = (row as isize + dy) as usize * n + (col as isize + dx) as usize;
                    let drop = here - out.data()[j];
                    if drop > best_drop {
                        best_drop = drop;
                        best_index = j;
                    }
                }

                if best_drop > settings.slope_threshold {
                    let moved = best_drop * settings.erosion_rate;
                    let data = out.data_mut();
                    data[i] -= moved;
                    data[best_index] += moved;
                }
            }
        }
    }

    out
}
