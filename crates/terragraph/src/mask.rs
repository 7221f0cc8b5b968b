//! Mask derivation: height/slope selection, channel remixing, and
//! stored-map resampling onto the evaluation grid.
use crate::field::{HeightField, MaskField, Rgba};
use crate::grid::GridDescriptor;
use crate::node::{HeightMaskSettings, HeightMode, SlopeSettings, SlopeStyle};

/// Grayscale mask selecting a height band of the input field.
///
/// The selection window derives from the field's global min/max and the
/// configured ratios; inside the window the mask ramps linearly from 0 to 1.
pub fn height_select(input: &HeightField, settings: &HeightMaskSettings) -> MaskField {
    let (min, max) = input.min_max();
    let span = max - min;
    let min_select = min + settings.min_height_ratio * span;
    let max_select = min + settings.max_height_ratio * span;
    let window = max_select - min_select;

    let data = input
        .data()
        .iter()
        .map(|&h| {
            let t = if window.abs() <= f32::EPSILON {
                if h >= min_select {
                    1.0
                } else {
                    0.0
                }
            } else {
                ((h - min_select) / window).clamp(0.0, 1.0)
            };
            Rgba::gray(t)
        })
        .collect();

    MaskField::from_data(input.resolution(), data)
}

/// Grayscale mask selecting cells whose slope angle lies in the configured
/// band. Border cells have no full neighbor ring and always stay black.
pub fn slope_select(
    input: &HeightField,
    grid: &GridDescriptor,
    settings: &SlopeSettings,
) -> MaskField {
    let n = input.resolution();
    let mut mask = MaskField::new(n);
    if n < 3 {
        return mask;
    }

    let scale_x = grid.max_height / grid.cell_width();
    let scale_y = grid.max_height / grid.cell_height();

    for row in 1..n - 1 {
        for col in 1..n - 1 {
            let (c, r) = (col as isize, row as isize);
            let (gx, gy) = match settings.style {
                SlopeStyle::Center => (
                    (input.get(c + 1, r) - input.get(c - 1, r)) * scale_x / 2.0,
                    (input.get(c, r + 1) - input.get(c, r - 1)) * scale_y / 2.0,
                ),
                SlopeStyle::Average => {
                    let tl = input.get(c - 1, r - 1);
                    let t = input.get(c, r - 1);
                    let tr = input.get(c + 1, r - 1);
                    let l = input.get(c - 1, r);
                    let right = input.get(c + 1, r);
                    let bl = input.get(c - 1, r + 1);
                    let b = input.get(c, r + 1);
                    let br = input.get(c + 1, r + 1);
                    (
                        ((tr + 2.0 * right + br) - (tl + 2.0 * l + bl)) * scale_x / 8.0,
                        ((bl + 2.0 * b + br) - (tl + 2.0 * t + tr)) * scale_y / 8.0,
                    )
                }
            };

            let angle = (gx * gx + gy * gy).sqrt().atan().to_degrees();
            if angle >= settings.min_angle && angle <= settings.max_angle {
                let index = mask.index(col, row);
                mask.data_mut()[index] = Rgba::WHITE;
            }
        }
    }

    mask
}

/// Per-cell proportional remix of up to four grayscale channel inputs.
///
/// Slot k feeds channel k with its mask's red value. Each present channel is
/// divided by the per-cell channel sum; unbound channels contribute 0 and
/// emit 0. Returns `None` when no input is bound.
pub fn rgba_mix(channels: [Option<&MaskField>; 4]) -> Option<MaskField> {
    let resolution = channels.iter().flatten().next()?.resolution();
    for mask in channels.iter().flatten() {
        assert_eq!(
            mask.resolution(),
            resolution,
            "rgba inputs must share one mask resolution"
        );
    }

    let mut out = MaskField::new(resolution);
    for i in 0..resolution * resolution {
        let channel = |slot: usize| channels[slot].map_or(0.0, |m| m.data()[i].r);
        let (r, g, b, a) = (channel(0), channel(1), channel(2), channel(3));
        let total = r + g + b + a;
        out.data_mut()[i] = if total > 0.0 {
            Rgba::new(r / total, g / total, b / total, a / total)
        } else {
            Rgba::new(0.0, 0.0, 0.0, 0.0)
        };
    }

    Some(out)
}

/// Combine a stored weight map into the upstream height field. The map's red
/// channel is resampled onto the grid in normalized `[0,1]²` space.
pub fn weight_map_apply(height: &HeightField, map: &MaskField, mode: HeightMode) -> HeightField {
    let n = height.resolution();
    let mut out = height.clone();
    let step = 1.0 / (n - 1) as f32;

    for row in 0..n {
        for col in 0..n {
            let w = map.sample_normalized(col as f32 * step, row as f32 * step).r;
            let index = out.index(col, row);
            let existing = out.data()[index];
            out.data_mut()[index] = mode.apply(existing, w);
        }
    }

    out
}

/// Combine a stored height map into the upstream height field, resampled the
/// same way as [`weight_map_apply`].
pub fn height_map_apply(height: &HeightField, map: &HeightField, mode: HeightMode) -> HeightField {
    let n = height.resolution();
    let mut out = height.clone();
    let step = 1.0 / (n - 1) as f32;

    for row in 0..n {
        for col in 0..n {
            let v = map.sample_normalized(col as f32 * step, row as f32 * step);
            let index = out.index(col, row);
            let existing = out.data()[index];
            out.data_mut()[index] = mode.apply(existing, v);
        }
    }

    out
}
