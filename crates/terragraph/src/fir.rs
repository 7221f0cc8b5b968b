//! Separable FIR smoothing of a height field.
//!
//! Two causal passes (rows left-to-right, then columns top-to-bottom), each
//! carrying `prev = blend * prev + (1 - blend) * current`. `blend = 0` is the
//! identity; `blend = 1` collapses every row/column to its first value.
use crate::field::HeightField;

/// Smooth `input` with the given blend factor, returning a new field.
pub fn smooth(input: &HeightField, blend: f32) -> HeightField {
    let n = input.resolution();
    let mut out = input.clone();
    let data = out.data_mut();

    for row in 0..n {
        let mut prev = data[row * n];
        for col in 1..n {
            let i = row * n + col;
            prev = blend * prev + (1.0 - blend) * data[i];
            data[i] = prev;
        }
    }

    for col in 0..n {
        let mut prev = data[col];
        for row in 1..n {
            let i = row * n + col;
            prev = blend * prev + (1.0 - blend) * data[i];
            data[i] = prev;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_zero_is_identity() {
        let input = HeightField::from_data(3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(smooth(&input, 0.0), input);
    }

    #[test]
    fn blend_one_collapses_to_first_values() {
        let input = HeightField::from_data(2, vec![1.0, 5.0, 9.0, 13.0]);
        let out = smooth(&input, 1.0);
        // Horizontal pass copies each row's first value, vertical pass then
        // copies the first row down every column.
        assert_eq!(out.data(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn flat_field_is_a_fixed_point() {
        let input = HeightField::from_data(4, vec![0.25; 16]);
        let out = smooth(&input, 0.5);
        for &v in out.data() {
            assert!((v - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn smoothing_reduces_local_contrast() {
        let mut data = vec![0.0; 25];
        data[12] = 1.0;
        let input = HeightField::from_data(5, data);
        let out = smooth(&input, 0.5);
        let peak = out.data()[12];
        assert!(peak < 1.0);
        assert!(peak > 0.0);
    }
}
