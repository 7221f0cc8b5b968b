//! Elementwise combination of two height fields.
use crate::field::HeightField;
use crate::node::{CombineMode, CombineSettings};

/// Combine `a` and `b` elementwise. Inputs are swapped first when
/// `settings.swap_inputs` is set. A resolution mismatch between the two
/// inputs is a programming-invariant violation.
pub fn combine(a: &HeightField, b: &HeightField, settings: &CombineSettings) -> HeightField {
    let (a, b) = if settings.swap_inputs { (b, a) } else { (a, b) };
    assert_eq!(
        a.resolution(),
        b.resolution(),
        "combine inputs must share one grid resolution"
    );

    let ratio = settings.ratio;
    let data = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| match settings.mode {
            CombineMode::Blend => x + (y - x) * ratio,
            CombineMode::Max => x.max(y),
            CombineMode::Min => x.min(y),
            CombineMode::Add => x + y,
            CombineMode::Subtract => x - y,
        })
        .collect();

    HeightField::from_data(a.resolution(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> (HeightField, HeightField) {
        (
            HeightField::from_data(2, vec![0.0, 1.0, 2.0, 3.0]),
            HeightField::from_data(2, vec![4.0, 3.0, 2.0, 1.0]),
        )
    }

    fn settings(mode: CombineMode, ratio: f32) -> CombineSettings {
        CombineSettings {
            mode,
            ratio,
            swap_inputs: false,
        }
    }

    #[test]
    fn blend_ratio_zero_returns_first_input() {
        let (a, b) = fields();
        let out = combine(&a, &b, &settings(CombineMode::Blend, 0.0));
        assert_eq!(out, a);
    }

    #[test]
    fn blend_ratio_one_returns_second_input() {
        let (a, b) = fields();
        let out = combine(&a, &b, &settings(CombineMode::Blend, 1.0));
        assert_eq!(out, b);
    }

    #[test]
    fn swap_inputs_flips_blend_endpoints() {
        let (a, b) = fields();
        let mut s = settings(CombineMode::Blend, 0.0);
        s.swap_inputs = true;
        let out = combine(&a, &b, &s);
        assert_eq!(out, b);
    }

    #[test]
    fn arithmetic_modes() {
        let (a, b) = fields();
        assert_eq!(
            combine(&a, &b, &settings(CombineMode::Add, 0.0)).data(),
            &[4.0, 4.0, 4.0, 4.0]
        );
        assert_eq!(
            combine(&a, &b, &settings(CombineMode::Subtract, 0.0)).data(),
            &[-4.0, -2.0, 0.0, 2.0]
        );
        assert_eq!(
            combine(&a, &b, &settings(CombineMode::Max, 0.0)).data(),
            &[4.0, 3.0, 2.0, 3.0]
        );
        assert_eq!(
            combine(&a, &b, &settings(CombineMode::Min, 0.0)).data(),
            &[0.0, 1.0, 2.0, 1.0]
        );
    }

    #[test]
    #[should_panic(expected = "resolution")]
    fn mismatched_resolutions_panic() {
        let a = HeightField::new(2);
        let b = HeightField::new(3);
        combine(&a, &b, &settings(CombineMode::Add, 0.0));
    }
}
