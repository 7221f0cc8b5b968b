//! Deterministic random helpers for seeded modifier nodes.
//!
//! Each random node reseeds its own generator from its configured seed at the
//! start of one execute call, so the same seed reproduces identical output
//! independent of evaluation history.
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Generator scoped to one execute call of a seeded node.
pub(crate) fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generate a random float in the range [0, 1].
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Uniform draw in `[0, limit)`, `limit > 0`.
#[inline]
pub(crate) fn rand_in(rng: &mut dyn RngCore, limit: f32) -> f32 {
    (rand01(rng) * limit).min(next_down(limit))
}

/// Compute the next smaller representable float value.
///
/// Returns a value that is strictly less than the input, useful for
/// ensuring bounds are strictly inside a domain. Handles edge cases
/// safely including very small positive values and zero.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }

    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }

    if val == f32::INFINITY {
        return f32::MAX;
    }

    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits.saturating_sub(1))
    } else {
        f32::from_bits(bits.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng {
        value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_stays_in_unit_range() {
        for value in [0, 1, 100, u32::MAX / 2, u32::MAX - 1, u32::MAX] {
            let mut rng = FixedRng { value };
            let result = rand01(&mut rng);
            assert!((0.0..=1.0).contains(&result), "rand01 out of range");
        }
    }

    #[test]
    fn rand_in_stays_strictly_below_limit() {
        let mut rng = FixedRng { value: u32::MAX };
        let v = rand_in(&mut rng, 7.0);
        assert!(v < 7.0);
        assert!(v >= 0.0);
    }

    #[test]
    fn next_down_handles_edge_cases() {
        assert!(next_down(1.0) < 1.0);
        assert_eq!(next_down(0.0), -f32::MIN_POSITIVE);
        assert_eq!(next_down(f32::INFINITY), f32::MAX);
        assert_eq!(next_down(f32::NEG_INFINITY), f32::NEG_INFINITY);
        assert!(next_down(f32::NAN).is_nan());
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
