//! Random sources for grid shuffling and evasive placement.
//!
//! Everything random goes through [`RandomSource`] so tests can replay fixed sequences.

/// Uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len` (`0` when `len == 0`).
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

/// xorshift64* seeded once from the platform entropy source (`crypto.getRandomValues` in the
/// browser). Not crypto secure; only used for gameplay randomness.
pub struct EntropyRandom {
    state: u64,
}

impl EntropyRandom {
    pub fn new() -> Self {
        let mut seed = [0u8; 8];
        let state = match getrandom::getrandom(&mut seed) {
            Ok(()) => u64::from_le_bytes(seed),
            Err(err) => {
                tracing::warn!(%err, "entropy unavailable, using fixed seed");
                0x9E37_79B9_7F4A_7C15
            }
        };
        Self::from_seed(state)
    }

    pub fn from_seed(seed: u64) -> Self {
        // xorshift gets stuck on zero
        Self { state: if seed == 0 { 0x2545_F491_4F6C_DD1D } else { seed } }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_f64(&mut self) -> f64 {
        // top 53 bits -> [0, 1)
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed list of values, cycling when exhausted. Values are clamped into `[0, 1)`.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    pos: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self { values: values.into(), pos: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Fisher–Yates, walking from the back: swap `i` with a uniform `j` in `0..=i`.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_zero_rotates_left_by_one() {
        // j == 0 at every step moves the former head to the back progressively
        let mut v = vec![1, 2, 3, 4];
        shuffle(&mut v, &mut ScriptedRandom::new([0.0]));
        assert_eq!(v, vec![2, 3, 4, 1]);
    }

    #[test]
    fn scripted_near_one_is_identity() {
        let mut v = vec!['a', 'b', 'c', 'd', 'e'];
        shuffle(&mut v, &mut ScriptedRandom::new([0.999_999]));
        assert_eq!(v, vec!['a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn entropy_values_stay_in_unit_interval() {
        let mut rng = EntropyRandom::from_seed(42);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn index_handles_empty_and_bounds() {
        let mut rng = ScriptedRandom::new([0.999_999_999]);
        assert_eq!(rng.index(0), 0);
        assert_eq!(rng.index(3), 2);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = EntropyRandom::from_seed(7);
        let mut v: Vec<u32> = (0..9).collect();
        shuffle(&mut v, &mut rng);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..9).collect::<Vec<_>>());
    }
}
