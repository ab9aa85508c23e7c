use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform source of `f64` samples in `[0, 1)`.
///
/// Everything synthetic in the dashboard draws from one of these, so a
/// scripted implementation makes generator output reproducible.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Pick an index in `0..len` the way `floor(u * len)` does
    fn next_index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// ChaCha-backed source, seeded explicitly or from OS entropy
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end
#[cfg(test)]
pub struct ScriptedRandom {
    samples: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(samples: Vec<f64>) -> Self {
        assert!(!samples.is_empty(), "scripted source needs samples");
        Self { samples, pos: 0 }
    }

    /// Same value forever
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    pub fn draws(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self.samples[self.pos % self.samples.len()];
        self.pos += 1;
        value
    }
}
