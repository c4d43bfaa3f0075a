//! Swappable uniform random sources.
//!
//! Spawning draws from a [`RandomSource`] so tests can replace randomness with
//! a seeded generator or an exact scripted sequence.

/// Uniform `[0, 1)` generator.
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// Uniform value in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Deterministic linear congruential generator.
#[derive(Debug, Clone)]
pub struct SpawnRng {
    state: u64,
}

impl SpawnRng {
    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Derives a generator for one run of a session.
    #[must_use]
    pub fn for_run(session_seed: u64, run_index: u32) -> Self {
        let state = session_seed
            .wrapping_mul(31)
            .wrapping_add(u64::from(run_index));
        Self::new(state)
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }
}

impl RandomSource for SpawnRng {
    fn next_f32(&mut self) -> f32 {
        // Top 24 bits fit an f32 mantissa exactly, keeping the result below 1.0.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// `fastrand`-backed source for live sessions.
#[derive(Debug, Clone)]
pub struct FastRandSource {
    rng: fastrand::Rng,
}

impl FastRandSource {
    /// Seeded source.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Source seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }
}

impl RandomSource for FastRandSource {
    fn next_f32(&mut self) -> f32 {
        self.rng.f32()
    }
}

/// Replays a fixed sequence, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Creates a source replaying `values`. Values are clamped into `[0, 1)`.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 0.999_999))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Source that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v
    }
}
