use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded source for tie-breaking in layouts; same seed, same layout.
#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Angle in radians, uniform over the full circle.
    pub fn angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..std::f32::consts::TAU)
    }
}
