use crate::error::{MisraError, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Struct that decides, one independent trial at a time, whether a transmission is lost.
pub struct Loss<R: Rng + ?Sized> {
    pub rng: Box<R>,
    pub probability: f64,
}

impl Loss<SmallRng> {
    pub fn new(probability: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(MisraError::InvalidProbability(probability));
        }

        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            rng: Box::new(rng),
            probability,
        })
    }

    /// Function that never drops anything.
    pub fn none() -> Self {
        Self {
            rng: Box::new(SmallRng::seed_from_u64(0)),
            probability: 0.,
        }
    }
}

impl<R: Rng + ?Sized> Loss<R> {
    pub fn is_lost(&mut self) -> bool {
        self.rng.random_bool(self.probability)
    }
}
