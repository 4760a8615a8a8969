//! Track selection
//!
//! The orchestrator picks one track per cycle through a [`TrackSelector`] so tests
//! can swap the random source for a seeded or scripted one.

use crate::types::Track;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Mutex;

/// Picks one track out of a playlist
pub trait TrackSelector: Send + Sync {
    /// Select a track; `None` only for an empty slice
    fn select<'a>(&self, tracks: &'a [Track]) -> Option<&'a Track>;
}

/// Uniform random selection, with replacement across cycles
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Selector seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic selector for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl TrackSelector for RandomSelector {
    fn select<'a>(&self, tracks: &'a [Track]) -> Option<&'a Track> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracks.choose(&mut *rng)
    }
}
