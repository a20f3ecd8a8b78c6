//! Guest spawner - periodic arrivals with randomized stats.
//!
//! Arrival rate and stat ranges are external configuration; the spawner only
//! decides *when* a guest appears and with what patience, speed and wallet.
//! All randomness flows through the engine's seeded RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// External configuration for guest arrivals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Base seconds between arrivals
    pub interval: f32,
    /// Extra random delay added to each interval, in seconds
    pub jitter: f32,
    /// Base patience budget; randomized per guest
    pub base_patience: f32,
    /// Base walking speed; randomized per guest
    pub base_speed: f32,
    /// Base meal budget; randomized per guest
    pub base_wallet: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval: 8.0,
            jitter: 4.0,
            base_patience: 30.0,
            base_speed: 3.0,
            base_wallet: 12.0,
        }
    }
}

/// Stats rolled for one arriving guest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuestStats {
    pub patience: f32,
    pub speed: f32,
    pub wallet: f32,
}

/// Countdown-driven spawner; one guest at most per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSpawner {
    config: SpawnConfig,
    countdown: f32,
}

impl GuestSpawner {
    pub fn new(config: SpawnConfig) -> Self {
        // First guest arrives after one base interval
        let countdown = config.interval;
        Self { config, countdown }
    }

    /// Advance the countdown; returns stats for a new guest when it fires.
    pub fn tick<R: Rng>(&mut self, delta_seconds: f32, rng: &mut R) -> Option<GuestStats> {
        self.countdown -= delta_seconds;
        if self.countdown > 0.0 {
            return None;
        }

        self.countdown = self.config.interval + rng.gen_range(0.0..=self.config.jitter.max(0.001));

        Some(GuestStats {
            patience: self.config.base_patience * rng.gen_range(0.4..3.2),
            speed: self.config.base_speed * rng.gen_range(0.8..1.2),
            wallet: self.config.base_wallet * rng.gen_range(0.5..2.0),
        })
    }
}
