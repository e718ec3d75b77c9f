//! Synthetic sensor readings for degraded operation.
//!
//! When the device is unreachable the link keeps serving plausible data so
//! training pages never stall. The waveforms follow the patterns observed in
//! real rehabilitation sessions: a periodic muscle-contraction component
//! with fatigue decay on the force channel, and a range-of-motion sweep with
//! tremor on the angle channel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::types::SensorReading;

/// Force floor/ceiling for synthetic samples (Newtons).
const FORCE_RANGE: (f64, f64) = (10.0, 100.0);
/// Angle articulation range (degrees).
const ANGLE_RANGE: (f64, f64) = (0.0, 180.0);
/// Synthetic data never claims perfect quality, never drops below 0.85.
const QUALITY_RANGE: (f64, f64) = (0.85, 1.0);

/// Resting force around which contraction oscillates (Newtons).
const BASE_FORCE: f64 = 50.0;
/// Neutral joint angle (degrees).
const BASE_ANGLE: f64 = 90.0;

/// Generator for synthetic force/angle readings.
///
/// Stateless across calls apart from the random source and the session
/// clock that phases the waveforms.
pub struct SimulatedSensor {
    rng: StdRng,
    started: Instant,
}

impl SimulatedSensor {
    /// Generator seeded from system entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible test streams.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            started: Instant::now(),
        }
    }

    /// Produce the next synthetic reading, stamped with the current time.
    pub fn next_reading(&mut self) -> SensorReading {
        let t = self.started.elapsed().as_secs_f64();

        // Fatigue decays effort over each minute of continuous exercise.
        let fatigue = (1.0 - (t % 60.0) / 300.0).max(0.7);
        let contraction = 20.0 * (t * 0.8).sin() * fatigue;
        let force_noise = sample_normal(&mut self.rng, 5.0);
        let force = (BASE_FORCE + contraction + force_noise).clamp(FORCE_RANGE.0, FORCE_RANGE.1);

        let sweep = 30.0 * (t * 0.4).sin();
        let tremor = 2.0 * (t * 3.0).sin() * self.rng.gen_range(0.5..=1.0);
        let angle_noise = sample_normal(&mut self.rng, 1.0);
        let angle = (BASE_ANGLE + sweep + tremor + angle_noise).clamp(ANGLE_RANGE.0, ANGLE_RANGE.1);

        SensorReading {
            force,
            angle,
            timestamp: unix_now_secs(),
            quality: self.rng.gen_range(QUALITY_RANGE.0..=QUALITY_RANGE.1),
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_normal(rng: &mut StdRng, std_dev: f64) -> f64 {
    // Normal::new only fails on a non-finite std_dev.
    Normal::new(0.0, std_dev).map_or(0.0, |dist| dist.sample(rng))
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
