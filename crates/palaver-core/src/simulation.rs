//! Stand-ins for the other user: presence flicker and canned replies.
//!
//! All randomness goes through `SimulationSource` so sessions can be driven
//! deterministically. `RandomSource` is the real, non-deterministic one.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const REPLY_POOL: [&str; 4] = [
    "That's interesting!",
    "I see what you mean.",
    "Could you tell me more?",
    "Thanks for sharing!",
];

pub trait SimulationSource: Send {
    /// Roll the correspondent's presence; true means online.
    fn roll_online(&mut self, probability: f64) -> bool;

    /// Decide whether a sent message gets a reply.
    fn roll_reply(&mut self, probability: f64) -> bool;

    /// Delay before a reply arrives, in `[min, max)`.
    fn reply_delay(&mut self, min: Duration, max: Duration) -> Duration;

    /// Index into a reply pool of `len` entries.
    fn pick_reply(&mut self, len: usize) -> usize;
}

pub struct RandomSource<R: Rng = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> SimulationSource for RandomSource<R> {
    fn roll_online(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn roll_reply(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn reply_delay(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let ms = self
            .rng
            .gen_range(min.as_millis() as u64..max.as_millis() as u64);
        Duration::from_millis(ms)
    }

    fn pick_reply(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Always returns the same outcome. Useful for demos and tests that need
/// "always reply" or "never reply" behaviour.
#[derive(Debug, Clone)]
pub struct FixedSource {
    pub online: bool,
    pub reply: bool,
    pub delay: Duration,
    pub pick: usize,
}

impl Default for FixedSource {
    fn default() -> Self {
        Self {
            online: true,
            reply: false,
            delay: Duration::from_millis(1000),
            pick: 0,
        }
    }
}

impl SimulationSource for FixedSource {
    fn roll_online(&mut self, _probability: f64) -> bool {
        self.online
    }

    fn roll_reply(&mut self, _probability: f64) -> bool {
        self.reply
    }

    fn reply_delay(&mut self, _min: Duration, _max: Duration) -> Duration {
        self.delay
    }

    fn pick_reply(&mut self, len: usize) -> usize {
        self.pick.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_delay_within_bounds() {
        let mut source = RandomSource::seeded(7);
        let min = Duration::from_millis(1000);
        let max = Duration::from_millis(3000);
        for _ in 0..200 {
            let d = source.reply_delay(min, max);
            assert!(d >= min && d < max, "delay {d:?} out of range");
        }
    }

    #[test]
    fn test_degenerate_delay_range() {
        let mut source = RandomSource::seeded(7);
        let d = Duration::from_millis(500);
        assert_eq!(source.reply_delay(d, d), d);
    }

    #[test]
    fn test_pick_reply_in_pool() {
        let mut source = RandomSource::seeded(11);
        for _ in 0..200 {
            assert!(source.pick_reply(REPLY_POOL.len()) < REPLY_POOL.len());
        }
    }

    #[test]
    fn test_probability_extremes() {
        let mut source = RandomSource::seeded(3);
        for _ in 0..50 {
            assert!(source.roll_online(1.0));
            assert!(!source.roll_reply(0.0));
        }
    }

    #[test]
    fn test_fixed_source_clamps_pick() {
        let mut source = FixedSource {
            pick: 10,
            ..FixedSource::default()
        };
        assert_eq!(source.pick_reply(4), 3);
    }
}
