use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Rolls above this threshold drown the participant.
const HAZARD_SURVIVAL_THRESHOLD: f64 = 0.507;

/// Rolls below this threshold make a container reward malfunction.
const MALFUNCTION_THRESHOLD: f64 = 0.10;

/// Source of every chance outcome the world resolves.
pub trait Dice {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform index in `0..upper`; `upper` is never zero.
    fn below(&mut self, upper: usize) -> usize;
}

/// Deterministic dice backed by a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Creates dice seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn below(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper.max(1))
    }
}

/// Reports whether a hazard-liquid roll drowns the participant.
#[must_use]
pub fn hazard_is_lethal(roll: f64) -> bool {
    roll > HAZARD_SURVIVAL_THRESHOLD
}

/// Reports whether a container roll takes the malfunction branch.
#[must_use]
pub fn container_malfunctions(roll: f64) -> bool {
    roll < MALFUNCTION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hazard_lethality_matches_documented_rate() {
        let mut dice = SeededDice::new(0x5eed_1234);
        let trials = 100_000;
        let lethal = (0..trials)
            .filter(|_| hazard_is_lethal(dice.unit()))
            .count();
        let rate = lethal as f64 / f64::from(trials);
        assert!((rate - 0.493).abs() < 0.01, "lethal rate {rate}");
    }

    #[test]
    fn threshold_edges() {
        assert!(!hazard_is_lethal(0.507));
        assert!(hazard_is_lethal(0.5071));
        assert!(container_malfunctions(0.0999));
        assert!(!container_malfunctions(0.10));
    }

    #[test]
    fn below_stays_in_range() {
        let mut dice = SeededDice::new(7);
        assert!((0..1_000).all(|_| dice.below(6) < 6));
        assert_eq!(dice.below(0), 0);
    }
}
