use rand::Rng;

use crate::models::{BackupError, Direction, ErrorKind};

/// Probability of a synthetic failure per path in simulate mode
pub const DEFAULT_FAULT_RATE: f64 = 0.2;

const CONSONANTS: &[u8] = b"bcdfghjklmnprstvz";
const VOWELS: &[u8] = b"aeiou";
const SYLLABLES: usize = 12;

/// Replaces transfers with random failures, for exercising the reporting
/// pipeline without touching a remote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultInjector {
    probability: f64,
}

impl FaultInjector {
    /// `probability` is clamped to `0.0..=1.0`.
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    pub fn disabled() -> Self {
        Self::new(0.0)
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Roll for a failure of the transfer of `path`.
    pub fn inject(&self, path: &str, direction: Direction) -> Option<BackupError> {
        let mut rng = rand::rng();
        if !rng.random_bool(self.probability) {
            return None;
        }
        let kind = if rng.random_bool(0.5) {
            ErrorKind::Generic
        } else {
            direction.transfer_error_kind()
        };
        Some(kind.error(path, gibberish(&mut rng)))
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new(DEFAULT_FAULT_RATE)
    }
}

/// Pronounceable nonsense: consonant-vowel syllables, sometimes spaced.
pub fn gibberish(rng: &mut impl Rng) -> String {
    let mut text = String::with_capacity(SYLLABLES * 3);
    for _ in 0..SYLLABLES {
        text.push(CONSONANTS[rng.random_range(0..CONSONANTS.len())] as char);
        text.push(VOWELS[rng.random_range(0..VOWELS.len())] as char);
        if rng.random_range(0..3) == 0 {
            text.push(' ');
        }
    }
    text.trim_end().to_string()
}
