use std::fmt::Write as _;

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag's random number generator. The same seed always produces
/// the same piece sequence, which makes sessions replayable and tests deterministic.
///
/// # Example
///
/// ```
/// use duotris_engine::{PieceBag, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = PieceBag::with_seed(seed);
/// let mut b = PieceBag::with_seed(seed);
/// assert_eq!(a.draw(), b.draw());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Derives an independent seed, e.g. one per player from a match seed.
    #[must_use]
    pub fn derive(self, stream: u64) -> Self {
        let mut rng = Pcg32::from_seed(self.0);
        let mut seed = [0; 16];
        for _ in 0..=stream {
            rng.fill(&mut seed);
        }
        Self(seed)
    }

    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{:032x}", self.to_u128()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for PieceSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self::from_u128(num))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// The 7-bag randomizer.
///
/// Holds one shuffled permutation of all seven piece kinds and hands them out front to
/// back. When the bag is empty a fresh permutation is shuffled in, so every aligned window
/// of seven draws contains each kind exactly once and no kind waits more than 12 draws.
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    // Stored reversed so that `pop` yields the front of the permutation.
    remaining: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBag {
    /// Creates a bag with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: seed.rng(),
            remaining: ArrayVec::new(),
        }
    }

    /// Number of kinds left before the next shuffle.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Draws the next piece kind, shuffling a new permutation if the bag is empty.
    pub fn draw(&mut self) -> PieceKind {
        if self.remaining.is_empty() {
            self.refill();
        }
        self.remaining
            .pop()
            .expect("piece bag should never be empty after refill")
    }

    fn refill(&mut self) {
        let mut new_bag = PieceKind::ALL;
        // `shuffle` is a Fisher-Yates shuffle.
        new_bag.shuffle(&mut self.rng);
        self.remaining.extend(new_bag.into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn seed() -> PieceSeed {
        PieceSeed::from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ])
    }

    #[test]
    fn test_fresh_bag_is_permutation_of_all_kinds() {
        let mut bag = PieceBag::with_seed(seed());
        let drawn: BTreeSet<PieceKind> = (0..PieceKind::LEN).map(|_| bag.draw()).collect();
        let all: BTreeSet<PieceKind> = PieceKind::ALL.into_iter().collect();
        assert_eq!(drawn, all);
        assert_eq!(bag.remaining(), 0);
    }

    #[test]
    fn test_every_aligned_window_is_a_permutation() {
        let mut bag = PieceBag::new();
        for _ in 0..50 {
            let window: Vec<PieceKind> = (0..PieceKind::LEN).map(|_| bag.draw()).collect();
            let unique: BTreeSet<PieceKind> = window.iter().copied().collect();
            assert_eq!(unique.len(), PieceKind::LEN, "repeat inside bag: {window:?}");
        }
    }

    #[test]
    fn test_max_gap_between_repeats() {
        let mut bag = PieceBag::new();
        let draws: Vec<PieceKind> = (0..700).map(|_| bag.draw()).collect();
        for kind in PieceKind::ALL {
            let positions: Vec<usize> = draws
                .iter()
                .enumerate()
                .filter(|(_, k)| **k == kind)
                .map(|(i, _)| i)
                .collect();
            for pair in positions.windows(2) {
                assert!(pair[1] - pair[0] <= 13, "{kind:?} waited too long");
            }
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut bag1 = PieceBag::with_seed(seed());
        let mut bag2 = PieceBag::with_seed(seed());
        for _ in 0..20 {
            assert_eq!(bag1.draw(), bag2.draw());
        }
    }

    #[test]
    fn test_derived_seeds_differ() {
        let base = seed();
        assert_ne!(base.derive(0), base.derive(1));
        assert_eq!(base.derive(1), base.derive(1));
    }

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = PieceSeed::from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(deserialized, seed);
        }

        #[test]
        fn test_deserialize_uppercase_hex() {
            let json = "\"0123456789ABCDEFFEDCBA9876543210\"";
            let deserialized: PieceSeed = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized.to_u128(), 0x0123_4567_89AB_CDEF_FEDC_BA98_7654_3210);
        }

        #[test]
        fn test_error_wrong_length() {
            for json in ["\"\"", "\"0123456789abcdef0123456789abcde\""] {
                let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
                assert!(err.to_string().contains("invalid hex"));
            }
        }

        #[test]
        fn test_error_invalid_hex_characters() {
            let json = "\"ghijklmnopqrstuvwxyzghijklmnopqr\"";
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("invalid hex"));
        }
    }
}
