use crate::error::{DensityError, Result};
use std::fmt;
use std::str::FromStr;

/// Size of a chunk or prediction table: one slot per 16-bit hash.
pub(crate) const HASH_SLOTS: usize = 1 << 16;

/// Bytes reserved at the end of a Lion dictionary for its form statistics.
pub(crate) const LION_FORM_STATS_SIZE: usize = 32;

/// The supported codecs, each a different speed/ratio trade-off.
///
/// Chameleon is the fastest, Lion compresses best, Cheetah sits in between.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Chameleon = 1,
    Cheetah = 2,
    Lion = 3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Chameleon, Algorithm::Cheetah, Algorithm::Lion];

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Algorithm::Chameleon),
            2 => Ok(Algorithm::Cheetah),
            3 => Ok(Algorithm::Lion),
            _ => Err(DensityError::InvalidAlgorithm(format!("unknown algorithm id: {}", id))),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Chameleon => "chameleon",
            Algorithm::Cheetah => "cheetah",
            Algorithm::Lion => "lion",
        }
    }

    /// Bytes of adaptive state a context of this algorithm carries.
    pub fn dictionary_size(self) -> usize {
        match self {
            // chunk map: one u32 per hash
            Algorithm::Chameleon => HASH_SLOTS * 4,
            // chunk map with two u32 slots, prediction map with one
            Algorithm::Cheetah => HASH_SLOTS * 8 + HASH_SLOTS * 4,
            // two-slot chunk map, two-slot prediction map, form statistics
            Algorithm::Lion => HASH_SLOTS * 8 + HASH_SLOTS * 8 + LION_FORM_STATS_SIZE,
        }
    }

    /// Longest flag code a single 4-byte unit can take.
    pub(crate) fn max_flag_bits(self) -> u64 {
        match self {
            Algorithm::Chameleon => 1,
            Algorithm::Cheetah => 2,
            Algorithm::Lion => 4,
        }
    }
}

pub fn dictionary_size_for(algorithm: Algorithm) -> usize {
    algorithm.dictionary_size()
}

pub fn dictionary_size_for_id(id: u8) -> Result<usize> {
    Algorithm::from_id(id).map(Algorithm::dictionary_size)
}

impl TryFrom<u8> for Algorithm {
    type Error = DensityError;
    fn try_from(id: u8) -> Result<Self> {
        Algorithm::from_id(id)
    }
}

impl FromStr for Algorithm {
    type Err = DensityError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chameleon" => Ok(Algorithm::Chameleon),
            "cheetah" => Ok(Algorithm::Cheetah),
            "lion" => Ok(Algorithm::Lion),
            other => match other.parse::<u8>() {
                Ok(id) => Algorithm::from_id(id),
                Err(_) => Err(DensityError::InvalidAlgorithm(format!("unknown algorithm: {}", s))),
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conversion applied at the API boundary, so an unknown identifier is
/// rejected before any buffer is allocated or any backend call is made.
pub trait IntoAlgorithm {
    fn into_algorithm(self) -> Result<Algorithm>;
}

impl IntoAlgorithm for Algorithm {
    fn into_algorithm(self) -> Result<Algorithm> {
        Ok(self)
    }
}

impl IntoAlgorithm for u8 {
    fn into_algorithm(self) -> Result<Algorithm> {
        Algorithm::from_id(self)
    }
}

impl IntoAlgorithm for &str {
    fn into_algorithm(self) -> Result<Algorithm> {
        self.parse()
    }
}
