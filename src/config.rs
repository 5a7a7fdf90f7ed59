use crate::algorithm::Algorithm;

/// Settings for a whole-buffer compression run.
///
/// There is no `Default`: every run names its algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityConfig {
    pub algorithm: Algorithm,
    /// Decompress the result again and compare it with the input.
    pub verify: bool,
}

impl DensityConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            verify: false,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}
