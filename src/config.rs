//! Branching configuration for persistent vectors.
//!
//! A vector lineage is parameterised by its branching power `P`: every node
//! holds up to `W = 2^P` children or elements. Larger powers give shallower
//! trees and cheaper reads at the cost of copying wider nodes on every
//! mutation. The power is fixed when a vector is constructed and shared by
//! every version derived from it.
//!
//! # Examples
//!
//! ```rust
//! use radix_vector::{PersistentVector, VectorConfig};
//!
//! let config = VectorConfig::new(2).unwrap();
//! let vector = PersistentVector::with_config(config)
//!     .unwrap()
//!     .push_back_many(0..10);
//!
//! assert_eq!(vector.width(), 4);
//! assert_eq!(vector.len(), 10);
//! ```

use crate::error::VectorError;

/// Default branching power (2^5 = 32).
pub const DEFAULT_BRANCHING_POWER: u32 = 5;

/// Largest accepted branching power (2^8 = 256).
pub const MAX_BRANCHING_POWER: u32 = 8;

/// User-facing configuration of a vector lineage.
///
/// The power is validated when the configuration is turned into a vector, so
/// a configuration obtained through deserialization is checked the same way
/// as one built with [`VectorConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VectorConfig {
    branching_power: u32,
}

impl VectorConfig {
    /// Creates a configuration with the given branching power.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidBranchingPower`] unless
    /// `1 <= power <= MAX_BRANCHING_POWER`.
    pub const fn new(power: u32) -> Result<Self, VectorError> {
        if power == 0 || power > MAX_BRANCHING_POWER {
            return Err(VectorError::InvalidBranchingPower { power });
        }
        Ok(Self {
            branching_power: power,
        })
    }

    /// Returns the configured branching power.
    #[inline]
    pub const fn branching_power(&self) -> u32 {
        self.branching_power
    }

    /// Returns a copy of this configuration with a different branching power.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidBranchingPower`] for unsupported powers.
    pub const fn with_branching_power(self, power: u32) -> Result<Self, VectorError> {
        Self::new(power)
    }

    /// Validates the configuration and derives the per-lineage parameters.
    pub(crate) const fn branching(self) -> Result<Branching, VectorError> {
        match Self::new(self.branching_power) {
            Ok(config) => Ok(Branching::from_power(config.branching_power)),
            Err(error) => Err(error),
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            branching_power: DEFAULT_BRANCHING_POWER,
        }
    }
}

/// Derived branching parameters copied into every version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Branching {
    /// Bits consumed per tree level (`P`).
    pub(crate) bits: usize,
    /// Children per internal node and elements per leaf (`W = 2^P`).
    pub(crate) width: usize,
    /// `W - 1`, used to pick a slot out of a shifted index.
    pub(crate) mask: usize,
}

impl Branching {
    /// Only call with a power that passed validation.
    pub(crate) const fn from_power(power: u32) -> Self {
        let bits = power as usize;
        let width = 1 << bits;
        Self {
            bits,
            width,
            mask: width - 1,
        }
    }
}

impl Default for Branching {
    fn default() -> Self {
        Self::from_power(DEFAULT_BRANCHING_POWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, 1)]
    #[case(2, 4, 3)]
    #[case(5, 32, 31)]
    #[case(8, 256, 255)]
    fn test_branching_from_valid_power(
        #[case] power: u32,
        #[case] width: usize,
        #[case] mask: usize,
    ) {
        let branching = VectorConfig::new(power).unwrap().branching().unwrap();
        assert_eq!(branching.bits, power as usize);
        assert_eq!(branching.width, width);
        assert_eq!(branching.mask, mask);
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    #[case(64)]
    fn test_invalid_power_rejected(#[case] power: u32) {
        assert_eq!(
            VectorConfig::new(power),
            Err(VectorError::InvalidBranchingPower { power })
        );
    }

    #[rstest]
    fn test_default_config_uses_width_32() {
        let config = VectorConfig::default();
        assert_eq!(config.branching_power(), DEFAULT_BRANCHING_POWER);
        assert_eq!(config.branching().unwrap().width, 32);
        assert_eq!(Branching::default(), config.branching().unwrap());
    }

    #[rstest]
    fn test_with_branching_power_replaces_power() {
        let config = VectorConfig::default().with_branching_power(3).unwrap();
        assert_eq!(config.branching_power(), 3);
        assert!(VectorConfig::default().with_branching_power(0).is_err());
    }
}
