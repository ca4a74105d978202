//! Leaf sizing configuration

use crate::error::{Result, RopeError};

/// Default leaf capacity in bytes - prioritizes tree depth over copy cost
pub const DEFAULT_MAX_LEAF: usize = 1024;

/// Longest UTF-8 encoding of a single code point
const MAX_CHAR_BYTES: usize = 4;

/// Byte bounds for leaf fragments.
///
/// Construction and rebalancing aim for leaves in `min_leaf..=max_leaf`;
/// leaves left over from a split may be smaller until the next rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RopeConfig {
    min_leaf: usize,
    max_leaf: usize,
}

impl RopeConfig {
    pub fn new(min_leaf: usize, max_leaf: usize) -> Result<Self> {
        if max_leaf < MAX_CHAR_BYTES || min_leaf > max_leaf / 2 {
            return Err(RopeError::InvalidLeafBounds { min_leaf, max_leaf });
        }
        Ok(Self { min_leaf, max_leaf })
    }

    #[inline]
    pub fn min_leaf(&self) -> usize {
        self.min_leaf
    }

    #[inline]
    pub fn max_leaf(&self) -> usize {
        self.max_leaf
    }
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            min_leaf: DEFAULT_MAX_LEAF / 4,
            max_leaf: DEFAULT_MAX_LEAF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_valid() {
        let config = RopeConfig::default();
        assert_eq!(
            RopeConfig::new(config.min_leaf(), config.max_leaf()),
            Ok(config)
        );
    }

    #[test]
    fn rejects_leaves_too_small_for_a_code_point() {
        assert_eq!(
            RopeConfig::new(0, 3),
            Err(RopeError::InvalidLeafBounds {
                min_leaf: 0,
                max_leaf: 3
            })
        );
        assert!(RopeConfig::new(0, 4).is_ok());
    }

    #[test]
    fn rejects_min_above_half_max() {
        assert!(RopeConfig::new(9, 16).is_err());
        assert!(RopeConfig::new(8, 16).is_ok());
    }
}
