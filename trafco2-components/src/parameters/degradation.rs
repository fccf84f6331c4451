//! Cruise-system degradation parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Nine-term truncation of the degradation series
pub const DEFAULT_MAX_SERIES_TERMS: usize = 9;

/// Controls the summation of the max-platoon-ahead degradation series
///
/// $$S = \sum_{i=1}^{\infty} \frac{p^i (1 - p^{n i})}{1 - p^n}$$
///
/// Terms are added until one falls below `series_tolerance` or
/// `max_series_terms` have been summed, whichever happens first. The default
/// cap of 9 terms matches a fixed nine-term truncation; raise it to
/// let the tolerance govern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradationParameters {
    /// default: 1e-9
    pub series_tolerance: FloatValue,

    /// default: 9
    pub max_series_terms: usize,
}

impl Default for DegradationParameters {
    fn default() -> Self {
        Self {
            series_tolerance: 1e-9,
            max_series_terms: DEFAULT_MAX_SERIES_TERMS,
        }
    }
}

impl DegradationParameters {
    /// Whether the cap was raised above [`DEFAULT_MAX_SERIES_TERMS`]
    ///
    /// Running out of terms only warns when this holds.
    pub fn cap_is_raised(&self) -> bool {
        self.max_series_terms > DEFAULT_MAX_SERIES_TERMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cap_is_not_raised() {
        assert!(!DegradationParameters::default().cap_is_raised());
        let raised = DegradationParameters {
            max_series_terms: 100,
            ..Default::default()
        };
        assert!(raised.cap_is_raised());
    }
}
