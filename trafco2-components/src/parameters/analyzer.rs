//! Traffic emission analyzer parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerParameters {
    /// Largest platoon a CACC vehicle may join
    /// default: 3
    pub max_platoon_size: usize,

    /// Speed cap for vehicles once they leave on the off-ramp
    /// unit: m / s
    /// default: 16.7
    pub ramp_speed: FloatValue,

    /// Evaluate ratios on the rayon thread pool
    /// default: true
    pub parallel: bool,
}

impl Default for AnalyzerParameters {
    fn default() -> Self {
        Self {
            max_platoon_size: 3,
            ramp_speed: 16.7,
            parallel: true,
        }
    }
}
