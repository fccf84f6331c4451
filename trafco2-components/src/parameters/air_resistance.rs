use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Parameters of the platoon drag-reduction curves.
///
/// Both curves have the form $f(s) = a e^{-k s} + f_\infty$, equal to
/// $a + f_\infty = 1$ at zero spacing and approaching $f_\infty$ as spacing grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirResistanceParameters {
    /// default: 0.8
    pub head_amplitude: FloatValue,
    /// unit: 1 / m
    /// default: 0.02
    pub head_decay: FloatValue,
    /// default: 0.2
    pub head_floor: FloatValue,
    /// default: 0.6
    pub follower_amplitude: FloatValue,
    /// unit: 1 / m
    /// default: 0.03
    pub follower_decay: FloatValue,
    /// default: 0.4
    pub follower_floor: FloatValue,
}

impl Default for AirResistanceParameters {
    fn default() -> Self {
        Self {
            head_amplitude: 0.8,
            head_decay: 0.02,
            head_floor: 0.2,
            follower_amplitude: 0.6,
            follower_decay: 0.03,
            follower_floor: 0.4,
        }
    }
}
