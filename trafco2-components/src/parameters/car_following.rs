//! Car-following controller parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Parameters for the ACC controller.
///
/// $$a = k_1 (s - (h v + L + g_0)) + k_2 \Delta v$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccParameters {
    /// Spacing error gain
    /// unit: 1 / s^2
    /// default: 0.23
    pub k1: FloatValue,

    /// Relative speed gain
    /// unit: 1 / s
    /// default: 0.07
    pub k2: FloatValue,

    /// Desired time headway used when none is supplied
    /// unit: s
    /// default: 1.5
    pub desired_headway: FloatValue,

    /// Vehicle length term of the desired spacing
    /// unit: m
    /// default: 1.0
    pub vehicle_length: FloatValue,

    /// Gap kept at standstill
    /// unit: m
    /// default: 5.0
    pub standstill_gap: FloatValue,
}

impl Default for AccParameters {
    fn default() -> Self {
        Self {
            k1: 0.23,
            k2: 0.07,
            desired_headway: 1.5,
            vehicle_length: 1.0,
            standstill_gap: 5.0,
        }
    }
}

/// Parameters for the CACC controller.
///
/// $$v_{k+1} = \max(0, v_k + k_p e_k + k_d \dot{e}_k)$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaccParameters {
    /// Proportional gain on the spacing error
    /// unit: 1 / s
    /// default: 0.45
    pub kp: FloatValue,

    /// Derivative gain on the spacing error rate
    /// default: 0.25
    pub kd: FloatValue,

    /// Desired time headway inside a platoon
    /// unit: s
    /// default: 1.0
    pub desired_headway: FloatValue,

    /// unit: m
    /// default: 1.0
    pub vehicle_length: FloatValue,

    /// unit: m
    /// default: 5.0
    pub standstill_gap: FloatValue,
}

impl Default for CaccParameters {
    fn default() -> Self {
        Self {
            kp: 0.45,
            kd: 0.25,
            desired_headway: 1.0,
            vehicle_length: 1.0,
            standstill_gap: 5.0,
        }
    }
}

/// Limits applied when integrating a follower behind a leader trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerSimulationParameters {
    /// unit: m / s^2
    /// default: 2.0
    pub max_acceleration: FloatValue,

    /// Magnitude of the strongest braking allowed
    /// unit: m / s^2
    /// default: 6.0
    pub max_deceleration: FloatValue,

    /// Initial gap to the leader
    /// unit: m
    /// default: 30.0
    pub initial_gap: FloatValue,
}

impl Default for FollowerSimulationParameters {
    fn default() -> Self {
        Self {
            max_acceleration: 2.0,
            max_deceleration: 6.0,
            initial_gap: 30.0,
        }
    }
}
