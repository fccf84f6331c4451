//! Lane utility and lane-change parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Weights and references of the lane utility function.
///
/// $$U = w_s U_{speed} + w_f U_{freedom} + w_{safe} U_{safety}$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneUtilityParameters {
    /// default: 0.5
    pub speed_weight: FloatValue,
    /// default: 0.3
    pub freedom_weight: FloatValue,
    /// default: 0.2
    pub safety_weight: FloatValue,

    /// Speed normaliser of the inner lane
    /// unit: km / h
    /// default: 120.0
    pub inner_reference_speed: FloatValue,
    /// unit: km / h
    /// default: 100.0
    pub middle_reference_speed: FloatValue,
    /// unit: km / h
    /// default: 80.0
    pub outer_reference_speed: FloatValue,

    /// Front gap at which the lane counts as fully free
    /// unit: m
    /// default: 100.0
    pub freedom_reference_gap: FloatValue,

    /// Smallest of front/rear gap at which the lane counts as fully safe
    /// unit: m
    /// default: 50.0
    pub safety_reference_gap: FloatValue,
}

impl Default for LaneUtilityParameters {
    fn default() -> Self {
        Self {
            speed_weight: 0.5,
            freedom_weight: 0.3,
            safety_weight: 0.2,
            inner_reference_speed: 120.0,
            middle_reference_speed: 100.0,
            outer_reference_speed: 80.0,
            freedom_reference_gap: 100.0,
            safety_reference_gap: 50.0,
        }
    }
}

/// Lane-change motivation and gap-acceptance thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneChangeParameters {
    /// Utility gain above which a change is considered
    /// default: 0.7
    pub motivation_threshold: FloatValue,

    /// Time gap wanted to the new leader
    /// unit: s
    /// default: 1.5
    pub front_time_gap: FloatValue,

    /// Time gap wanted to the new follower
    /// unit: s
    /// default: 1.0
    pub rear_time_gap: FloatValue,

    /// Gap required on top of the time gap
    /// unit: m
    /// default: 2.0
    pub min_gap: FloatValue,

    /// Length used to turn positions into bumper-to-bumper gaps
    /// unit: m
    /// default: 5.0
    pub vehicle_length: FloatValue,
}

impl Default for LaneChangeParameters {
    fn default() -> Self {
        Self {
            motivation_threshold: 0.7,
            front_time_gap: 1.5,
            rear_time_gap: 1.0,
            min_gap: 2.0,
            vehicle_length: 5.0,
        }
    }
}
