use crate::parameters::LaneUtilityParameters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::Lane;

/// Gaps around the subject vehicle's longitudinal position in one lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSurroundings {
    /// Gap to the nearest vehicle ahead
    /// unit: m
    pub front_gap: FloatValue,
    /// Gap to the nearest vehicle behind
    /// unit: m
    pub rear_gap: FloatValue,
}

impl LaneSurroundings {
    pub fn new(front_gap: FloatValue, rear_gap: FloatValue) -> Self {
        Self {
            front_gap,
            rear_gap,
        }
    }

    /// A lane with no vehicle in range
    pub fn open() -> Self {
        Self::new(FloatValue::INFINITY, FloatValue::INFINITY)
    }
}

/// What the subject vehicle perceives in every lane
///
/// A lane without an entry has no vehicle in range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surroundings {
    pub lanes: IndexMap<Lane, LaneSurroundings>,
}

impl Surroundings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane(mut self, lane: Lane, surroundings: LaneSurroundings) -> Self {
        self.lanes.insert(lane, surroundings);
        self
    }

    pub fn lane(&self, lane: Lane) -> LaneSurroundings {
        self.lanes
            .get(&lane)
            .copied()
            .unwrap_or_else(LaneSurroundings::open)
    }
}

/// Utility of a lane broken down into its terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneUtilityScore {
    pub speed: FloatValue,
    pub freedom: FloatValue,
    pub safety: FloatValue,
    /// Weighted sum of the three terms
    pub total: FloatValue,
}

/// Lane utility
///
/// $$U = 0.5 U_{speed} + 0.3 U_{freedom} + 0.2 U_{safety}$$
///
/// - speed: desired speed (km/h) over the lane's reference speed
/// - freedom: front gap over the freedom reference gap, clamped to [0, 1]
/// - safety: smaller of front and rear gap over the safety reference gap,
///   clamped to [0, 1]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaneUtilityModel {
    parameters: LaneUtilityParameters,
}

impl LaneUtilityModel {
    pub fn from_parameters(parameters: LaneUtilityParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &LaneUtilityParameters {
        &self.parameters
    }

    pub fn reference_speed(&self, lane: Lane) -> FloatValue {
        match lane {
            Lane::Inner => self.parameters.inner_reference_speed,
            Lane::Middle => self.parameters.middle_reference_speed,
            Lane::Outer => self.parameters.outer_reference_speed,
        }
    }

    pub fn speed_utility(&self, lane: Lane, desired_speed_kmh: FloatValue) -> FloatValue {
        desired_speed_kmh / self.reference_speed(lane)
    }

    pub fn freedom_utility(&self, lane: &LaneSurroundings) -> FloatValue {
        num::clamp(lane.front_gap / self.parameters.freedom_reference_gap, 0.0, 1.0)
    }

    pub fn safety_utility(&self, lane: &LaneSurroundings) -> FloatValue {
        let nearest = lane.front_gap.min(lane.rear_gap);
        num::clamp(nearest / self.parameters.safety_reference_gap, 0.0, 1.0)
    }

    pub fn score(
        &self,
        lane: Lane,
        desired_speed_kmh: FloatValue,
        surroundings: &Surroundings,
    ) -> LaneUtilityScore {
        let around = surroundings.lane(lane);
        let speed = self.speed_utility(lane, desired_speed_kmh);
        let freedom = self.freedom_utility(&around);
        let safety = self.safety_utility(&around);
        let p = &self.parameters;

        LaneUtilityScore {
            speed,
            freedom,
            safety,
            total: p.speed_weight * speed + p.freedom_weight * freedom + p.safety_weight * safety,
        }
    }

    pub fn lane_utility(
        &self,
        lane: Lane,
        desired_speed_kmh: FloatValue,
        surroundings: &Surroundings,
    ) -> FloatValue {
        self.score(lane, desired_speed_kmh, surroundings).total
    }
}
