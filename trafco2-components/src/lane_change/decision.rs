use super::utility::{LaneUtilityModel, Surroundings};
use crate::parameters::LaneChangeParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trafco2_core::scenario::{Recommendation, RecommendationKind};
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::Lane;

/// State of a vehicle considering a lane change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub id: String,
    pub lane: Lane,
    /// Lane the vehicle would like to move to
    pub target_lane: Lane,
    /// unit: m / s
    pub speed: FloatValue,
    /// unit: km / h
    pub desired_speed: FloatValue,
    /// Front bumper position along the road
    /// unit: m
    #[serde(default)]
    pub position: FloatValue,
}

/// Whether each side of the target gap is large enough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapAcceptance {
    pub front: bool,
    pub rear: bool,
}

impl GapAcceptance {
    pub fn accepted(&self) -> bool {
        self.front && self.rear
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StayReason {
    /// The target lane is the current lane
    AlreadyInTargetLane,
    /// Utility gain not above the threshold
    InsufficientMotivation { motivation: FloatValue },
    /// Motivated, but the target gap is too small
    GapRejected {
        motivation: FloatValue,
        acceptance: GapAcceptance,
    },
}

/// Result of a single-vehicle lane-change decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaneChangeOutcome {
    Stay(StayReason),
    Changed {
        from: Lane,
        to: Lane,
        motivation: FloatValue,
    },
}

impl LaneChangeOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, LaneChangeOutcome::Changed { .. })
    }

    pub fn recommendation_kind(&self) -> RecommendationKind {
        match self {
            LaneChangeOutcome::Changed { from, to, .. } => RecommendationKind::from_lane_move(*from, *to),
            LaneChangeOutcome::Stay(_) => RecommendationKind::Keep,
        }
    }
}

impl From<&LaneChangeOutcome> for Recommendation {
    fn from(outcome: &LaneChangeOutcome) -> Self {
        let kind = outcome.recommendation_kind();
        let (text, icon) = match kind {
            RecommendationKind::Keep => ("Keep current lane", "arrow-up"),
            RecommendationKind::Left => ("Change to the left lane", "arrow-left"),
            RecommendationKind::Right => ("Change to the right lane", "arrow-right"),
        };
        let distance_hint = match outcome {
            LaneChangeOutcome::Changed { .. } => "Safe gap available",
            LaneChangeOutcome::Stay(StayReason::GapRejected { .. }) => "Waiting for a safe gap",
            LaneChangeOutcome::Stay(_) => "",
        };
        Recommendation {
            kind,
            text: text.to_string(),
            distance_hint: distance_hint.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Utility-driven lane-change decisions
///
/// A vehicle changes lane when the utility gain of its target lane exceeds
/// the motivation threshold and both sides of the target gap are at least
/// `min_gap + time_gap * speed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaneChangeModel {
    utility: LaneUtilityModel,
    parameters: LaneChangeParameters,
}

impl LaneChangeModel {
    pub fn from_parameters(utility: LaneUtilityModel, parameters: LaneChangeParameters) -> Self {
        Self {
            utility,
            parameters,
        }
    }

    pub fn utility(&self) -> &LaneUtilityModel {
        &self.utility
    }

    pub fn parameters(&self) -> &LaneChangeParameters {
        &self.parameters
    }

    /// Utility gain of the target lane over the current one, floored at zero
    pub fn motivation(&self, vehicle: &VehicleState, surroundings: &Surroundings) -> FloatValue {
        let current = self
            .utility
            .lane_utility(vehicle.lane, vehicle.desired_speed, surroundings);
        let target = self
            .utility
            .lane_utility(vehicle.target_lane, vehicle.desired_speed, surroundings);
        (target - current).max(0.0)
    }

    /// unit: m
    pub fn desired_front_gap(&self, speed: FloatValue) -> FloatValue {
        self.parameters.min_gap + self.parameters.front_time_gap * speed
    }

    /// unit: m
    pub fn desired_rear_gap(&self, speed: FloatValue) -> FloatValue {
        self.parameters.min_gap + self.parameters.rear_time_gap * speed
    }

    pub fn gap_acceptance(&self, vehicle: &VehicleState, surroundings: &Surroundings) -> GapAcceptance {
        let target = surroundings.lane(vehicle.target_lane);
        GapAcceptance {
            front: target.front_gap >= self.desired_front_gap(vehicle.speed),
            rear: target.rear_gap >= self.desired_rear_gap(vehicle.speed),
        }
    }

    /// Decide, and on success move the vehicle into its target lane
    pub fn single_vehicle_decision(
        &self,
        vehicle: &mut VehicleState,
        surroundings: &Surroundings,
    ) -> LaneChangeOutcome {
        if vehicle.lane == vehicle.target_lane {
            return LaneChangeOutcome::Stay(StayReason::AlreadyInTargetLane);
        }

        let motivation = self.motivation(vehicle, surroundings);
        if motivation <= self.parameters.motivation_threshold {
            return LaneChangeOutcome::Stay(StayReason::InsufficientMotivation { motivation });
        }

        let acceptance = self.gap_acceptance(vehicle, surroundings);
        if !acceptance.accepted() {
            debug!(
                vehicle = %vehicle.id,
                front = acceptance.front,
                rear = acceptance.rear,
                "Lane change gap rejected"
            );
            return LaneChangeOutcome::Stay(StayReason::GapRejected {
                motivation,
                acceptance,
            });
        }

        let from = vehicle.lane;
        vehicle.lane = vehicle.target_lane;
        debug!(vehicle = %vehicle.id, %from, to = %vehicle.lane, motivation, "Lane changed");
        LaneChangeOutcome::Changed {
            from,
            to: vehicle.lane,
            motivation,
        }
    }
}
