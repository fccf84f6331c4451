//! Multi-vehicle cooperative lane change
//!
//! A group of connected vehicles changes lane together or not at all:
//!
//! 1. **Synchronise**: the latest [`CommunicationMessage`] of each vehicle
//!    overrides its locally known position and speed.
//! 2. **Plan**: one [`JointTrajectory`] assigns every vehicle its target lane
//!    at its synchronised position.
//! 3. **Validate**: every consecutive pair in a lane after the manoeuvre that
//!    involves a moving vehicle must keep `min_gap + time_gap * v_follower`.
//!    Existing traffic in the target lanes is part of the check.
//! 4. **Execute**: only if validation passes are the lanes updated.

use super::decision::{LaneChangeModel, VehicleState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use trafco2_core::errors::{TrafficError, TrafficResult};
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::Lane;

/// State broadcast by a connected vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationMessage {
    pub vehicle_id: String,
    /// unit: s
    pub timestamp: FloatValue,
    /// unit: m
    pub position: FloatValue,
    /// unit: m / s
    pub speed: FloatValue,
}

/// A vehicle outside the cooperating group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneOccupant {
    pub id: String,
    pub lane: Lane,
    /// unit: m
    pub position: FloatValue,
    /// unit: m / s
    pub speed: FloatValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub id: String,
    pub from: Lane,
    pub to: Lane,
    pub position: FloatValue,
    pub speed: FloatValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointTrajectory {
    pub moves: Vec<PlannedMove>,
}

/// A pair of vehicles that would end up too close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapViolation {
    pub lane: Lane,
    pub leader: String,
    pub follower: String,
    /// unit: m
    pub gap: FloatValue,
    /// unit: m
    pub required: FloatValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CooperativeOutcome {
    Executed { trajectory: JointTrajectory },
    Rejected { violations: Vec<GapViolation> },
}

impl CooperativeOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, CooperativeOutcome::Executed { .. })
    }
}

struct Slot<'a> {
    id: &'a str,
    position: FloatValue,
    speed: FloatValue,
    moving: bool,
}

impl LaneChangeModel {
    /// Apply the latest message of each vehicle to its local state
    ///
    /// Messages from vehicles outside the group are ignored.
    pub fn synchronise_states(
        &self,
        group: &[VehicleState],
        messages: &[CommunicationMessage],
    ) -> Vec<VehicleState> {
        group
            .iter()
            .map(|vehicle| {
                let latest = messages
                    .iter()
                    .filter(|m| m.vehicle_id == vehicle.id)
                    .max_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
                let mut state = vehicle.clone();
                if let Some(message) = latest {
                    state.position = message.position;
                    state.speed = message.speed;
                }
                state
            })
            .collect()
    }

    pub fn plan_joint_trajectory(&self, states: &[VehicleState]) -> JointTrajectory {
        JointTrajectory {
            moves: states
                .iter()
                .map(|s| PlannedMove {
                    id: s.id.clone(),
                    from: s.lane,
                    to: s.target_lane,
                    position: s.position,
                    speed: s.speed,
                })
                .collect(),
        }
    }

    /// Every unsafe pair in the post-manoeuvre layout; empty when safe
    pub fn validate_safety(
        &self,
        trajectory: &JointTrajectory,
        traffic: &[LaneOccupant],
    ) -> Vec<GapViolation> {
        let p = self.parameters();
        let mut violations = Vec::new();

        for lane in Lane::ALL {
            let mut slots: Vec<Slot> = trajectory
                .moves
                .iter()
                .filter(|m| m.to == lane)
                .map(|m| Slot {
                    id: &m.id,
                    position: m.position,
                    speed: m.speed,
                    moving: m.from != m.to,
                })
                .chain(traffic.iter().filter(|o| o.lane == lane).map(|o| Slot {
                    id: &o.id,
                    position: o.position,
                    speed: o.speed,
                    moving: false,
                }))
                .collect();
            // Front of the lane first
            slots.sort_by(|a, b| b.position.total_cmp(&a.position));

            for pair in slots.windows(2) {
                let (leader, follower) = (&pair[0], &pair[1]);
                let time_gap = if follower.moving {
                    p.front_time_gap
                } else if leader.moving {
                    p.rear_time_gap
                } else {
                    continue;
                };
                let gap = leader.position - follower.position - p.vehicle_length;
                let required = p.min_gap + time_gap * follower.speed;
                if gap < required {
                    violations.push(GapViolation {
                        lane,
                        leader: leader.id.to_string(),
                        follower: follower.id.to_string(),
                        gap,
                        required,
                    });
                }
            }
        }
        violations
    }

    /// Synchronise, plan, validate and, only if every gap is safe, move the
    /// whole group into its target lanes
    pub fn cooperative_decision(
        &self,
        group: &mut [VehicleState],
        messages: &[CommunicationMessage],
        traffic: &[LaneOccupant],
    ) -> TrafficResult<CooperativeOutcome> {
        ensure_unique_ids(group)?;

        let states = self.synchronise_states(group, messages);
        let trajectory = self.plan_joint_trajectory(&states);
        let violations = self.validate_safety(&trajectory, traffic);

        if !violations.is_empty() {
            debug!(
                group_size = group.len(),
                violations = violations.len(),
                "Cooperative lane change rejected"
            );
            return Ok(CooperativeOutcome::Rejected { violations });
        }

        for (vehicle, state) in group.iter_mut().zip(states) {
            *vehicle = VehicleState {
                lane: state.target_lane,
                ..state
            };
        }
        debug!(group_size = group.len(), "Cooperative lane change executed");
        Ok(CooperativeOutcome::Executed { trajectory })
    }
}

fn ensure_unique_ids(group: &[VehicleState]) -> TrafficResult<()> {
    let mut seen = HashSet::new();
    match group.iter().find(|v| !seen.insert(v.id.as_str())) {
        Some(duplicate) => Err(TrafficError::invalid(format!(
            "vehicle {} appears twice in the cooperating group",
            duplicate.id
        ))),
        None => Ok(()),
    }
}
