use super::{AccController, CaccController};
use crate::parameters::FollowerSimulationParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trafco2_core::errors::{TrafficError, TrafficResult};
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::FloatValue;

/// Longitudinal control law driving a follower
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controller {
    Acc {
        controller: AccController,
        /// unit: s
        desired_headway: FloatValue,
    },
    Cacc {
        controller: CaccController,
        /// unit: s
        desired_headway: FloatValue,
    },
}

impl Controller {
    pub fn acc(controller: AccController) -> Self {
        let desired_headway = controller.parameters().desired_headway;
        Controller::Acc {
            controller,
            desired_headway,
        }
    }

    pub fn cacc(controller: CaccController) -> Self {
        let desired_headway = controller.parameters().desired_headway;
        Controller::Cacc {
            controller,
            desired_headway,
        }
    }

    pub fn with_headway(self, headway: FloatValue) -> Self {
        match self {
            Controller::Acc { controller, .. } => Controller::Acc {
                controller,
                desired_headway: headway,
            },
            Controller::Cacc { controller, .. } => Controller::Cacc {
                controller,
                desired_headway: headway,
            },
        }
    }

    pub fn desired_headway(&self) -> FloatValue {
        match self {
            Controller::Acc {
                desired_headway, ..
            }
            | Controller::Cacc {
                desired_headway, ..
            } => *desired_headway,
        }
    }
}

/// Integrates a follower behind a leader trace
///
/// Uses explicit Euler steps aligned with the leader's steps. The follower's
/// acceleration is limited to `[-max_deceleration, max_acceleration]` and its
/// speed never drops below zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FollowerSimulator {
    parameters: FollowerSimulationParameters,
}

impl FollowerSimulator {
    pub fn from_parameters(parameters: FollowerSimulationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &FollowerSimulationParameters {
        &self.parameters
    }

    /// Simulate with the configured initial gap, starting at the leader's initial speed
    pub fn follow(
        &self,
        leader: &KinematicTrace,
        controller: &Controller,
    ) -> TrafficResult<KinematicTrace> {
        let initial_speed = leader.velocity().first().copied().unwrap_or(0.0);
        self.simulate(leader, controller, self.parameters.initial_gap, initial_speed)
    }

    pub fn simulate(
        &self,
        leader: &KinematicTrace,
        controller: &Controller,
        initial_gap: FloatValue,
        initial_speed: FloatValue,
    ) -> TrafficResult<KinematicTrace> {
        if !(initial_gap >= 0.0) || !(initial_speed >= 0.0) {
            return Err(TrafficError::invalid(format!(
                "initial gap ({initial_gap}) and speed ({initial_speed}) must be non-negative"
            )));
        }

        let n = leader.len();
        let mut velocity = Vec::with_capacity(n);
        let mut acceleration = Vec::with_capacity(n);
        let mut duration = Vec::with_capacity(n);

        let mut gap = initial_gap;
        let mut speed = initial_speed;
        let mut previous_error: Option<FloatValue> = None;

        for step in leader.steps() {
            let dt = step.duration;
            let relative_speed = step.velocity - speed;

            let commanded = match controller {
                Controller::Acc {
                    controller,
                    desired_headway,
                } => controller.acceleration(gap, relative_speed, speed, *desired_headway),
                Controller::Cacc {
                    controller,
                    desired_headway,
                } => {
                    let error = controller.spacing_error(gap, speed, *desired_headway);
                    let derivative = match previous_error {
                        Some(previous) => (error - previous) / dt,
                        None => relative_speed,
                    };
                    previous_error = Some(error);
                    (controller.new_speed(speed, error, derivative) - speed) / dt
                }
            };

            let limited = commanded
                .clamp(-self.parameters.max_deceleration, self.parameters.max_acceleration)
                // cannot brake below standstill within the step
                .max(-speed / dt);

            velocity.push(speed);
            acceleration.push(limited);
            duration.push(dt);

            gap += (step.velocity - speed) * dt;
            speed = (speed + limited * dt).max(0.0);
        }

        debug!(steps = n, final_gap = gap, final_speed = speed, "Simulated follower");
        KinematicTrace::new(velocity, acceleration, duration)
    }
}
