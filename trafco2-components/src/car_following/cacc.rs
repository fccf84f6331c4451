use crate::parameters::CaccParameters;
use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Cooperative Adaptive Cruise Control
///
/// A PD law on the spacing error updates the speed directly:
///
/// $$v_{k+1} = \max(0, v_k + k_p e_k + k_d \dot{e}_k)$$
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaccController {
    parameters: CaccParameters,
}

impl CaccController {
    pub fn from_parameters(parameters: CaccParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &CaccParameters {
        &self.parameters
    }

    /// Spacing error (m) relative to the constant time-gap policy
    pub fn spacing_error(
        &self,
        spacing: FloatValue,
        current_speed: FloatValue,
        desired_headway: FloatValue,
    ) -> FloatValue {
        let p = &self.parameters;
        spacing - (desired_headway * current_speed + p.vehicle_length + p.standstill_gap)
    }

    /// Next speed (m/s), never negative
    pub fn new_speed(
        &self,
        current_speed: FloatValue,
        spacing_error: FloatValue,
        spacing_error_derivative: FloatValue,
    ) -> FloatValue {
        let adjustment =
            self.parameters.kp * spacing_error + self.parameters.kd * spacing_error_derivative;
        (current_speed + adjustment).max(0.0)
    }
}
