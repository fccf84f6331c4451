use crate::parameters::AccParameters;
use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// Adaptive Cruise Control
///
/// $$a = k_1 (s - s^*) + k_2 \Delta v, \qquad s^* = h v + L + g_0$$
///
/// The current speed $v$ of the controlled vehicle is an explicit argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccController {
    parameters: AccParameters,
}

impl AccController {
    pub fn from_parameters(parameters: AccParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &AccParameters {
        &self.parameters
    }

    /// Spacing (m) the controller aims for at `current_speed` (m/s)
    pub fn desired_spacing(&self, current_speed: FloatValue, desired_headway: FloatValue) -> FloatValue {
        desired_headway * current_speed + self.parameters.vehicle_length + self.parameters.standstill_gap
    }

    /// Commanded acceleration (m/s^2)
    ///
    /// `speed_difference` is leader speed minus own speed.
    pub fn acceleration(
        &self,
        spacing: FloatValue,
        speed_difference: FloatValue,
        current_speed: FloatValue,
        desired_headway: FloatValue,
    ) -> FloatValue {
        let spacing_error = spacing - self.desired_spacing(current_speed, desired_headway);
        self.parameters.k1 * spacing_error + self.parameters.k2 * speed_difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_equilibrium_gives_zero_acceleration() {
        let acc = AccController::default();
        let v = 25.0;
        let s = acc.desired_spacing(v, 1.5);
        assert_relative_eq!(s, 1.5 * 25.0 + 1.0 + 5.0);
        assert_relative_eq!(acc.acceleration(s, 0.0, v, 1.5), 0.0);
    }

    #[test]
    fn test_response_signs() {
        let acc = AccController::default();
        let v = 20.0;
        let s = acc.desired_spacing(v, 1.5);
        // Too far behind: speed up. Too close: slow down.
        assert!(acc.acceleration(s + 10.0, 0.0, v, 1.5) > 0.0);
        assert!(acc.acceleration(s - 10.0, 0.0, v, 1.5) < 0.0);
        // Leader pulling away
        assert!(acc.acceleration(s, 2.0, v, 1.5) > 0.0);
    }

    /// Which speed the headway term should use is still unsettled, so the
    /// control law takes the controlled vehicle's current speed as an explicit
    /// input. This pins that contract: the headway term scales with the speed
    /// passed in, nothing is inferred from the leader.
    #[test]
    fn test_current_speed_is_explicit() {
        let acc = AccController::default();
        let a_slow = acc.acceleration(40.0, 0.0, 10.0, 1.5);
        let a_fast = acc.acceleration(40.0, 0.0, 20.0, 1.5);
        assert_relative_eq!(a_slow - a_fast, 0.23 * 1.5 * 10.0, epsilon = 1e-12);
    }
}
