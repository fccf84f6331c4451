//! Air Resistance Correction
//!
//! Vehicles driving close together in a platoon shield each other from
//! aerodynamic drag. The reduction is expressed as a multiplicative
//! correction factor on the drag coefficient, decaying exponentially with
//! spacing:
//!
//! - head vehicle: $\mu(s) = 0.8 e^{-0.02 s} + 0.2$, using the gap to its follower
//! - followers: $\beta(s) = 0.6 e^{-0.03 s} + 0.4$, using the gap to their leader

use crate::parameters::AirResistanceParameters;
use serde::{Deserialize, Serialize};
use trafco2_core::errors::{TrafficError, TrafficResult};
use trafco2_core::platoon::PlatoonConfiguration;
use trafco2_core::units::FloatValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirResistanceCorrection {
    parameters: AirResistanceParameters,
}

impl AirResistanceCorrection {
    pub fn from_parameters(parameters: AirResistanceParameters) -> Self {
        Self { parameters }
    }

    /// Drag correction of the platoon head given the gap (m) to its follower
    pub fn head_vehicle_correction(&self, spacing: FloatValue) -> FloatValue {
        let p = &self.parameters;
        p.head_amplitude * (-p.head_decay * spacing).exp() + p.head_floor
    }

    /// Drag correction of a follower given the gap (m) to its leader
    pub fn following_vehicle_correction(&self, spacing: FloatValue) -> FloatValue {
        let p = &self.parameters;
        p.follower_amplitude * (-p.follower_decay * spacing).exp() + p.follower_floor
    }

    /// Return a copy of the platoon with corrected drag coefficients
    ///
    /// The first vehicle is treated as the head; every other vehicle as a
    /// follower. The input is left untouched.
    pub fn apply_platoon_correction(
        &self,
        platoon: &PlatoonConfiguration,
    ) -> TrafficResult<PlatoonConfiguration> {
        let mut corrected = platoon.clone();

        for (i, vehicle) in corrected.vehicles.iter_mut().enumerate() {
            let factor = if i == 0 {
                self.head_vehicle_correction(non_negative(vehicle.spacing_to_follower, &vehicle.id)?)
            } else {
                self.following_vehicle_correction(non_negative(vehicle.spacing_to_leader, &vehicle.id)?)
            };
            vehicle.corrected_drag_coefficient = Some(vehicle.base_drag_coefficient * factor);
        }
        Ok(corrected)
    }
}

fn non_negative(spacing: FloatValue, id: &str) -> TrafficResult<FloatValue> {
    if !(spacing >= 0.0) {
        return Err(TrafficError::invalid(format!(
            "vehicle {id} has invalid spacing {spacing}"
        )));
    }
    Ok(spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trafco2_core::trace::KinematicTrace;
    use trafco2_core::vehicle::{Lane, VehicleRecord, VehicleType};

    fn platoon() -> PlatoonConfiguration {
        let vehicles = (0..3)
            .map(|i| {
                VehicleRecord::new(
                    format!("v{i}"),
                    VehicleType::SmartFuel,
                    Lane::Inner,
                    KinematicTrace::constant_speed(25.0, 1.0, 4).unwrap(),
                )
                .with_spacing(10.0 + i as FloatValue, 12.0)
            })
            .collect();
        PlatoonConfiguration::new(vehicles, 1.0).unwrap()
    }

    #[test]
    fn test_unity_at_zero_spacing() {
        let model = AirResistanceCorrection::default();
        assert_relative_eq!(model.head_vehicle_correction(0.0), 1.0);
        assert_relative_eq!(model.following_vehicle_correction(0.0), 1.0);
    }

    #[test]
    fn test_strictly_decreasing_towards_floor() {
        let model = AirResistanceCorrection::default();
        let mut previous_head = model.head_vehicle_correction(0.0);
        let mut previous_follow = model.following_vehicle_correction(0.0);
        for step in 1..200 {
            let s = step as FloatValue * 2.5;
            let head = model.head_vehicle_correction(s);
            let follow = model.following_vehicle_correction(s);
            assert!(head < previous_head);
            assert!(follow < previous_follow);
            assert!(head > 0.2 && follow > 0.4);
            previous_head = head;
            previous_follow = follow;
        }
        assert_relative_eq!(model.head_vehicle_correction(1e4), 0.2, epsilon = 1e-9);
        assert_relative_eq!(model.following_vehicle_correction(1e4), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_apply_platoon_correction() {
        let model = AirResistanceCorrection::default();
        let original = platoon();
        let corrected = model.apply_platoon_correction(&original).unwrap();

        let head = &corrected.vehicles[0];
        assert_relative_eq!(
            head.corrected_drag_coefficient.unwrap(),
            0.3 * model.head_vehicle_correction(12.0)
        );
        for follower in &corrected.vehicles[1..] {
            assert_relative_eq!(
                follower.corrected_drag_coefficient.unwrap(),
                0.3 * model.following_vehicle_correction(follower.spacing_to_leader)
            );
        }

        // The input keeps its uncorrected coefficients
        assert!(original
            .vehicles
            .iter()
            .all(|v| v.corrected_drag_coefficient.is_none()));
    }

    #[test]
    fn test_negative_spacing_rejected() {
        let model = AirResistanceCorrection::default();
        let mut p = platoon();
        p.vehicles[1].spacing_to_leader = -3.0;
        assert!(model.apply_platoon_correction(&p).is_err());
    }
}
