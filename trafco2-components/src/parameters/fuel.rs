//! Fuel vehicle emission parameters
//!
//! Parameters for the Vehicle Specific Power (VSP) calculation used to bin
//! instantaneous engine load into emission-rate classes.

use serde::{Deserialize, Serialize};
use trafco2_core::units::{FloatValue, GRAVITY};

/// Parameters for the VSP emission engine.
///
/// VSP is calculated as:
///
/// $$VSP = v a + v g \sin\theta + v C_r g \cos\theta + \frac{0.5 \rho C_d A (v + w)^2 v}{\epsilon \cdot 1000}$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelEmissionParameters {
    /// Mass factor (epsilon) scaling the air-resistance term
    /// default: 1.1
    pub mass_factor: FloatValue,

    /// Gravitational acceleration
    /// unit: m / s^2
    /// default: 9.81
    pub gravity: FloatValue,

    /// Rolling resistance coefficient
    /// default: 0.015
    pub rolling_resistance: FloatValue,

    /// Air density
    /// unit: kg / m^3
    /// default: 1.2
    pub air_density: FloatValue,

    /// Aerodynamic drag coefficient before any platoon correction
    /// default: 0.3
    pub drag_coefficient: FloatValue,

    /// Frontal area
    /// unit: m^2
    /// default: 2.0
    pub frontal_area: FloatValue,
}

impl Default for FuelEmissionParameters {
    fn default() -> Self {
        Self {
            mass_factor: 1.1,
            gravity: GRAVITY,
            rolling_resistance: 0.015,
            air_density: 1.2,
            drag_coefficient: 0.3,
            frontal_area: 2.0,
        }
    }
}
