//! Scalar type and unit conversion constants shared by every model.

/// Floating point type used throughout the models
pub type FloatValue = f64;

/// Standard gravitational acceleration
/// unit: m / s^2
pub const GRAVITY: FloatValue = 9.81;

/// km/h per m/s
pub const KMH_PER_MS: FloatValue = 3.6;

/// Seconds in an hour
pub const SECONDS_PER_HOUR: FloatValue = 3600.0;

/// Watts in a kilowatt
pub const WATTS_PER_KILOWATT: FloatValue = 1000.0;

/// Metres in a kilometre
pub const METRES_PER_KILOMETRE: FloatValue = 1000.0;

/// Convert a speed in km/h to m/s
pub fn kmh_to_ms(speed: FloatValue) -> FloatValue {
    speed / KMH_PER_MS
}

/// Convert a speed in m/s to km/h
pub fn ms_to_kmh(speed: FloatValue) -> FloatValue {
    speed * KMH_PER_MS
}

/// Convert an energy in watt-seconds (joules) to kWh
pub fn watt_seconds_to_kwh(energy: FloatValue) -> FloatValue {
    energy / SECONDS_PER_HOUR / WATTS_PER_KILOWATT
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_speed_conversions() {
        assert!(is_close!(kmh_to_ms(72.0), 20.0));
        assert!(is_close!(ms_to_kmh(20.0), 72.0));
    }

    #[test]
    fn test_energy_conversion() {
        // 1 kW for an hour
        assert!(is_close!(watt_seconds_to_kwh(1000.0 * 3600.0), 1.0));
    }
}
