//! Model configuration
//!
//! [`ModelConfig`] gathers the parameters of every model plus the emission
//! rate table. Every section is optional in the TOML file:
//!
//! ```toml
//! [fuel]
//! drag_coefficient = 0.32
//!
//! [emission_rates]
//! rates = [0.1, 0.2, 0.3, 0.5, 0.8, 1.2, 1.8, 2.5, 3.2, 4.0, 5.0, 6.0, 7.0]
//!
//! [analyzer]
//! max_platoon_size = 4
//! ```

use crate::parameters::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use trafco2_core::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use trafco2_core::rates::EmissionRateTable;
use trafco2_core::units::FloatValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub fuel: FuelEmissionParameters,
    pub electric: ElectricEmissionParameters,
    /// Shared by every fuel engine built from this configuration
    pub emission_rates: Arc<EmissionRateTable>,
    pub air_resistance: AirResistanceParameters,
    pub acc: AccParameters,
    pub cacc: CaccParameters,
    pub follower: FollowerSimulationParameters,
    pub degradation: DegradationParameters,
    pub lane_utility: LaneUtilityParameters,
    pub lane_change: LaneChangeParameters,
    pub flow: FundamentalDiagramParameters,
    pub analyzer: AnalyzerParameters,
}

impl ModelConfig {
    pub fn from_toml_str(content: &str) -> TrafficResult<Self> {
        let config: ModelConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> TrafficResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded model configuration");
        Ok(config)
    }

    /// Check physical ranges that the individual models rely on
    ///
    /// The rate table validates itself on deserialisation.
    pub fn validate(&self) -> TrafficResult<()> {
        ensure_positive("electric.transmission_efficiency", self.electric.transmission_efficiency)?;
        ensure_unit_ratio("electric.thermal_share", self.electric.thermal_share)?;
        if !(0.0..1.0).contains(&self.electric.grid_loss_rate) {
            return Err(TrafficError::Config(format!(
                "electric.grid_loss_rate must lie in [0, 1), got {}",
                self.electric.grid_loss_rate
            )));
        }
        ensure_positive("fuel.mass_factor", self.fuel.mass_factor)?;

        ensure_positive("acc.desired_headway", self.acc.desired_headway)?;
        ensure_positive("cacc.desired_headway", self.cacc.desired_headway)?;
        ensure_positive("follower.max_acceleration", self.follower.max_acceleration)?;
        ensure_positive("follower.max_deceleration", self.follower.max_deceleration)?;

        if self.degradation.max_series_terms == 0 {
            return Err(TrafficError::Config(
                "degradation.max_series_terms must be at least 1".to_string(),
            ));
        }
        ensure_positive("degradation.series_tolerance", self.degradation.series_tolerance)?;

        for (name, value) in [
            ("lane_utility.speed_weight", self.lane_utility.speed_weight),
            ("lane_utility.freedom_weight", self.lane_utility.freedom_weight),
            ("lane_utility.safety_weight", self.lane_utility.safety_weight),
        ] {
            if !(value >= 0.0) {
                return Err(TrafficError::Config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        ensure_positive("lane_utility.freedom_reference_gap", self.lane_utility.freedom_reference_gap)?;
        ensure_positive("lane_utility.safety_reference_gap", self.lane_utility.safety_reference_gap)?;

        ensure_positive("flow.human_headway", self.flow.human_headway)?;
        ensure_positive("flow.acc_headway", self.flow.acc_headway)?;
        ensure_positive("flow.cacc_headway", self.flow.cacc_headway)?;
        ensure_positive("flow.max_density", self.flow.max_density)?;
        if self.flow.samples < 2 {
            return Err(TrafficError::Config(format!(
                "flow.samples must be at least 2, got {}",
                self.flow.samples
            )));
        }

        if self.analyzer.max_platoon_size == 0 {
            return Err(TrafficError::Config(
                "analyzer.max_platoon_size must be at least 1".to_string(),
            ));
        }
        ensure_positive("analyzer.ramp_speed", self.analyzer.ramp_speed)?;
        Ok(())
    }
}

fn ensure_positive(name: &str, value: FloatValue) -> TrafficResult<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(TrafficError::Config(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafco2_core::rates::{EmissionRates, VspBin};

    #[test]
    fn test_default_is_valid() {
        assert!(ModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ModelConfig::from_toml_str("").unwrap();
        assert_eq!(config.fuel, FuelEmissionParameters::default());
        assert_eq!(config.analyzer.max_platoon_size, 3);
        assert_eq!(config.degradation.max_series_terms, 9);
    }

    #[test]
    fn test_partial_override() {
        let config = ModelConfig::from_toml_str(
            r#"
            [fuel]
            drag_coefficient = 0.32

            [emission_rates]
            rates = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0]

            [flow]
            headway_mix = "degraded"
            "#,
        )
        .unwrap();

        assert_eq!(config.fuel.drag_coefficient, 0.32);
        assert_eq!(config.fuel.frontal_area, 2.0);
        assert_eq!(config.flow.headway_mix, HeadwayMix::Degraded);
        let top = VspBin::from_index(12).unwrap();
        assert_eq!(config.emission_rates.rate_for_bin(top), 9.0);
    }

    #[test]
    fn test_invalid_rate_table_rejected() {
        let res = ModelConfig::from_toml_str(
            r#"
            [emission_rates]
            rates = [1.0, 2.0]
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let res = ModelConfig::from_toml_str(
            r#"
            [electric]
            grid_loss_rate = 1.0
            "#,
        );
        assert!(matches!(res, Err(TrafficError::Config(_))));

        let res = ModelConfig::from_toml_str(
            r#"
            [analyzer]
            max_platoon_size = 0
            "#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ModelConfig::default();
        let serialised = toml::to_string(&config).unwrap();
        let restored = ModelConfig::from_toml_str(&serialised).unwrap();
        assert_eq!(restored.lane_change, config.lane_change);
        assert_eq!(restored.emission_rates.rates(), config.emission_rates.rates());
    }
}
