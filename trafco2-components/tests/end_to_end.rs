//! End-to-end properties of the emission and flow models.
//!
//! These tests drive the public API the way a front-end would:
//! - emission engines on raw traces
//! - composition and fundamental diagrams from (p, n)
//! - platoon emission and analyzer aggregation over a dataset

use approx::assert_relative_eq;
use std::sync::Arc;
use trafco2_components::air_resistance::AirResistanceCorrection;
use trafco2_components::analyzer::{RoadSegment, TrafficDataset, TrafficEmissionAnalyzer};
use trafco2_components::config::ModelConfig;
use trafco2_components::degradation::CruiseSystemDegradation;
use trafco2_components::emission::{
    classify_vsp_bin, ElectricEmissionModel, EmissionEngines, FuelEmissionModel,
};
use trafco2_components::fundamental_diagram::{FlowRegime, HeterogeneousFlowModel};
use trafco2_components::parameters::FuelEmissionParameters;
use trafco2_components::platoon_emission::PlatoonEmissionModel;
use trafco2_core::platoon::PlatoonConfiguration;
use trafco2_core::rates::{EmissionRateTable, EmissionRates, VspBin};
use trafco2_core::trace::KinematicTrace;
use trafco2_core::units::FloatValue;
use trafco2_core::vehicle::{Lane, VehicleRecord, VehicleType};

mod vsp_engine {
    use super::*;

    #[test]
    fn test_bins_cover_the_real_line() {
        let edges = [-2.0, 0.0, 1.0, 4.0, 7.0, 10.0, 13.0, 16.0, 19.0, 23.0, 28.0, 33.0];
        assert_eq!(classify_vsp_bin(-1e9).index(), 0);
        assert_eq!(classify_vsp_bin(1e9).index(), 12);
        for (i, &edge) in edges.iter().enumerate() {
            // Half-open: the lower edge belongs to the upper bin
            assert_eq!(classify_vsp_bin(edge).index(), i + 1);
            assert_eq!(classify_vsp_bin(edge - 1e-9).index(), i);
        }
        assert_eq!(classify_vsp_bin(FloatValue::NAN).index(), 12);
    }

    #[test]
    fn test_zero_trace_uses_rest_bin() {
        let model = FuelEmissionModel::new();
        let durations = vec![0.5, 1.0, 2.5];
        let trace = KinematicTrace::new(vec![0.0; 3], vec![0.0; 3], durations.clone()).unwrap();

        let rate = model.rates().rate_for_bin(classify_vsp_bin(0.0));
        let expected = rate * durations.iter().sum::<FloatValue>();
        assert_relative_eq!(model.compute_co2(&trace).unwrap(), expected);
    }

    #[test]
    fn test_injected_rate_table_is_used() {
        let table = Arc::new(EmissionRateTable::new(&[2.0; 13]).unwrap());
        let model = FuelEmissionModel::from_parameters(FuelEmissionParameters::default(), table);
        let trace = KinematicTrace::from_velocity_profile(vec![10.0, 12.0, 15.0, 15.0], 1.0).unwrap();
        assert_relative_eq!(model.compute_co2(&trace).unwrap(), 2.0 * 4.0);
        assert_eq!(model.rates().rate_for_bin(VspBin::from_index(5).unwrap()), 2.0);
    }
}

mod electric_engine {
    use super::*;

    #[test]
    fn test_braking_draws_no_power() {
        let model = ElectricEmissionModel::new();
        for v in [0.0, 5.0, 10.0] {
            assert_eq!(model.compute_instant_power(v, -20.0), 0.0);
        }
    }
}

mod platoons {
    use super::*;

    #[test]
    fn test_single_vehicle_platoon_equals_independent_emission() {
        let trace = KinematicTrace::constant_speed(20.0, 1.0, 10).unwrap();
        let vehicle = VehicleRecord::new("ev", VehicleType::Electric, Lane::Inner, trace.clone());
        let config = PlatoonConfiguration::new(vec![vehicle], 0.0).unwrap();

        let model = PlatoonEmissionModel::default();
        let independent = ElectricEmissionModel::new().compute_total_emission(&trace).unwrap();
        assert_relative_eq!(
            model.electric_platoon_emission(&config).unwrap(),
            independent,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_correction_monotone_and_bounded() {
        let correction = AirResistanceCorrection::default();
        let spacings: Vec<FloatValue> = (0..100).map(|i| i as FloatValue).collect();
        for pair in spacings.windows(2) {
            assert!(correction.head_vehicle_correction(pair[1]) < correction.head_vehicle_correction(pair[0]));
            assert!(
                correction.following_vehicle_correction(pair[1])
                    < correction.following_vehicle_correction(pair[0])
            );
        }
        assert_relative_eq!(correction.head_vehicle_correction(0.0), 1.0);
        assert_relative_eq!(correction.following_vehicle_correction(0.0), 1.0);
    }
}

mod composition_and_flow {
    use super::*;

    #[test]
    fn test_full_penetration_composition() {
        let c = CruiseSystemDegradation::default().composition(1.0, 3).unwrap();
        assert_eq!(c.human_ratio, 0.0);
        assert_relative_eq!(c.acc_ratio, 1.0 / 3.0);
        assert_relative_eq!(c.cacc_ratio, 2.0 / 3.0);
    }

    #[test]
    fn test_composition_sums_to_one() {
        let model = CruiseSystemDegradation::default();
        for n in [1, 2, 3, 5, 10] {
            for i in 0..=20 {
                let p = i as FloatValue / 20.0;
                let c = model.composition(p, n).unwrap();
                assert!((c.total() - 1.0).abs() <= 1e-6);
            }
        }
    }

    #[test]
    fn test_diagram_properties() {
        let diagram = HeterogeneousFlowModel::default().generate(0.4, 3).unwrap();
        let first = diagram.points[0];
        assert_eq!((first.density, first.speed, first.flow), (0.0, 120.0, 0.0));
        assert_eq!(first.regime, FlowRegime::Stationary);

        let flows = diagram.flows();
        let expected = &diagram.densities() * &diagram.speeds() / 3.6;
        for (got, want) in flows.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-9);
        }
    }
}

mod analysis {
    use super::*;

    fn highway() -> TrafficDataset {
        let vehicles = (0..12)
            .map(|i| {
                let lane = Lane::ALL[i % 3];
                let vehicle_type = if i % 4 == 0 {
                    VehicleType::Electric
                } else {
                    VehicleType::Fuel
                };
                let speed = 22.0 + (i % 5) as FloatValue;
                VehicleRecord::new(
                    format!("car{i}"),
                    vehicle_type,
                    lane,
                    KinematicTrace::constant_speed(speed, 1.0, 60).unwrap(),
                )
                .with_spacing(12.0, 12.0)
                .with_position(300.0 - 20.0 * (i / 3) as FloatValue)
            })
            .collect();
        TrafficDataset {
            vehicles,
            segments: vec![
                RoadSegment {
                    name: "mainline".to_string(),
                    length: 900.0,
                },
                RoadSegment {
                    name: "weaving".to_string(),
                    length: 400.0,
                },
                RoadSegment {
                    name: "exit".to_string(),
                    length: 600.0,
                },
            ],
            diverge_segment: Some(1),
        }
    }

    #[test]
    fn test_platooning_reduces_total_emission() {
        let analyzer = TrafficEmissionAnalyzer::default();
        let results = analyzer
            .analyze_smart_vehicle_impact(&[0.0, 1.0], &highway())
            .unwrap();
        assert!(results[1].total < results[0].total);
        assert_eq!(results[1].counts.human, 0);
    }

    #[test]
    fn test_dataset_roundtrips_through_json() {
        let data = highway();
        let json = serde_json::to_string(&data).unwrap();
        let restored: TrafficDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn test_configured_engines_flow_into_analysis() {
        let config = ModelConfig::from_toml_str(
            r#"
            [emission_rates]
            rates = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]

            [electric]
            plant_emission_factor = 0.0
            "#,
        )
        .unwrap();
        let engines = EmissionEngines::from_config(&config);
        let trace = KinematicTrace::constant_speed(30.0, 1.0, 5).unwrap();
        assert_eq!(engines.fuel.total_emission(&trace).unwrap(), 0.0);

        let results = TrafficEmissionAnalyzer::from_config(&config)
            .analyze_ramp_vehicle_impact(&[0.5], &highway())
            .unwrap();
        assert_eq!(results[0].total, 0.0);
    }
}
