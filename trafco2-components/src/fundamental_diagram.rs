//! Heterogeneous Fundamental Diagram
//!
//! Density, speed and flow of a mixed human/ACC/CACC stream.
//!
//! # What This Model Does
//!
//! 1. Blends the three headways by composition:
//!    $$\bar{h} = r_{human} h_{human} + r_{acc} h_{acc} + r_{cacc} h_{cacc}$$
//!    The shares come either from the simple mix $(1 - p,\ p(1 - p),\ p^2)$,
//!    or $(0,\ 1/n,\ (n - 1)/n)$ when $p = 1$, or from the cruise-system
//!    degradation model.
//! 2. Sweeps density $k$ (veh/km) over `samples` evenly spaced values from 0
//!    to `max_density`, with average spacing $s = 1000 / k$ metres. Density
//!    is per kilometre, so $1 / k$ would be a spacing in kilometres; the
//!    factor of 1000 keeps $s$ in the same unit as $L$ and $s_{min}$.
//! 3. Free flow above $s > 30 \bar{h} + L$, otherwise the congested branch
//!    $$v = \max\left(0, \frac{s - L - s_{min}}{\bar{h}}\right) \cdot 3.6$$
//!    Both capped at the free-flow speed.
//! 4. Flow $q = k v / 3.6$.

use crate::degradation::CruiseSystemDegradation;
use crate::parameters::{FundamentalDiagramParameters, HeadwayMix};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trafco2_core::composition::TrafficComposition;
use trafco2_core::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use trafco2_core::units::{FloatValue, KMH_PER_MS, METRES_PER_KILOMETRE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    /// Empty road
    Stationary,
    Free,
    Congested,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundamentalDiagramPoint {
    /// unit: veh / km
    pub density: FloatValue,
    /// unit: km / h
    pub speed: FloatValue,
    pub flow: FloatValue,
    pub regime: FlowRegime,
}

/// Points of a diagram, ordered by increasing density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalDiagram {
    pub smart_ratio: FloatValue,
    pub max_platoon_size: usize,
    /// unit: s
    pub average_headway: FloatValue,
    pub points: Vec<FundamentalDiagramPoint>,
}

impl FundamentalDiagram {
    pub fn densities(&self) -> Array1<FloatValue> {
        self.points.iter().map(|p| p.density).collect()
    }

    pub fn speeds(&self) -> Array1<FloatValue> {
        self.points.iter().map(|p| p.speed).collect()
    }

    pub fn flows(&self) -> Array1<FloatValue> {
        self.points.iter().map(|p| p.flow).collect()
    }

    /// Point of maximum flow
    pub fn capacity(&self) -> Option<&FundamentalDiagramPoint> {
        self.points.iter().max_by(|a, b| a.flow.total_cmp(&b.flow))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeterogeneousFlowModel {
    parameters: FundamentalDiagramParameters,
    degradation: CruiseSystemDegradation,
}

impl HeterogeneousFlowModel {
    pub fn from_parameters(
        parameters: FundamentalDiagramParameters,
        degradation: CruiseSystemDegradation,
    ) -> Self {
        Self {
            parameters,
            degradation,
        }
    }

    pub fn parameters(&self) -> &FundamentalDiagramParameters {
        &self.parameters
    }

    /// Shares used to blend the headways
    pub fn headway_shares(
        &self,
        smart_ratio: FloatValue,
        max_platoon_size: usize,
    ) -> TrafficResult<TrafficComposition> {
        ensure_unit_ratio("smart_ratio", smart_ratio)?;
        if max_platoon_size == 0 {
            return Err(TrafficError::invalid("max_platoon_size must be at least 1"));
        }

        match self.parameters.headway_mix {
            HeadwayMix::Simple => Ok(simple_shares(smart_ratio, max_platoon_size)),
            HeadwayMix::Degraded => self.degradation.composition(smart_ratio, max_platoon_size),
        }
    }

    /// unit: s
    pub fn average_headway(
        &self,
        smart_ratio: FloatValue,
        max_platoon_size: usize,
    ) -> TrafficResult<FloatValue> {
        let shares = self.headway_shares(smart_ratio, max_platoon_size)?;
        let p = &self.parameters;
        Ok(shares.human_ratio * p.human_headway
            + shares.acc_ratio * p.acc_headway
            + shares.cacc_ratio * p.cacc_headway)
    }

    /// Equilibrium speed (km/h) at `density` (veh/km)
    ///
    /// Fails for a negative density or a non-positive headway.
    pub fn equilibrium_speed(
        &self,
        density: FloatValue,
        average_headway: FloatValue,
    ) -> TrafficResult<(FloatValue, FlowRegime)> {
        if density.is_nan() || density < 0.0 {
            return Err(TrafficError::invalid(format!(
                "density must be non-negative, got {density}"
            )));
        }
        if average_headway.is_nan() || average_headway <= 0.0 {
            return Err(TrafficError::invalid(format!(
                "average headway must be positive, got {average_headway}"
            )));
        }

        let p = &self.parameters;
        if density == 0.0 {
            return Ok((p.free_flow_speed, FlowRegime::Stationary));
        }

        let spacing = METRES_PER_KILOMETRE / density;
        if spacing > average_headway * p.free_flow_headway_multiple + p.vehicle_length {
            Ok((p.free_flow_speed, FlowRegime::Free))
        } else {
            let speed = ((spacing - p.vehicle_length - p.min_spacing) / average_headway).max(0.0)
                * KMH_PER_MS;
            Ok((speed.min(p.free_flow_speed), FlowRegime::Congested))
        }
    }

    pub fn generate(
        &self,
        smart_ratio: FloatValue,
        max_platoon_size: usize,
    ) -> TrafficResult<FundamentalDiagram> {
        let p = &self.parameters;
        if !p.max_density.is_finite() || p.max_density <= 0.0 {
            return Err(TrafficError::invalid(format!(
                "max_density must be positive, got {}",
                p.max_density
            )));
        }
        if p.samples < 2 {
            return Err(TrafficError::invalid(format!(
                "samples must be at least 2, got {}",
                p.samples
            )));
        }

        let average_headway = self.average_headway(smart_ratio, max_platoon_size)?;
        let densities = Array1::linspace(0.0, p.max_density, p.samples);

        let points = densities
            .iter()
            .map(|&density| {
                let (speed, regime) = self.equilibrium_speed(density, average_headway)?;
                Ok(FundamentalDiagramPoint {
                    density,
                    speed,
                    flow: density * speed / KMH_PER_MS,
                    regime,
                })
            })
            .collect::<TrafficResult<Vec<_>>>()?;

        debug!(
            smart_ratio,
            max_platoon_size,
            average_headway,
            samples = self.parameters.samples,
            "Generated fundamental diagram"
        );
        Ok(FundamentalDiagram {
            smart_ratio,
            max_platoon_size,
            average_headway,
            points,
        })
    }
}

fn simple_shares(p: FloatValue, n: usize) -> TrafficComposition {
    if p == 1.0 {
        let n = n as FloatValue;
        TrafficComposition {
            human_ratio: 0.0,
            acc_ratio: 1.0 / n,
            cacc_ratio: (n - 1.0) / n,
        }
    } else {
        TrafficComposition {
            human_ratio: 1.0 - p,
            acc_ratio: p * (1.0 - p),
            cacc_ratio: p * p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_road_point() {
        let diagram = HeterogeneousFlowModel::default().generate(0.3, 3).unwrap();
        let first = diagram.points[0];
        assert_eq!(first.density, 0.0);
        assert_eq!(first.speed, 120.0);
        assert_eq!(first.flow, 0.0);
        assert_eq!(first.regime, FlowRegime::Stationary);
    }

    #[test]
    fn test_sweep_shape() {
        let diagram = HeterogeneousFlowModel::default().generate(0.5, 3).unwrap();
        assert_eq!(diagram.points.len(), 100);
        assert_relative_eq!(diagram.points[99].density, 150.0);
        assert!(diagram.points.windows(2).all(|w| w[0].density < w[1].density));

        for point in &diagram.points {
            assert!(point.speed >= 0.0 && point.speed <= 120.0);
            assert!(point.flow >= 0.0);
            assert_relative_eq!(point.flow, point.density * point.speed / 3.6, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_all_human_branches() {
        let model = HeterogeneousFlowModel::default();
        let h = model.average_headway(0.0, 3).unwrap();
        assert_relative_eq!(h, 2.0);

        // Free flow while spacing exceeds 2 * 30 + 5 = 65 m
        assert_eq!(model.equilibrium_speed(10.0, h).unwrap(), (120.0, FlowRegime::Free));

        // 100 veh/km: 10 m spacing
        let (speed, regime) = model.equilibrium_speed(100.0, h).unwrap();
        assert_eq!(regime, FlowRegime::Congested);
        assert_relative_eq!(speed, (10.0 - 5.0 - 2.0) / 2.0 * 3.6, epsilon = 1e-12);

        // Jammed: spacing below length plus minimum gap
        assert_eq!(model.equilibrium_speed(150.0, h).unwrap().0, 0.0);
    }

    #[test]
    fn test_spacing_is_in_metres() {
        let model = HeterogeneousFlowModel::default();
        // 40 veh/km: 25 m spacing, congested at a 2 s headway
        let (speed, _) = model.equilibrium_speed(40.0, 2.0).unwrap();
        assert_relative_eq!(speed, (25.0 - 5.0 - 2.0) / 2.0 * 3.6, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_density_rejected() {
        let model = HeterogeneousFlowModel::default();
        assert!(matches!(
            model.equilibrium_speed(-10.0, 2.0),
            Err(TrafficError::InvalidInput(_))
        ));
        assert!(model.equilibrium_speed(10.0, 0.0).is_err());
        assert_eq!(
            model.equilibrium_speed(0.0, 2.0).unwrap(),
            (120.0, FlowRegime::Stationary)
        );
    }

    #[test]
    fn test_invalid_sweep_parameters_rejected() {
        let negative = HeterogeneousFlowModel::from_parameters(
            FundamentalDiagramParameters {
                max_density: -150.0,
                ..Default::default()
            },
            CruiseSystemDegradation::default(),
        );
        assert!(matches!(
            negative.generate(0.5, 3),
            Err(TrafficError::InvalidInput(_))
        ));

        let single = HeterogeneousFlowModel::from_parameters(
            FundamentalDiagramParameters {
                samples: 1,
                ..Default::default()
            },
            CruiseSystemDegradation::default(),
        );
        assert!(single.generate(0.5, 3).is_err());
    }

    #[test]
    fn test_headway_blends() {
        let model = HeterogeneousFlowModel::default();
        assert_relative_eq!(model.average_headway(1.0, 3).unwrap(), 1.5 / 3.0 + 2.0 / 3.0);
        assert_relative_eq!(
            model.average_headway(0.5, 3).unwrap(),
            0.5 * 2.0 + 0.25 * 1.5 + 0.25 * 1.0
        );
    }

    #[test]
    fn test_smart_traffic_raises_capacity() {
        let model = HeterogeneousFlowModel::default();
        let human = model.generate(0.0, 3).unwrap();
        let smart = model.generate(1.0, 3).unwrap();
        assert!(smart.capacity().unwrap().flow > human.capacity().unwrap().flow);
    }

    #[test]
    fn test_degraded_mix_uses_composition() {
        let params = FundamentalDiagramParameters {
            headway_mix: HeadwayMix::Degraded,
            ..Default::default()
        };
        let degradation = CruiseSystemDegradation::default();
        let model = HeterogeneousFlowModel::from_parameters(params, degradation.clone());

        let c = degradation.composition(0.6, 3).unwrap();
        let expected = c.human_ratio * 2.0 + c.acc_ratio * 1.5 + c.cacc_ratio * 1.0;
        assert_relative_eq!(model.average_headway(0.6, 3).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let model = HeterogeneousFlowModel::default();
        assert!(model.generate(1.2, 3).is_err());
        assert!(model.generate(0.5, 0).is_err());
    }
}
