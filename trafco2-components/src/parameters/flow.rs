//! Heterogeneous fundamental diagram parameters

use serde::{Deserialize, Serialize};
use trafco2_core::units::FloatValue;

/// How the average headway blends human, ACC and CACC headways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadwayMix {
    /// Shares (1 - p, p(1 - p), p^2), or (0, 1/n, (n - 1)/n) when p = 1
    Simple,
    /// Shares taken from the cruise-system degradation model
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalDiagramParameters {
    /// unit: s
    /// default: 2.0
    pub human_headway: FloatValue,
    /// unit: s
    /// default: 1.5
    pub acc_headway: FloatValue,
    /// unit: s
    /// default: 1.0
    pub cacc_headway: FloatValue,
    /// unit: m
    /// default: 5.0
    pub vehicle_length: FloatValue,
    /// unit: m
    /// default: 2.0
    pub min_spacing: FloatValue,
    /// unit: km / h
    /// default: 120.0
    pub free_flow_speed: FloatValue,
    /// Upper end of the density sweep
    /// unit: veh / km
    /// default: 150.0
    pub max_density: FloatValue,
    /// Number of densities sampled, both ends included
    /// default: 100
    pub samples: usize,
    /// Spacing above `headway * multiple + vehicle_length` is free flow
    /// default: 30.0
    pub free_flow_headway_multiple: FloatValue,
    /// default: simple
    pub headway_mix: HeadwayMix,
}

impl Default for FundamentalDiagramParameters {
    fn default() -> Self {
        Self {
            human_headway: 2.0,
            acc_headway: 1.5,
            cacc_headway: 1.0,
            vehicle_length: 5.0,
            min_spacing: 2.0,
            free_flow_speed: 120.0,
            max_density: 150.0,
            samples: 100,
            free_flow_headway_multiple: 30.0,
            headway_mix: HeadwayMix::Simple,
        }
    }
}
