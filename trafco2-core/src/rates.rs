//! VSP binning and emission-rate tables
//!
//! Fuel vehicle emissions are estimated by classifying each instant's Vehicle
//! Specific Power (VSP, kW/t) into one of 13 bins and looking up an emission
//! rate (g/s) for that bin. The bin edges are fixed; the rates are data and
//! must be replaceable without code changes, so the table is loaded from
//! configuration and shared read-only between every engine that needs it.

use crate::errors::{TrafficError, TrafficResult};
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Number of VSP bins
pub const VSP_BIN_COUNT: usize = 13;

/// Upper (exclusive) edges of bins 0..=11. Bin 12 is open-ended.
const VSP_BIN_UPPER_EDGES: [FloatValue; VSP_BIN_COUNT - 1] = [
    -2.0, 0.0, 1.0, 4.0, 7.0, 10.0, 13.0, 16.0, 19.0, 23.0, 28.0, 33.0,
];

/// Placeholder rates pending calibration
/// unit: g / s
const DEFAULT_RATES: [FloatValue; VSP_BIN_COUNT] = [
    0.1, 0.2, 0.3, 0.5, 0.8, 1.2, 1.8, 2.5, 3.2, 4.0, 5.0, 6.0, 7.0,
];

/// Index of a VSP bin, always in `0..=12`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VspBin(u8);

impl VspBin {
    /// Classify a VSP value (kW/t)
    ///
    /// Intervals are half-open `[low, high)`, so a value sitting exactly on
    /// an edge belongs to the upper bin. Values below -2 land in bin 0 and
    /// values of 33 or more in bin 12. NaN compares false against every edge
    /// and falls through to the catch-all bin 12.
    pub fn classify(vsp: FloatValue) -> Self {
        let index = VSP_BIN_UPPER_EDGES
            .iter()
            .position(|&upper| vsp < upper)
            .unwrap_or(VSP_BIN_COUNT - 1);
        VspBin(index as u8)
    }

    pub fn from_index(index: usize) -> TrafficResult<Self> {
        if index >= VSP_BIN_COUNT {
            return Err(TrafficError::invalid(format!(
                "VSP bin index {index} outside 0..{VSP_BIN_COUNT}"
            )));
        }
        Ok(VspBin(index as u8))
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The `[low, high)` interval covered by this bin
    pub fn bounds(&self) -> (FloatValue, FloatValue) {
        let i = self.index();
        let low = if i == 0 {
            FloatValue::NEG_INFINITY
        } else {
            VSP_BIN_UPPER_EDGES[i - 1]
        };
        let high = VSP_BIN_UPPER_EDGES
            .get(i)
            .copied()
            .unwrap_or(FloatValue::INFINITY);
        (low, high)
    }
}

/// Source of per-bin emission rates
pub trait EmissionRates {
    /// Emission rate for a bin
    /// unit: g / s
    fn rate_for_bin(&self, bin: VspBin) -> FloatValue;
}

/// Table of emission rates indexed by [`VspBin`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateTable")]
pub struct EmissionRateTable {
    rates: [FloatValue; VSP_BIN_COUNT],
}

#[derive(Deserialize)]
struct RawRateTable {
    rates: Vec<FloatValue>,
}

impl TryFrom<RawRateTable> for EmissionRateTable {
    type Error = TrafficError;

    fn try_from(raw: RawRateTable) -> Result<Self, Self::Error> {
        EmissionRateTable::new(&raw.rates)
    }
}

impl Default for EmissionRateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES,
        }
    }
}

impl EmissionRateTable {
    /// Create a table from exactly 13 finite, non-negative rates
    pub fn new(rates: &[FloatValue]) -> TrafficResult<Self> {
        let rates: [FloatValue; VSP_BIN_COUNT] = rates.try_into().map_err(|_| {
            TrafficError::InvalidEmissionRates(format!(
                "expected {VSP_BIN_COUNT} rates, got {}",
                rates.len()
            ))
        })?;
        if let Some((bin, rate)) = rates
            .iter()
            .enumerate()
            .find(|(_, r)| !(**r >= 0.0) || !r.is_finite())
        {
            return Err(TrafficError::InvalidEmissionRates(format!(
                "rate for bin {bin} must be non-negative and finite, got {rate}"
            )));
        }
        Ok(Self { rates })
    }

    /// Parse a table from TOML of the form `rates = [ ... ]`
    pub fn from_toml_str(content: &str) -> TrafficResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> TrafficResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded emission rate table");
        Ok(table)
    }

    pub fn rates(&self) -> &[FloatValue; VSP_BIN_COUNT] {
        &self.rates
    }
}

impl EmissionRates for EmissionRateTable {
    fn rate_for_bin(&self, bin: VspBin) -> FloatValue {
        self.rates[bin.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_open_edges() {
        assert_eq!(VspBin::classify(-100.0).index(), 0);
        assert_eq!(VspBin::classify(FloatValue::NEG_INFINITY).index(), 0);
        assert_eq!(VspBin::classify(1000.0).index(), 12);
        assert_eq!(VspBin::classify(FloatValue::NAN).index(), 12);
    }

    #[test]
    fn test_classify_half_open_boundaries() {
        // A value exactly on an upper edge belongs to the next bin
        for (i, edge) in VSP_BIN_UPPER_EDGES.iter().enumerate() {
            assert_eq!(VspBin::classify(*edge).index(), i + 1, "edge {edge}");
            assert_eq!(VspBin::classify(edge - 1e-9).index(), i, "below {edge}");
        }
        assert_eq!(VspBin::classify(0.0).index(), 2);
    }

    #[test]
    fn test_classify_always_in_range() {
        let mut v = -50.0;
        while v < 50.0 {
            let bin = VspBin::classify(v);
            assert!(bin.index() < VSP_BIN_COUNT);
            let (low, high) = bin.bounds();
            assert!(low <= v && v < high);
            v += 0.37;
        }
    }

    #[test]
    fn test_from_index() {
        assert_eq!(VspBin::from_index(12).unwrap().index(), 12);
        assert!(VspBin::from_index(13).is_err());
    }

    #[test]
    fn test_table_validation() {
        assert!(EmissionRateTable::new(&[1.0; 12]).is_err());
        let mut rates = [1.0; 13];
        rates[4] = -0.1;
        assert!(matches!(
            EmissionRateTable::new(&rates),
            Err(TrafficError::InvalidEmissionRates(_))
        ));
        assert!(EmissionRateTable::new(&[0.0; 13]).is_ok());
    }

    #[test]
    fn test_table_lookup() {
        let table = EmissionRateTable::default();
        assert_eq!(table.rate_for_bin(VspBin::classify(0.0)), 0.3);
        assert_eq!(table.rate_for_bin(VspBin::classify(40.0)), 7.0);
    }

    #[test]
    fn test_table_from_toml() {
        let table = EmissionRateTable::from_toml_str(
            "rates = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]",
        )
        .unwrap();
        assert_eq!(table.rate_for_bin(VspBin::from_index(0).unwrap()), 1.0);

        let res = EmissionRateTable::from_toml_str("rates = [1.0, 2.0]");
        assert!(matches!(res, Err(TrafficError::Config(_))));
    }
}
