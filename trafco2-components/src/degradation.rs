//! Cruise-System Degradation
//!
//! Estimates how a stream with smart-vehicle penetration $p$ and maximum
//! platoon size $n$ splits into human, ACC and CACC vehicles.
//!
//! A smart vehicle can only run CACC when its leader is itself smart and the
//! platoon ahead still has room. Otherwise its cruise system degrades to ACC:
//!
//! - **Human vehicle ahead**: probability $p (1 - p)$
//! - **Maximum-size platoon ahead**: approximated by the series
//!   $$S = \sum_{i=1}^{\infty} \frac{p^i (1 - p^{n i})}{1 - p^n}$$
//!   summed until a term drops below a tolerance or an iteration cap is hit,
//!   and capped at $p$.
//!
//! When $p = 1$ every platoon is full: one ACC head and $n - 1$ CACC
//! followers, giving $1/n$ and $(n-1)/n$.

use crate::parameters::DegradationParameters;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trafco2_core::composition::TrafficComposition;
use trafco2_core::errors::{ensure_unit_ratio, TrafficError, TrafficResult};
use trafco2_core::units::FloatValue;

/// Which closed-form branch the composition follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionRegime {
    /// p = 1: full platoons only
    HomogeneousSmart,
    /// 0 <= p < 1: degradation from human and full-platoon leaders
    Mixed,
}

/// Outcome of summing the max-platoon-ahead series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSum {
    /// Sum of the terms, before capping
    pub value: FloatValue,
    pub terms: usize,
    /// Whether the last term fell below the tolerance
    pub converged: bool,
}

/// Composition together with its degradation breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegradedComposition {
    pub composition: TrafficComposition,
    pub regime: CompositionRegime,
    /// ACC share caused by a human leader
    pub acc_from_human_ahead: FloatValue,
    /// ACC share caused by a full platoon ahead
    pub acc_from_max_platoon_ahead: FloatValue,
    /// Series diagnostics, absent for the homogeneous regime
    pub series: Option<SeriesSum>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CruiseSystemDegradation {
    parameters: DegradationParameters,
}

impl CruiseSystemDegradation {
    pub fn from_parameters(parameters: DegradationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &DegradationParameters {
        &self.parameters
    }

    pub fn regime(smart_ratio: FloatValue) -> CompositionRegime {
        if smart_ratio == 1.0 {
            CompositionRegime::HomogeneousSmart
        } else {
            CompositionRegime::Mixed
        }
    }

    /// Vehicle shares for penetration `smart_ratio` and platoons of at most
    /// `max_platoon_size` vehicles
    pub fn vehicle_proportions(
        &self,
        smart_ratio: FloatValue,
        max_platoon_size: usize,
    ) -> TrafficResult<DegradedComposition> {
        ensure_unit_ratio("smart_ratio", smart_ratio)?;
        if max_platoon_size == 0 {
            return Err(TrafficError::invalid("max_platoon_size must be at least 1"));
        }

        let result = match Self::regime(smart_ratio) {
            CompositionRegime::HomogeneousSmart => self.homogeneous(max_platoon_size),
            CompositionRegime::Mixed => self.mixed(smart_ratio, max_platoon_size),
        };
        debug!(
            smart_ratio,
            max_platoon_size,
            acc = result.composition.acc_ratio,
            cacc = result.composition.cacc_ratio,
            "Computed degraded composition"
        );
        Ok(result)
    }

    /// Shorthand returning only the composition
    pub fn composition(
        &self,
        smart_ratio: FloatValue,
        max_platoon_size: usize,
    ) -> TrafficResult<TrafficComposition> {
        Ok(self
            .vehicle_proportions(smart_ratio, max_platoon_size)?
            .composition)
    }

    fn homogeneous(&self, n: usize) -> DegradedComposition {
        let n = n as FloatValue;
        let acc = 1.0 / n;
        DegradedComposition {
            composition: TrafficComposition {
                human_ratio: 0.0,
                acc_ratio: acc,
                cacc_ratio: (n - 1.0) / n,
            },
            regime: CompositionRegime::HomogeneousSmart,
            acc_from_human_ahead: 0.0,
            acc_from_max_platoon_ahead: acc,
            series: None,
        }
    }

    fn mixed(&self, p: FloatValue, n: usize) -> DegradedComposition {
        let from_human = p * (1.0 - p);
        let series = self.max_platoon_series(p, n);
        let from_platoon = series.value.min(p);

        // The ACC share can never exceed the smart share
        let acc = (from_human + from_platoon).min(p);
        let cacc = (p - acc).max(0.0);

        DegradedComposition {
            composition: TrafficComposition {
                human_ratio: 1.0 - p,
                acc_ratio: acc,
                cacc_ratio: cacc,
            },
            regime: CompositionRegime::Mixed,
            acc_from_human_ahead: from_human,
            acc_from_max_platoon_ahead: acc - from_human.min(acc),
            series: Some(series),
        }
    }

    /// Sum the max-platoon-ahead series for `p < 1`
    pub fn max_platoon_series(&self, p: FloatValue, n: usize) -> SeriesSum {
        let p_n = p.powi(n as i32);
        let denominator = 1.0 - p_n;

        let mut value: FloatValue = 0.0;
        let mut terms = 0;
        let mut converged = false;
        let mut p_i: FloatValue = 1.0;
        let mut p_ni: FloatValue = 1.0;

        while terms < self.parameters.max_series_terms {
            p_i *= p;
            p_ni *= p_n;
            let term = p_i * (1.0 - p_ni) / denominator;
            value += term;
            terms += 1;
            if term.abs() < self.parameters.series_tolerance {
                converged = true;
                break;
            }
        }

        if !converged && p > 0.0 {
            if self.parameters.cap_is_raised() {
                warn!(
                    p,
                    n,
                    terms,
                    "Degradation series stopped at the iteration cap before reaching tolerance"
                );
            } else {
                debug!(p, n, terms, "Degradation series truncated at the default cap");
            }
        }
        SeriesSum {
            value,
            terms,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_all_smart_three_platoon() {
        let model = CruiseSystemDegradation::default();
        let result = model.vehicle_proportions(1.0, 3).unwrap();
        let c = result.composition;

        assert_eq!(result.regime, CompositionRegime::HomogeneousSmart);
        assert_relative_eq!(c.acc_ratio, 1.0 / 3.0);
        assert_relative_eq!(c.cacc_ratio, 2.0 / 3.0);
        assert_eq!(c.human_ratio, 0.0);
    }

    #[test]
    fn test_no_smart_vehicles() {
        let model = CruiseSystemDegradation::default();
        let c = model.composition(0.0, 4).unwrap();
        assert_eq!(c.human_ratio, 1.0);
        assert_eq!(c.acc_ratio, 0.0);
        assert_eq!(c.cacc_ratio, 0.0);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let model = CruiseSystemDegradation::default();
        for n in 1..=8 {
            for step in 0..=100 {
                let p = step as FloatValue / 100.0;
                let c = model.composition(p, n).unwrap();
                assert!(
                    (c.total() - 1.0).abs() < 1e-6,
                    "p={p} n={n} total={}",
                    c.total()
                );
                assert!(c.validate().is_ok(), "p={p} n={n}: {c:?}");
            }
        }
    }

    #[test]
    fn test_acc_share_never_exceeds_smart_share() {
        let model = CruiseSystemDegradation::default();
        for step in 1..100 {
            let p = step as FloatValue / 100.0;
            let c = model.composition(p, 3).unwrap();
            assert!(c.acc_ratio <= p + 1e-12);
            assert!(c.cacc_ratio >= 0.0);
        }
    }

    #[test]
    fn test_low_penetration_is_mostly_human_ahead() {
        let model = CruiseSystemDegradation::default();
        let result = model.vehicle_proportions(0.1, 3).unwrap();
        assert_relative_eq!(result.acc_from_human_ahead, 0.09, epsilon = 1e-12);
        assert_eq!(result.regime, CompositionRegime::Mixed);
    }

    #[test]
    fn test_series_default_cap_is_nine_terms() {
        // Default parameters stop after nine terms
        let model = CruiseSystemDegradation::default();
        let (p, n): (FloatValue, i32) = (0.5, 3);
        let expected: FloatValue = (1..10)
            .map(|i| p.powi(i) * (1.0 - p.powi(n * i)) / (1.0 - p.powi(n)))
            .sum();
        let series = model.max_platoon_series(p, n as usize);
        assert_eq!(series.terms, 9);
        assert!(!series.converged);
        // Truncation at the default cap is logged at debug level only
        assert!(!model.parameters().cap_is_raised());
        assert_relative_eq!(series.value, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_series_converges_with_tolerance() {
        let model = CruiseSystemDegradation::from_parameters(DegradationParameters {
            series_tolerance: 1e-12,
            max_series_terms: 10_000,
        });
        let series = model.max_platoon_series(0.5, 3);
        assert!(series.converged);
        assert!(series.terms < 10_000);

        // Closed form of the limit: sum p^i (1 - p^{ni}) / (1 - p^n)
        let (p, pn): (FloatValue, FloatValue) = (0.5, 0.125);
        let limit = (p / (1.0 - p) - p * pn / (1.0 - p * pn)) / (1.0 - pn);
        assert_relative_eq!(series.value, limit, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        let model = CruiseSystemDegradation::default();
        assert!(model.composition(1.5, 3).is_err());
        assert!(model.composition(-0.1, 3).is_err());
        assert!(model.composition(0.5, 0).is_err());
    }
}
