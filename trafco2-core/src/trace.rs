//! Kinematic traces
//!
//! A [`KinematicTrace`] is the motion history of a single vehicle: three
//! index-aligned sequences of velocity (m/s), acceleration (m/s^2) and step
//! duration (s). Every emission engine consumes traces, and the car-following
//! simulator produces them.

use crate::errors::{TrafficError, TrafficResult};
use crate::units::FloatValue;
use serde::{Deserialize, Serialize};

/// A single step of a [`KinematicTrace`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceStep {
    pub velocity: FloatValue,
    pub acceleration: FloatValue,
    pub duration: FloatValue,
}

/// Motion history of one vehicle
///
/// Invariants, enforced on construction and deserialisation:
/// - all three sequences have the same length
/// - every duration is strictly positive
/// - every value is finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrace")]
pub struct KinematicTrace {
    velocity: Vec<FloatValue>,
    acceleration: Vec<FloatValue>,
    duration: Vec<FloatValue>,
}

#[derive(Deserialize)]
struct RawTrace {
    velocity: Vec<FloatValue>,
    acceleration: Vec<FloatValue>,
    duration: Vec<FloatValue>,
}

impl TryFrom<RawTrace> for KinematicTrace {
    type Error = TrafficError;

    fn try_from(raw: RawTrace) -> Result<Self, Self::Error> {
        KinematicTrace::new(raw.velocity, raw.acceleration, raw.duration)
    }
}

impl KinematicTrace {
    pub fn new(
        velocity: Vec<FloatValue>,
        acceleration: Vec<FloatValue>,
        duration: Vec<FloatValue>,
    ) -> TrafficResult<Self> {
        validate_profiles(&velocity, &acceleration, &duration)?;
        Ok(Self {
            velocity,
            acceleration,
            duration,
        })
    }

    /// An empty trace (no steps)
    pub fn empty() -> Self {
        Self {
            velocity: vec![],
            acceleration: vec![],
            duration: vec![],
        }
    }

    /// Constant speed cruise of `steps` steps of length `dt`
    pub fn constant_speed(velocity: FloatValue, dt: FloatValue, steps: usize) -> TrafficResult<Self> {
        Self::new(vec![velocity; steps], vec![0.0; steps], vec![dt; steps])
    }

    /// Build a trace from a velocity profile sampled every `dt` seconds
    ///
    /// Accelerations use a forward difference; the final step repeats the
    /// previous acceleration (zero for single-sample profiles).
    pub fn from_velocity_profile(velocity: Vec<FloatValue>, dt: FloatValue) -> TrafficResult<Self> {
        if !(dt > 0.0) {
            return Err(TrafficError::invalid(format!(
                "time step must be positive, got {dt}"
            )));
        }
        let n = velocity.len();
        let mut acceleration: Vec<FloatValue> = velocity
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) / dt)
            .collect();
        if n > 0 {
            acceleration.push(acceleration.last().copied().unwrap_or(0.0));
        }
        Self::new(velocity, acceleration, vec![dt; n])
    }

    pub fn len(&self) -> usize {
        self.velocity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocity.is_empty()
    }

    pub fn velocity(&self) -> &[FloatValue] {
        &self.velocity
    }

    pub fn acceleration(&self) -> &[FloatValue] {
        &self.acceleration
    }

    pub fn duration(&self) -> &[FloatValue] {
        &self.duration
    }

    pub fn steps(&self) -> impl Iterator<Item = TraceStep> + '_ {
        self.velocity
            .iter()
            .zip(&self.acceleration)
            .zip(&self.duration)
            .map(|((&velocity, &acceleration), &duration)| TraceStep {
                velocity,
                acceleration,
                duration,
            })
    }

    /// Total elapsed time (s)
    pub fn total_duration(&self) -> FloatValue {
        self.duration.iter().sum()
    }

    /// Distance travelled (m), integrating velocity over each step
    pub fn distance(&self) -> FloatValue {
        self.steps().map(|s| s.velocity * s.duration).sum()
    }

    /// Split the trace at cumulative distance thresholds
    ///
    /// `boundaries` are the end positions (m, measured from the start of the
    /// trace) of every piece but the last, in increasing order. A step is
    /// assigned to the piece containing the distance covered at the start of
    /// that step. Always returns `boundaries.len() + 1` traces, some of which
    /// may be empty.
    pub fn split_by_distance(&self, boundaries: &[FloatValue]) -> Vec<KinematicTrace> {
        let mut pieces = vec![KinematicTrace::empty(); boundaries.len() + 1];
        let mut travelled = 0.0;

        for step in self.steps() {
            let piece = boundaries
                .iter()
                .position(|&end| travelled < end)
                .unwrap_or(boundaries.len());
            pieces[piece].push(step);
            travelled += step.velocity * step.duration;
        }
        pieces
    }

    /// Apply a transformation to every step, keeping durations intact
    ///
    /// The closure receives the step index and step.
    pub fn map_steps<F>(&self, mut f: F) -> TrafficResult<KinematicTrace>
    where
        F: FnMut(usize, TraceStep) -> (FloatValue, FloatValue),
    {
        let (velocity, acceleration): (Vec<_>, Vec<_>) =
            self.steps().enumerate().map(|(i, s)| f(i, s)).unzip();
        KinematicTrace::new(velocity, acceleration, self.duration.clone())
    }

    fn push(&mut self, step: TraceStep) {
        self.velocity.push(step.velocity);
        self.acceleration.push(step.acceleration);
        self.duration.push(step.duration);
    }
}

/// Validate raw profiles without taking ownership
///
/// Used by entry points that accept borrowed slices.
pub fn validate_profiles(
    velocity: &[FloatValue],
    acceleration: &[FloatValue],
    duration: &[FloatValue],
) -> TrafficResult<()> {
    if velocity.len() != acceleration.len() || velocity.len() != duration.len() {
        return Err(TrafficError::LengthMismatch {
            velocity: velocity.len(),
            acceleration: acceleration.len(),
            duration: duration.len(),
        });
    }
    if let Some(dt) = duration.iter().find(|dt| !(**dt > 0.0) || !dt.is_finite()) {
        return Err(TrafficError::invalid(format!(
            "durations must be positive and finite, got {dt}"
        )));
    }
    if velocity.iter().chain(acceleration).any(|x| !x.is_finite()) {
        return Err(TrafficError::invalid("trace contains non-finite values"));
    }
    Ok(())
}
