//! Lane Utility & Lane-Change Decisions
//!
//! Smart vehicles pick lanes by utility. A single vehicle changes lane when
//! its target lane is sufficiently more useful and the target gap is safe; a
//! cooperating group changes lanes together only when the joint manoeuvre is
//! safe for every vehicle involved.

mod cooperative;
mod decision;
mod utility;

pub use cooperative::{
    CommunicationMessage, CooperativeOutcome, GapViolation, JointTrajectory, LaneOccupant,
    PlannedMove,
};
pub use decision::{GapAcceptance, LaneChangeModel, LaneChangeOutcome, StayReason, VehicleState};
pub use utility::{LaneSurroundings, LaneUtilityModel, LaneUtilityScore, Surroundings};
