//! Car-following control laws
//!
//! - [`AccController`]: one-vehicle lookahead, outputs an acceleration
//! - [`CaccController`]: communication-assisted, outputs the next speed
//! - [`FollowerSimulator`]: drives either controller behind a leader trace to
//!   produce the follower's own [`KinematicTrace`](trafco2_core::trace::KinematicTrace)

mod acc;
mod cacc;
mod simulate;

pub use acc::AccController;
pub use cacc::CaccController;
pub use simulate::{Controller, FollowerSimulator};
