mod pose;
mod ride;

pub use pose::Pose;
pub use ride::{NewRide, Ride};
