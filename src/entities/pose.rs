pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A (latitude, longitude) pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub lat: f64,
    pub long: f64,
}

impl Pose {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// NaN never lies within range.
    pub fn is_valid(&self) -> bool {
        (-MAX_LATITUDE..=MAX_LATITUDE).contains(&self.lat)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&self.long)
    }
}

#[test]
fn pose_bounds_are_inclusive() {
    assert!(Pose::new(90.0, 180.0).is_valid());
    assert!(Pose::new(-90.0, -180.0).is_valid());
    assert!(Pose::new(0.0, 0.0).is_valid());

    assert!(!Pose::new(90.0001, 0.0).is_valid());
    assert!(!Pose::new(-90.0001, 0.0).is_valid());
    assert!(!Pose::new(0.0, 180.0001).is_valid());
    assert!(!Pose::new(0.0, -180.0001).is_valid());
}

#[test]
fn nan_pose_is_invalid() {
    assert!(!Pose::new(f64::NAN, 0.0).is_valid());
    assert!(!Pose::new(0.0, f64::NAN).is_valid());
}
