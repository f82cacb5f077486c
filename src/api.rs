use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::Ride;
use crate::error::Error;
use crate::validation::RideSubmission;

#[async_trait]
pub trait RideAPI {
    /// Validates and stores a ride, returning the stored row as a one-element list.
    async fn create_ride(&self, submission: RideSubmission) -> Result<Vec<Ride>, Error>;

    async fn list_rides(&self) -> Result<Vec<Ride>, Error>;

    async fn find_rides(&self, id: i64) -> Result<Vec<Ride>, Error>;
}

pub trait API: RideAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
