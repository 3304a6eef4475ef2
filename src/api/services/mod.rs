pub mod health;
pub mod locations;

pub use health::{HealthService, health_routes};
pub use locations::{LocationsService, location_routes};
