pub mod services;

pub use services::{health_routes, location_routes};
