//! Data models for the `tenki` service
//!
//! - Location: geocoded place and its resolution outcome
//! - Weather: current conditions snapshot and condition classification

pub mod location;
pub mod weather;

pub use location::{ResolvedLocation, SearchLocation};
pub use weather::{WeatherCondition, WeatherSnapshot};
