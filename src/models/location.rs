//! Location model for geocoded places

use serde::{Deserialize, Serialize};

/// A place returned by the geocoding service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchLocation {
    /// Display name as returned by the geocoder
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Country name, when the geocoder reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl SearchLocation {
    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Successful outcome of resolving a city term
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: SearchLocation,
    /// Set only when the direct lookup missed and a prefecture's
    /// representative city produced the hit
    pub is_prefecture_substitute: bool,
}
