//! Current weather snapshot and display helpers

use serde::{Deserialize, Serialize};

/// Current conditions at a resolved location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Observation time in the service's local timezone (ISO-like, no offset)
    pub time: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Relative humidity in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// WMO weather interpretation code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<i32>,
    /// Wind speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Coarse weather condition derived from a WMO code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Unknown,
    Sunny,
    PartlyCloudy,
    Fog,
    Rain,
    Snow,
    Thunder,
}

impl WeatherCondition {
    #[must_use]
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            None => Self::Unknown,
            Some(0) => Self::Sunny,
            Some(c) if c <= 3 => Self::PartlyCloudy,
            Some(45 | 48) => Self::Fog,
            Some(51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82) => Self::Rain,
            Some(71 | 73 | 75 | 77 | 85 | 86) => Self::Snow,
            Some(95 | 96 | 99) => Self::Thunder,
            Some(_) => Self::PartlyCloudy,
        }
    }

    /// Japanese label used in spoken summaries
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "不明",
            Self::Sunny => "晴れ",
            Self::PartlyCloudy => "くもり",
            Self::Fog => "霧",
            Self::Rain => "雨",
            Self::Snow => "雪",
            Self::Thunder => "雷雨",
        }
    }
}

impl WeatherSnapshot {
    #[must_use]
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.weather_code)
    }

    /// Japanese sentence announcing the current weather in `city`.
    #[must_use]
    pub fn speech_summary(&self, city: &str) -> String {
        let humidity = self
            .humidity
            .map_or_else(|| "不明".to_string(), |h| h.to_string());
        let wind = self
            .wind_speed
            .map_or_else(|| "不明".to_string(), |w| w.to_string());
        format!(
            "{city}の現在の天気をお知らせします。天気は{}、気温は{}度、湿度は{humidity}パーセント、風速は{wind}キロメートル毎時です。",
            self.condition().label(),
            self.temperature_c,
        )
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature_c)
    }
}
