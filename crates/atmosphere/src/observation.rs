//! Observation points and the quantities they measure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use weather_common::WeatherError;

/// Statistical summary of one measured quantity at one airport.
///
/// Built with [`ObservationPoint::builder`]; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationPoint {
    #[serde(default)]
    mean: f64,
    #[serde(default)]
    first: i32,
    #[serde(default)]
    second: i32,
    #[serde(default)]
    third: i32,
    #[serde(default)]
    count: i32,
}

impl ObservationPoint {
    pub fn builder() -> ObservationPointBuilder {
        ObservationPointBuilder::default()
    }

    /// Mean of the observations.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// First quartile, a lower bound.
    pub fn first(&self) -> i32 {
        self.first
    }

    /// Second quartile (median).
    pub fn second(&self) -> i32 {
        self.second
    }

    /// Third quartile, a less noisy upper value.
    pub fn third(&self) -> i32 {
        self.third
    }

    /// Total number of measurements.
    pub fn count(&self) -> i32 {
        self.count
    }
}

impl fmt::Display for ObservationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={} first={} second={} third={} count={}",
            self.mean, self.first, self.second, self.third, self.count
        )
    }
}

/// Builder supplying every field of an [`ObservationPoint`] at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationPointBuilder {
    mean: f64,
    first: i32,
    second: i32,
    third: i32,
    count: i32,
}

impl ObservationPointBuilder {
    pub fn mean(mut self, mean: f64) -> Self {
        self.mean = mean;
        self
    }

    pub fn first(mut self, first: i32) -> Self {
        self.first = first;
        self
    }

    pub fn second(mut self, second: i32) -> Self {
        self.second = second;
        self
    }

    pub fn third(mut self, third: i32) -> Self {
        self.third = third;
        self
    }

    pub fn count(mut self, count: i32) -> Self {
        self.count = count;
        self
    }

    pub fn build(self) -> ObservationPoint {
        ObservationPoint {
            mean: self.mean,
            first: self.first,
            second: self.second,
            third: self.third,
            count: self.count,
        }
    }
}

/// The six quantities an atmospheric record can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PointKind {
    Wind,
    Temperature,
    Humidity,
    Pressure,
    CloudCover,
    Precipitation,
}

impl PointKind {
    pub const ALL: [PointKind; 6] = [
        PointKind::Wind,
        PointKind::Temperature,
        PointKind::Humidity,
        PointKind::Pressure,
        PointKind::CloudCover,
        PointKind::Precipitation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PointKind::Wind => "WIND",
            PointKind::Temperature => "TEMPERATURE",
            PointKind::Humidity => "HUMIDITY",
            PointKind::Pressure => "PRESSURE",
            PointKind::CloudCover => "CLOUDCOVER",
            PointKind::Precipitation => "PRECIPITATION",
        }
    }

    /// Accepted mean interval as `(lower inclusive, upper exclusive)`.
    pub fn mean_range(&self) -> (f64, f64) {
        match self {
            PointKind::Wind => (0.0, f64::INFINITY),
            PointKind::Temperature => (-50.0, 100.0),
            PointKind::Humidity => (0.0, 100.0),
            PointKind::Pressure => (650.0, 800.0),
            PointKind::CloudCover => (0.0, 100.0),
            PointKind::Precipitation => (0.0, 100.0),
        }
    }

    pub fn accepts(&self, mean: f64) -> bool {
        let (low, high) = self.mean_range();
        mean >= low && mean < high
    }

    /// Check a point's mean against this kind's accepted range.
    pub fn validate(&self, point: &ObservationPoint) -> Result<(), WeatherError> {
        if self.accepts(point.mean()) {
            return Ok(());
        }

        let (low, high) = self.mean_range();
        let range = if high.is_infinite() {
            format!("[{}, inf)", low)
        } else {
            format!("[{}, {})", low, high)
        };

        Err(WeatherError::ValidationFailure {
            kind: self.as_str().to_string(),
            mean: point.mean(),
            range,
        })
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointKind {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WIND" => Ok(PointKind::Wind),
            "TEMPERATURE" => Ok(PointKind::Temperature),
            // HUMIDTY is the spelling older collectors send.
            "HUMIDITY" | "HUMIDTY" => Ok(PointKind::Humidity),
            "PRESSURE" => Ok(PointKind::Pressure),
            "CLOUDCOVER" => Ok(PointKind::CloudCover),
            "PRECIPITATION" => Ok(PointKind::Precipitation),
            _ => Err(WeatherError::UnknownPointType(s.to_string())),
        }
    }
}
