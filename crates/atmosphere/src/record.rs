//! Per-airport atmospheric records.

use serde::{Deserialize, Serialize};

use crate::observation::{ObservationPoint, PointKind};

/// One day in milliseconds, the default freshness window.
pub const RECENT_WINDOW_MS: i64 = 86_400_000;

/// Up to six observation points for one airport plus the time of the last
/// accepted update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmosphericRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<ObservationPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<ObservationPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<ObservationPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<ObservationPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<ObservationPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<ObservationPoint>,
    /// Milliseconds since the Unix epoch; 0 when never updated.
    #[serde(default)]
    pub last_update_time: i64,
}

impl AtmosphericRecord {
    pub fn slot(&self, kind: PointKind) -> Option<&ObservationPoint> {
        match kind {
            PointKind::Wind => self.wind.as_ref(),
            PointKind::Temperature => self.temperature.as_ref(),
            PointKind::Humidity => self.humidity.as_ref(),
            PointKind::Pressure => self.pressure.as_ref(),
            PointKind::CloudCover => self.cloud_cover.as_ref(),
            PointKind::Precipitation => self.precipitation.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: PointKind) -> &mut Option<ObservationPoint> {
        match kind {
            PointKind::Wind => &mut self.wind,
            PointKind::Temperature => &mut self.temperature,
            PointKind::Humidity => &mut self.humidity,
            PointKind::Pressure => &mut self.pressure,
            PointKind::CloudCover => &mut self.cloud_cover,
            PointKind::Precipitation => &mut self.precipitation,
        }
    }

    /// Replace one slot wholesale and stamp the record.
    ///
    /// Range validation is the caller's job; see [`PointKind::validate`].
    pub fn set(&mut self, kind: PointKind, point: ObservationPoint, now_ms: i64) {
        *self.slot_mut(kind) = Some(point);
        self.last_update_time = now_ms;
    }

    /// Whether any of the six slots holds a point.
    pub fn has_data(&self) -> bool {
        PointKind::ALL.iter().any(|kind| self.slot(*kind).is_some())
    }

    /// Has data and was updated within `window_ms` before `now_ms`.
    pub fn is_recent(&self, now_ms: i64, window_ms: i64) -> bool {
        self.has_data() && self.last_update_time > now_ms - window_ms
    }
}
