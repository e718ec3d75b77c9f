//! Device payload parsing and validation.
//!
//! The device reports one JSON object per `GET /api/data`:
//! `{"force": <N>, "angle": <deg>, "timestamp": <epoch secs>, "quality": <0-1>}`.
//!
//! This module is the seam between the wire format and the internal
//! [`SensorReading`] — the wire can grow fields without touching consumers.
//! Parsing is a pure function: deterministic, no side effects, and it never
//! yields a partially-populated reading.

use serde::Deserialize;
use thiserror::Error;

use crate::types::SensorReading;

/// Telemetry payload errors. All variants classify as a malformed payload
/// to the caller; the variants exist so diagnostics can say what was wrong.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("payload is not a valid telemetry object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("quality {0} outside the valid range [0, 1]")]
    QualityOutOfRange(f64),
}

/// Raw wire shape. Unknown fields are ignored so firmware additions
/// (e.g. the virtual-angle channel) do not break older hosts.
#[derive(Debug, Deserialize)]
struct RawSample {
    force: f64,
    angle: f64,
    timestamp: f64,
    quality: f64,
}

/// Parse and validate one device payload into a [`SensorReading`].
///
/// Rejects missing or non-numeric fields, non-finite force/angle/timestamp,
/// and quality outside [0, 1].
pub fn parse(payload: &str) -> Result<SensorReading, TelemetryError> {
    let raw: RawSample = serde_json::from_str(payload)?;

    if !raw.force.is_finite() {
        return Err(TelemetryError::NonFinite("force"));
    }
    if !raw.angle.is_finite() {
        return Err(TelemetryError::NonFinite("angle"));
    }
    if !raw.timestamp.is_finite() {
        return Err(TelemetryError::NonFinite("timestamp"));
    }
    if !(0.0..=1.0).contains(&raw.quality) {
        return Err(TelemetryError::QualityOutOfRange(raw.quality));
    }

    Ok(SensorReading {
        force: raw.force,
        angle: raw.angle,
        timestamp: raw.timestamp,
        quality: raw.quality,
    })
}
