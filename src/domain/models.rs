//! Core data types for glucose readings and meter metadata.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// mg/dL per mmol/L, the conversion factor for blood glucose.
const MGDL_PER_MMOLL: f64 = 18.0;

/// Timestamp format used on the wire: ISO-8601 without an offset,
/// matching the meter's local clock.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Unit a glucose value is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Unit {
    #[serde(rename = "mg/dL")]
    #[value(name = "mg/dl")]
    MgDl,
    #[serde(rename = "mmol/L")]
    #[value(name = "mmol/l")]
    MmolL,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::MgDl => write!(f, "mg/dL"),
            Unit::MmolL => write!(f, "mmol/L"),
        }
    }
}

/// Meal context attached to a reading.
///
/// The serialized strings match what glucometer driver libraries report,
/// including the empty string for "no meal information".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Meal {
    #[serde(rename = "")]
    #[default]
    None,
    #[serde(rename = "Before Meal")]
    Before,
    #[serde(rename = "After Meal")]
    After,
}

/// How a reading was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeasurementMethod {
    #[serde(rename = "blood sample")]
    #[default]
    BloodSample,
    #[serde(rename = "CGM")]
    Cgm,
    #[serde(rename = "time")]
    Time,
}

/// One glucose measurement retrieved from the meter.
///
/// Values are stored in mg/dL and converted on demand. Readings are
/// immutable once retrieved.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Device-local timestamp of the measurement.
    pub timestamp: NaiveDateTime,
    /// Glucose value in mg/dL.
    pub value_mgdl: f64,
    pub meal: Meal,
    pub comment: String,
    pub measure_method: MeasurementMethod,
    /// Driver-specific extras (e.g. ketone flags), kept as raw JSON.
    pub extra_data: serde_json::Map<String, serde_json::Value>,
}

impl Reading {
    /// Glucose value converted to `unit`.
    pub fn value_as(&self, unit: Unit) -> f64 {
        match unit {
            Unit::MgDl => self.value_mgdl,
            Unit::MmolL => self.value_mgdl / MGDL_PER_MMOLL,
        }
    }

    /// Wire-facing record with the value normalized to `unit`.
    pub fn to_record(&self, unit: Unit) -> ReadingRecord {
        ReadingRecord {
            time: self.timestamp.format(TIME_FORMAT).to_string(),
            value: self.value_as(unit),
            meal: self.meal,
            comment: self.comment.clone(),
            measure_method: self.measure_method,
            extra_data: self.extra_data.clone(),
        }
    }
}

/// Serialized form of a [`Reading`] as exposed over BLE and in dump files.
///
/// The key set is fixed: `time`, `value`, `meal`, `comment`,
/// `measure_method`, `extra_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub time: String,
    pub value: f64,
    #[serde(default)]
    pub meal: Meal,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub measure_method: MeasurementMethod,
    #[serde(default)]
    pub extra_data: serde_json::Map<String, serde_json::Value>,
}

impl ReadingRecord {
    /// Rebuilds a [`Reading`] from a record whose value is in mg/dL.
    ///
    /// Used by the dump driver; fails if the timestamp is malformed.
    pub fn into_reading(self) -> Result<Reading, chrono::ParseError> {
        let timestamp = NaiveDateTime::parse_from_str(&self.time, TIME_FORMAT)?;
        Ok(Reading {
            timestamp,
            value_mgdl: self.value,
            meal: self.meal,
            comment: self.comment,
            measure_method: self.measure_method,
            extra_data: self.extra_data,
        })
    }
}

/// Identification data reported by the meter.
#[derive(Debug, Clone)]
pub struct MeterInfo {
    pub model: String,
    pub serial_number: Option<String>,
    pub version_info: Vec<String>,
    pub native_unit: Unit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_reading() -> Reading {
        Reading {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            value_mgdl: 90.0,
            meal: Meal::Before,
            comment: "fasting".to_string(),
            measure_method: MeasurementMethod::BloodSample,
            extra_data: serde_json::Map::new(),
        }
    }

    #[test]
    fn converts_to_mmol() {
        let reading = sample_reading();
        assert_eq!(reading.value_as(Unit::MgDl), 90.0);
        assert_eq!(reading.value_as(Unit::MmolL), 5.0);
    }

    #[test]
    fn record_has_fixed_key_set() {
        let json = serde_json::to_value(sample_reading().to_record(Unit::MgDl)).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["comment", "extra_data", "meal", "measure_method", "time", "value"]
        );
        assert_eq!(obj["time"], "2024-03-15T08:30:00");
        assert_eq!(obj["meal"], "Before Meal");
        assert_eq!(obj["measure_method"], "blood sample");
    }

    #[test]
    fn record_round_trips_into_reading() {
        let reading = sample_reading();
        let rebuilt = reading.to_record(Unit::MgDl).into_reading().unwrap();
        assert_eq!(rebuilt, reading);
    }

    #[test]
    fn malformed_time_is_rejected() {
        let mut record = sample_reading().to_record(Unit::MgDl);
        record.time = "yesterday".to_string();
        assert!(record.into_reading().is_err());
    }
}
