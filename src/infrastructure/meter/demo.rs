//! Canned meter for bring-up and demos; no hardware involved.

use crate::domain::models::{Meal, MeasurementMethod, MeterInfo, Reading, Unit};
use crate::infrastructure::meter::{MeterDriver, MeterError};
use chrono::{Duration, NaiveDate};
use std::path::Path;

pub fn new_driver(_device_path: &Path) -> Result<Box<dyn MeterDriver>, MeterError> {
    Ok(Box::new(DemoDriver { connected: false }))
}

struct DemoDriver {
    connected: bool,
}

impl MeterDriver for DemoDriver {
    fn connect(&mut self) -> Result<(), MeterError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), MeterError> {
        self.connected = false;
        Ok(())
    }

    fn meter_info(&mut self) -> Result<MeterInfo, MeterError> {
        if !self.connected {
            return Err(MeterError::NotConnected);
        }
        Ok(MeterInfo {
            model: "Gluconnect Demo Meter".to_string(),
            serial_number: Some("DEMO-0001".to_string()),
            version_info: vec!["firmware 1.0".to_string()],
            native_unit: Unit::MgDl,
        })
    }

    fn readings(&mut self) -> Result<Vec<Reading>, MeterError> {
        if !self.connected {
            return Err(MeterError::NotConnected);
        }
        // Fixed starting point keeps the history stable across runs.
        let base = NaiveDate::from_ymd_opt(2024, 3, 11)
            .expect("valid date")
            .and_hms_opt(7, 30, 0)
            .expect("valid time");

        let plan: [(i64, f64, Meal, &str); 6] = [
            (0, 92.0, Meal::Before, "fasting"),
            (5, 141.0, Meal::After, ""),
            (24, 88.0, Meal::Before, ""),
            (29, 152.0, Meal::After, "big breakfast"),
            (48, 95.0, Meal::Before, ""),
            (53, 134.0, Meal::After, ""),
        ];

        Ok(plan
            .iter()
            .map(|&(hours, value, meal, comment)| Reading {
                timestamp: base + Duration::hours(hours),
                value_mgdl: value,
                meal,
                comment: comment.to_string(),
                measure_method: MeasurementMethod::BloodSample,
                extra_data: serde_json::Map::new(),
            })
            .collect())
    }
}
