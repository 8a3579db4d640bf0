//! Driver that replays a JSON reading dump instead of talking to a
//! physical meter.
//!
//! The device path points at a file holding a JSON array of records in
//! the same shape the bridge serves over BLE, with values in mg/dL.

use crate::domain::models::{MeterInfo, Reading, ReadingRecord, Unit};
use crate::infrastructure::meter::{MeterDriver, MeterError};
use std::fs;
use std::path::{Path, PathBuf};

pub fn new_driver(device_path: &Path) -> Result<Box<dyn MeterDriver>, MeterError> {
    Ok(Box::new(DumpDriver {
        path: device_path.to_path_buf(),
        connected: false,
    }))
}

struct DumpDriver {
    path: PathBuf,
    connected: bool,
}

impl MeterDriver for DumpDriver {
    fn connect(&mut self) -> Result<(), MeterError> {
        // Surface a missing or unreadable file at connect time, not on
        // the first drain.
        fs::metadata(&self.path)?;
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
            model: "JSON reading dump".to_string(),
            serial_number: None,
            version_info: vec![format!("source {}", self.path.display())],
            native_unit: Unit::MgDl,
        })
    }

    fn readings(&mut self) -> Result<Vec<Reading>, MeterError> {
        if !self.connected {
            return Err(MeterError::NotConnected);
        }
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<ReadingRecord> = serde_json::from_str(&contents)?;
        records
            .into_iter()
            .map(|record| record.into_reading().map_err(MeterError::from))
            .collect()
    }
}
