//! Glucometer access.
//!
//! The meter protocol itself lives behind the [`MeterDriver`] trait;
//! this module only wires a named driver to a device path and exposes
//! the handful of operations the bridge consumes.
//!
//! ## Modules
//!
//! - [`driver`] - the driver trait real meter protocols plug into
//! - [`registry`] - driver-name to factory lookup
//! - [`demo`] - canned reading history for bring-up without hardware
//! - [`dump`] - reads a JSON reading dump in place of a physical meter

pub mod demo;
pub mod driver;
pub mod dump;
pub mod registry;

pub use driver::MeterDriver;
pub use registry::DriverRegistry;

use crate::domain::models::{MeterInfo, Reading};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MeterError {
    #[error("no driver named {name:?} is installed (available: {available})")]
    UnknownDriver { name: String, available: String },
    #[error("meter I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed reading dump: {0}")]
    Dump(#[from] serde_json::Error),
    #[error("invalid reading in dump: {0}")]
    DumpReading(#[from] chrono::ParseError),
    #[error("meter is not connected")]
    NotConnected,
}

/// Handle to a meter, bound to a device path and a loaded driver.
///
/// Construction goes through [`DriverRegistry::open`], which either
/// returns a usable handle or a typed error; there is no
/// half-constructed state.
pub struct Meter {
    driver_name: String,
    device_path: PathBuf,
    driver: Box<dyn MeterDriver>,
}

impl Meter {
    pub(crate) fn new(driver_name: &str, device_path: &Path, driver: Box<dyn MeterDriver>) -> Self {
        Self {
            driver_name: driver_name.to_string(),
            device_path: device_path.to_path_buf(),
            driver,
        }
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn connect(&mut self) -> Result<(), MeterError> {
        debug!(driver = %self.driver_name, path = %self.device_path.display(), "connecting to meter");
        self.driver.connect()
    }

    pub fn disconnect(&mut self) -> Result<(), MeterError> {
        debug!(driver = %self.driver_name, "disconnecting from meter");
        self.driver.disconnect()
    }

    pub fn meter_info(&mut self) -> Result<MeterInfo, MeterError> {
        self.driver.meter_info()
    }

    /// Drains the meter's full reading history, in device-reported order.
    pub fn readings(&mut self) -> Result<Vec<Reading>, MeterError> {
        self.driver.readings()
    }
}
