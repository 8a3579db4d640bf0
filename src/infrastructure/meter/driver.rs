use crate::domain::models::{MeterInfo, Reading};
use crate::infrastructure::meter::MeterError;
use std::path::Path;

/// Protocol implementation for one family of glucometers.
///
/// Implementations own the device I/O; the bridge only ever calls this
/// surface. `readings` is a one-shot drain of the full history, not a
/// restartable stream.
pub trait MeterDriver: Send {
    fn connect(&mut self) -> Result<(), MeterError>;
    fn disconnect(&mut self) -> Result<(), MeterError>;
    fn meter_info(&mut self) -> Result<MeterInfo, MeterError>;
    fn readings(&mut self) -> Result<Vec<Reading>, MeterError>;
}

/// Constructor registered for a driver name. Binds a driver to the
/// device path; must not touch the device until `connect`.
pub type DriverFactory = fn(&Path) -> Result<Box<dyn MeterDriver>, MeterError>;
