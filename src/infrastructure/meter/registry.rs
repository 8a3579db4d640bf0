use crate::infrastructure::meter::driver::DriverFactory;
use crate::infrastructure::meter::{demo, dump, Meter, MeterError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Maps driver-name strings to driver constructors.
///
/// Looking up an unknown name is a typed error, not a logged-and-ignored
/// condition; startup aborts on it.
pub struct DriverRegistry {
    drivers: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// Registry with the compiled-in drivers.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        registry.register("demo", demo::new_driver);
        registry.register("dump", dump::new_driver);
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        self.drivers.insert(name, factory);
    }

    /// Installed driver names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.drivers.keys().copied()
    }

    /// Binds the named driver to `device_path` and returns a usable
    /// meter handle, or [`MeterError::UnknownDriver`].
    pub fn open(&self, driver_name: &str, device_path: &Path) -> Result<Meter, MeterError> {
        let factory = self
            .drivers
            .get(driver_name)
            .ok_or_else(|| MeterError::UnknownDriver {
                name: driver_name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })?;
        let driver = factory(device_path)?;
        info!(driver = driver_name, path = %device_path.display(), "driver loaded");
        Ok(Meter::new(driver_name, device_path, driver))
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin_drivers()
    }
}
