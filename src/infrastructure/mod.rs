pub mod gatt;
pub mod logging;
pub mod meter;
