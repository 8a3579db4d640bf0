//! GATT peripheral exposing the reading cache.
//!
//! ## Modules
//!
//! - [`protocol`] - service/characteristic UUIDs and wire encodings
//! - [`handlers`] - read/write callbacks over the shared context
//! - [`server`] - BlueZ application bootstrap and lifecycle

pub mod handlers;
pub mod protocol;
pub mod server;

pub use handlers::GattContext;
pub use server::{serve, ServerConfig};
