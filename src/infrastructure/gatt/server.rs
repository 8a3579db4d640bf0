//! BlueZ-backed GATT server bootstrap.
//!
//! Builds the static service/characteristic table, registers the
//! advertisement, and serves until the shutdown future resolves. All
//! characteristic access is dispatched into the shared [`GattContext`].

use crate::infrastructure::gatt::handlers::GattContext;
use crate::infrastructure::gatt::protocol::{
    READING_COUNT_CHAR_UUID, READING_REQUEST_CHAR_UUID, SERVICE_UUID,
};
use anyhow::Result;
use bluer::adv::Advertisement;
use bluer::gatt::local::{
    Application, Characteristic, CharacteristicNotify, CharacteristicNotifyMethod,
    CharacteristicRead, CharacteristicWrite, CharacteristicWriteMethod, Service,
};
use bluer::gatt::local::ReqError;
use futures::future::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub struct ServerConfig {
    /// Adapter to serve on; `None` uses the default adapter.
    pub adapter: Option<String>,
    /// Name carried in the advertisement.
    pub local_name: String,
    /// Time to keep serving after a shutdown request.
    pub grace_period: Duration,
}

/// Serves the reading cache over GATT until `shutdown` resolves, then
/// waits out the grace period and tears the registration down.
pub async fn serve(
    ctx: Arc<GattContext>,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let session = bluer::Session::new().await?;
    let adapter = match &config.adapter {
        Some(name) => session.adapter(name)?,
        None => session.default_adapter().await?,
    };
    adapter.set_powered(true).await?;
    info!(
        adapter = adapter.name(),
        address = %adapter.address().await?,
        "serving GATT application"
    );

    let advertisement = Advertisement {
        advertisement_type: bluer::adv::Type::Peripheral,
        service_uuids: vec![SERVICE_UUID].into_iter().collect(),
        discoverable: Some(true),
        local_name: Some(config.local_name.clone()),
        ..Default::default()
    };
    let adv_handle = adapter.advertise(advertisement).await?;
    let app_handle = adapter
        .serve_gatt_application(build_application(ctx))
        .await?;
    info!(name = %config.local_name, service = %SERVICE_UUID, "advertising");

    shutdown.await;

    info!(grace_secs = config.grace_period.as_secs(), "shutting down");
    tokio::time::sleep(config.grace_period).await;
    drop(app_handle);
    drop(adv_handle);
    Ok(())
}

fn build_application(ctx: Arc<GattContext>) -> Application {
    Application {
        services: vec![Service {
            uuid: SERVICE_UUID,
            primary: true,
            characteristics: vec![
                request_characteristic(ctx.clone()),
                count_characteristic(ctx),
            ],
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Request/response characteristic: readable, writable, indicatable.
fn request_characteristic(ctx: Arc<GattContext>) -> Characteristic {
    let write_ctx = ctx.clone();
    Characteristic {
        uuid: READING_REQUEST_CHAR_UUID,
        read: Some(characteristic_read(ctx, READING_REQUEST_CHAR_UUID)),
        write: Some(CharacteristicWrite {
            write: true,
            method: CharacteristicWriteMethod::Fun(Box::new(move |new_value, req| {
                let ctx = write_ctx.clone();
                async move {
                    debug!(from = %req.device_address, len = new_value.len(), "characteristic write");
                    ctx.write_request(READING_REQUEST_CHAR_UUID, &new_value);
                    Ok(())
                }
                .boxed()
            })),
            ..Default::default()
        }),
        notify: Some(indicate_only()),
        ..Default::default()
    }
}

/// Count characteristic: readable, indicatable.
fn count_characteristic(ctx: Arc<GattContext>) -> Characteristic {
    Characteristic {
        uuid: READING_COUNT_CHAR_UUID,
        read: Some(characteristic_read(ctx, READING_COUNT_CHAR_UUID)),
        notify: Some(indicate_only()),
        ..Default::default()
    }
}

fn characteristic_read(ctx: Arc<GattContext>, uuid: Uuid) -> CharacteristicRead {
    CharacteristicRead {
        read: true,
        fun: Box::new(move |req| {
            let ctx = ctx.clone();
            async move {
                let value = ctx.read_request(uuid);
                // BlueZ issues offset reads for values beyond the MTU.
                let offset = req.offset as usize;
                if offset > value.len() {
                    return Err(ReqError::InvalidOffset);
                }
                debug!(from = %req.device_address, offset, len = value.len(), "characteristic read");
                Ok(value[offset..].to_vec())
            }
            .boxed()
        }),
        ..Default::default()
    }
}

fn indicate_only() -> CharacteristicNotify {
    CharacteristicNotify {
        indicate: true,
        method: CharacteristicNotifyMethod::Fun(Box::new(move |notifier| {
            async move {
                debug!("indication session opened; no indications are sent");
                drop(notifier);
            }
            .boxed()
        })),
        ..Default::default()
    }
}
