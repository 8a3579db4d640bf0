//! Characteristic read/write handlers.
//!
//! All state the callbacks touch lives in one [`GattContext`] built at
//! startup: the immutable reading cache plus a stored-value slot per
//! characteristic. The GATT server dispatches every characteristic
//! access here.

use crate::domain::cache::ReadingCache;
use crate::domain::models::Unit;
use crate::infrastructure::gatt::protocol;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Shared state behind the two characteristics.
pub struct GattContext {
    cache: ReadingCache,
    unit: Unit,
    request_slot: Mutex<Vec<u8>>,
    count_slot: Mutex<Vec<u8>>,
}

impl GattContext {
    pub fn new(cache: ReadingCache, unit: Unit) -> Self {
        Self {
            cache,
            unit,
            request_slot: Mutex::new(Vec::new()),
            count_slot: Mutex::new(Vec::new()),
        }
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.cache
    }

    /// Answers a characteristic read.
    ///
    /// The count characteristic always reports the cache length,
    /// regardless of anything stored on it; every other characteristic
    /// echoes its stored value unchanged. There is no error path.
    pub fn read_request(&self, char_uuid: Uuid) -> Vec<u8> {
        debug!(characteristic = %char_uuid, "read request");
        if char_uuid == protocol::READING_COUNT_CHAR_UUID {
            return protocol::encode_reading_count(self.cache.len()).to_vec();
        }
        self.slot(char_uuid)
            .map(|slot| slot.lock().expect("slot poisoned").clone())
            .unwrap_or_default()
    }

    /// Handles a characteristic write.
    ///
    /// The raw value is stored verbatim first. A write to the
    /// request/response characteristic is then interpreted: byte 0 is a
    /// reading index, and the slot is overwritten with either the JSON
    /// serialization of that reading or, when the index is out of range
    /// (or the write was empty), a zero-length value.
    pub fn write_request(&self, char_uuid: Uuid, value: &[u8]) {
        debug!(characteristic = %char_uuid, len = value.len(), "write request");
        let Some(slot) = self.slot(char_uuid) else {
            return;
        };
        let mut stored = slot.lock().expect("slot poisoned");
        *stored = value.to_vec();

        if char_uuid != protocol::READING_REQUEST_CHAR_UUID {
            return;
        }
        *stored = match protocol::requested_index(value) {
            Some(index) if index < self.cache.len() => {
                let reading = self.cache.get(index).expect("index bounds checked");
                protocol::encode_reading(reading, self.unit)
            }
            _ => Vec::new(),
        };
    }

    fn slot(&self, char_uuid: Uuid) -> Option<&Mutex<Vec<u8>>> {
        if char_uuid == protocol::READING_REQUEST_CHAR_UUID {
            Some(&self.request_slot)
        } else if char_uuid == protocol::READING_COUNT_CHAR_UUID {
            Some(&self.count_slot)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Meal, MeasurementMethod, Reading};
    use crate::infrastructure::gatt::protocol::{
        READING_COUNT_CHAR_UUID, READING_REQUEST_CHAR_UUID,
    };
    use chrono::NaiveDate;

    fn reading(hour: u32, value: f64) -> Reading {
        Reading {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 11)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            value_mgdl: value,
            meal: Meal::None,
            comment: String::new(),
            measure_method: MeasurementMethod::BloodSample,
            extra_data: serde_json::Map::new(),
        }
    }

    fn context_with_three_readings() -> GattContext {
        let cache = ReadingCache::new(vec![
            reading(7, 92.0),
            reading(12, 141.0),
            reading(19, 110.0),
        ]);
        GattContext::new(cache, Unit::MgDl)
    }

    #[test]
    fn count_read_is_eight_le_bytes() {
        let ctx = context_with_three_readings();
        assert_eq!(
            ctx.read_request(READING_COUNT_CHAR_UUID),
            vec![3, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn valid_index_write_yields_that_reading() {
        let ctx = context_with_three_readings();
        ctx.write_request(READING_REQUEST_CHAR_UUID, &[0x01]);
        let response = ctx.read_request(READING_REQUEST_CHAR_UUID);
        let json: serde_json::Value = serde_json::from_slice(&response).unwrap();
        assert_eq!(json["value"], 141.0);
        assert_eq!(json["time"], "2024-03-11T12:00:00");
    }

    #[test]
    fn out_of_range_index_reads_back_empty() {
        let ctx = context_with_three_readings();
        ctx.write_request(READING_REQUEST_CHAR_UUID, &[0x05]);
        assert!(ctx.read_request(READING_REQUEST_CHAR_UUID).is_empty());

        ctx.write_request(READING_REQUEST_CHAR_UUID, &[0xff]);
        assert!(ctx.read_request(READING_REQUEST_CHAR_UUID).is_empty());
    }

    #[test]
    fn empty_write_reads_back_empty() {
        let ctx = context_with_three_readings();
        ctx.write_request(READING_REQUEST_CHAR_UUID, &[]);
        assert!(ctx.read_request(READING_REQUEST_CHAR_UUID).is_empty());
    }

    #[test]
    fn count_is_unaffected_by_writes() {
        let ctx = context_with_three_readings();
        let before = ctx.read_request(READING_COUNT_CHAR_UUID);
        ctx.write_request(READING_REQUEST_CHAR_UUID, &[0x02]);
        ctx.write_request(READING_COUNT_CHAR_UUID, &[0x69]);
        let after = ctx.read_request(READING_COUNT_CHAR_UUID);
        assert_eq!(before, after);
        assert_eq!(after, vec![3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn every_valid_index_round_trips() {
        let ctx = context_with_three_readings();
        for index in 0..ctx.cache().len() {
            ctx.write_request(READING_REQUEST_CHAR_UUID, &[index as u8]);
            let response = ctx.read_request(READING_REQUEST_CHAR_UUID);
            let json: serde_json::Value = serde_json::from_slice(&response).unwrap();
            let expected = ctx.cache().get(index).unwrap();
            assert_eq!(json["value"], expected.value_mgdl);
        }
    }

    #[test]
    fn unknown_characteristic_reads_back_empty() {
        let ctx = context_with_three_readings();
        let other = Uuid::from_u128(0xdead_beef);
        ctx.write_request(other, &[0x01, 0x02]);
        assert!(ctx.read_request(other).is_empty());
    }

    #[test]
    fn empty_cache_rejects_index_zero() {
        let ctx = GattContext::new(ReadingCache::new(Vec::new()), Unit::MgDl);
        assert_eq!(
            ctx.read_request(READING_COUNT_CHAR_UUID),
            vec![0, 0, 0, 0, 0, 0, 0, 0]
        );
        ctx.write_request(READING_REQUEST_CHAR_UUID, &[0x00]);
        assert!(ctx.read_request(READING_REQUEST_CHAR_UUID).is_empty());
    }
}
