//! Wire protocol served over GATT.
//!
//! One primary service with two characteristics:
//!
//! - the *count* characteristic always reads as the cache length,
//!   8 bytes little-endian unsigned;
//! - the *request/response* characteristic takes a write whose first
//!   byte is a reading index and answers the follow-up read with a JSON
//!   record, or a zero-length value when the index is out of range.
//!
//! There is no correlation token between a write and the next read; a
//! central issuing overlapping write/read pairs can see a stale
//! response. That limitation is part of the protocol.

use crate::domain::models::{Reading, Unit};
use tracing::error;
use uuid::Uuid;

/// Primary service holding both characteristics.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0xa07498ca_ad5b_474e_940d_16f1fbe7e8cd);

/// Request/response characteristic: write an index, read the record back.
pub const READING_REQUEST_CHAR_UUID: Uuid = Uuid::from_u128(0x51ff12bb_3ed8_46e5_b4f9_d64e2fec021b);

/// Reading count characteristic.
pub const READING_COUNT_CHAR_UUID: Uuid = Uuid::from_u128(0xbfc0c92f_317d_4ba9_976b_cc11ce77b4ca);

/// Encodes the cache length as the count characteristic's value.
pub fn encode_reading_count(count: usize) -> [u8; 8] {
    (count as u64).to_le_bytes()
}

/// Index requested by a write to the request/response characteristic.
///
/// Only the first byte is significant; an empty write carries no index.
pub fn requested_index(value: &[u8]) -> Option<usize> {
    value.first().map(|&byte| byte as usize)
}

/// Serializes a reading as the UTF-8 JSON response body.
pub fn encode_reading(reading: &Reading, unit: Unit) -> Vec<u8> {
    match serde_json::to_vec(&reading.to_record(unit)) {
        Ok(bytes) => bytes,
        // A record of plain strings and numbers cannot fail to
        // serialize; answer with an empty value if it somehow does.
        Err(err) => {
            error!(%err, "failed to serialize reading");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Meal, MeasurementMethod};
    use chrono::NaiveDate;

    #[test]
    fn count_is_eight_bytes_little_endian() {
        assert_eq!(encode_reading_count(3), [3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode_reading_count(0), [0; 8]);
        assert_eq!(
            encode_reading_count(0x0102_0304),
            [0x04, 0x03, 0x02, 0x01, 0, 0, 0, 0]
        );
    }

    #[test]
    fn index_comes_from_the_first_byte() {
        assert_eq!(requested_index(&[0x05]), Some(5));
        assert_eq!(requested_index(&[0x01, 0xff, 0xff]), Some(1));
        assert_eq!(requested_index(&[]), None);
        assert_eq!(requested_index(&[0xff]), Some(255));
    }

    #[test]
    fn encoded_reading_is_utf8_json_with_fixed_keys() {
        let reading = Reading {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 11)
                .unwrap()
                .and_hms_opt(7, 30, 0)
                .unwrap(),
            value_mgdl: 90.0,
            meal: Meal::Before,
            comment: String::new(),
            measure_method: MeasurementMethod::BloodSample,
            extra_data: serde_json::Map::new(),
        };
        let bytes = encode_reading(&reading, Unit::MmolL);
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["time"], "2024-03-11T07:30:00");
        assert_eq!(json["value"], 5.0);
        assert_eq!(json["meal"], "Before Meal");
        assert_eq!(json["measure_method"], "blood sample");
        assert_eq!(json["comment"], "");
        assert!(json["extra_data"].as_object().unwrap().is_empty());
    }
}
