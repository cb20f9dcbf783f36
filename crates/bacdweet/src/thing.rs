use crate::DisplayValue;
use bacdweet_client::ReadRequest;
use bacdweet_core::types::{ObjectId, PropertyId};
use bacdweet_datalink::DataLinkAddress;
use std::time::Duration;

/// A named group of points polled together and forwarded as one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub name: String,
    /// Always non-zero; wake-ups land on multiples of it since the epoch.
    pub interval: Duration,
    /// Document key order follows this order.
    pub points: Vec<Point>,
}

/// One property to read and how to present its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub address: DataLinkAddress,
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub tag: String,
    /// Replaces a decoded `"active"`.
    pub active_label: Option<DisplayValue>,
    /// Replaces a decoded `"inactive"`.
    pub inactive_label: Option<DisplayValue>,
    /// Decimal places kept on floating point values.
    pub precision: Option<u8>,
}

impl Point {
    pub fn read_request(&self) -> ReadRequest {
        ReadRequest {
            address: self.address,
            object_id: self.object_id,
            property_id: self.property_id,
            array_index: self.array_index,
        }
    }
}
