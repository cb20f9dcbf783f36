//! The JSON settings file: the local device's network settings and the
//! things to poll.
//!
//! ```json
//! {
//!   "config": { "objectName": "Betelgeuse", "address": "192.168.0.10/24",
//!               "objectIdentifier": 599, "maxApduLengthAccepted": 1024,
//!               "segmentationSupported": "segmentedBoth", "vendorIdentifier": 15 },
//!   "dweets": [
//!     { "thingName": "lobby", "interval": 60, "tagList": [
//!         { "address": "192.168.0.20", "objectType": "analogInput",
//!           "objectInstance": 1, "tag": "temp", "decnum": 1 } ] }
//!   ]
//! }
//! ```

use crate::{DisplayValue, Point, SettingsError, Thing};
use bacdweet_core::lookup_datatype;
use bacdweet_core::types::{ObjectId, ObjectType, PropertyId};
use bacdweet_datalink::DataLinkAddress;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const SEGMENTATION: [&str; 4] = [
    "segmentedBoth",
    "segmentedTransmit",
    "segmentedReceive",
    "noSegmentation",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    pub config: DeviceSettings,
    #[serde(default)]
    pub dweets: Vec<ThingSettings>,
}

/// How this process appears on the BACnet network.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeviceSettings {
    pub object_name: String,
    /// Local interface address, `host[/prefix][:port]`.
    pub address: String,
    pub object_identifier: u32,
    #[serde(default = "default_max_apdu")]
    pub max_apdu_length_accepted: u16,
    #[serde(default)]
    pub segmentation_supported: Option<String>,
    pub vendor_identifier: u16,
    #[serde(rename = "foreignBBMD", default)]
    pub foreign_bbmd: Option<String>,
    #[serde(rename = "foreignTTL", default)]
    pub foreign_ttl: Option<u16>,
}

fn default_max_apdu() -> u16 {
    1024
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThingSettings {
    pub thing_name: String,
    /// Seconds.
    pub interval: u64,
    pub tag_list: Vec<PointSettings>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PointSettings {
    pub address: String,
    pub object_type: Identifier,
    pub object_instance: u32,
    /// Defaults to `presentValue`.
    #[serde(default)]
    pub property: Option<Identifier>,
    #[serde(default)]
    pub array_index: Option<u32>,
    pub tag: String,
    #[serde(default)]
    pub active: Option<DisplayValue>,
    #[serde(default)]
    pub inactive: Option<DisplayValue>,
    #[serde(default)]
    pub decnum: Option<u8>,
}

/// An object type or property given by name or by number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(u32),
    Name(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        text.parse()
    }

    /// Validates every thing, failing on the first problem found.
    pub fn things(&self) -> Result<Vec<Thing>, SettingsError> {
        self.dweets
            .iter()
            .enumerate()
            .map(|(index, thing)| thing.validate(index))
            .collect()
    }
}

impl FromStr for Settings {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl DeviceSettings {
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        parse_device_address(&self.address)
    }

    /// BBMD address and time-to-live when registering as a foreign device.
    pub fn foreign_registration(&self) -> Result<Option<(SocketAddr, u16)>, SettingsError> {
        let Some(bbmd) = &self.foreign_bbmd else {
            return Ok(None);
        };
        let ttl = self.foreign_ttl.unwrap_or(30);
        if ttl == 0 {
            return Err(SettingsError::ZeroForeignTtl);
        }
        Ok(Some((parse_device_address(bbmd)?, ttl)))
    }

    pub fn check(&self) -> Result<(), SettingsError> {
        self.bind_address()?;
        self.foreign_registration()?;
        match &self.segmentation_supported {
            Some(value) if !SEGMENTATION.contains(&value.as_str()) => {
                Err(SettingsError::UnknownSegmentation(value.clone()))
            }
            _ => Ok(()),
        }
    }
}

fn parse_device_address(value: &str) -> Result<SocketAddr, SettingsError> {
    value
        .parse::<DataLinkAddress>()
        .map(DataLinkAddress::as_socket_addr)
        .map_err(|source| SettingsError::DeviceAddress {
            value: value.to_owned(),
            source,
        })
}

impl ThingSettings {
    fn validate(&self, index: usize) -> Result<Thing, SettingsError> {
        let name = self.thing_name.trim();
        if name.is_empty() {
            return Err(SettingsError::EmptyThingName { index });
        }
        if self.interval == 0 {
            return Err(SettingsError::ZeroInterval {
                thing: name.to_owned(),
            });
        }

        let mut seen = HashSet::new();
        let mut points = Vec::with_capacity(self.tag_list.len());
        for point in &self.tag_list {
            if point.tag.is_empty() {
                return Err(SettingsError::EmptyTag {
                    thing: name.to_owned(),
                });
            }
            if !seen.insert(point.tag.as_str()) {
                return Err(SettingsError::DuplicateTag {
                    thing: name.to_owned(),
                    tag: point.tag.clone(),
                });
            }
            points.push(point.validate(name)?);
        }

        Ok(Thing {
            name: name.to_owned(),
            interval: Duration::from_secs(self.interval),
            points,
        })
    }
}

impl PointSettings {
    fn validate(&self, thing: &str) -> Result<Point, SettingsError> {
        let thing = thing.to_owned();
        let tag = self.tag.clone();

        let address = match self.address.parse::<DataLinkAddress>() {
            Ok(address) => address,
            Err(source) => return Err(SettingsError::PointAddress { thing, tag, source }),
        };

        let object_type = match &self.object_type {
            Identifier::Number(n) => u16::try_from(*n)
                .ok()
                .filter(|n| *n <= 0x3FF)
                .map(ObjectType::from_u16),
            Identifier::Name(name) => ObjectType::from_name(name),
        };
        let Some(object_type) = object_type else {
            let value = self.object_type.to_string();
            return Err(SettingsError::UnknownObjectType { thing, tag, value });
        };
        if self.object_instance > ObjectId::MAX_INSTANCE {
            let instance = self.object_instance;
            return Err(SettingsError::InstanceOutOfRange {
                thing,
                tag,
                instance,
            });
        }

        let property_id = match &self.property {
            None => Some(PropertyId::PresentValue),
            Some(Identifier::Number(n)) => Some(PropertyId::from_u32(*n)),
            Some(Identifier::Name(name)) => PropertyId::from_name(name),
        };
        let Some(property_id) = property_id else {
            let value = self.property.as_ref().map(Identifier::to_string).unwrap_or_default();
            return Err(SettingsError::UnknownProperty { thing, tag, value });
        };

        let Some(datatype) = lookup_datatype(object_type, property_id) else {
            return Err(SettingsError::UnknownDatatype {
                thing,
                tag,
                object_type,
                property_id,
            });
        };
        if self.array_index.is_some() && !datatype.is_array() {
            return Err(SettingsError::IndexOnScalar {
                thing,
                tag,
                property_id,
            });
        }

        Ok(Point {
            address,
            object_id: ObjectId::new(object_type, self.object_instance),
            property_id,
            array_index: self.array_index,
            tag,
            active_label: self.active.clone(),
            inactive_label: self.inactive.clone(),
            precision: self.decnum,
        })
    }
}
