use bacdweet_core::types::{ObjectType, PropertyId};
use bacdweet_datalink::AddressParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Settings that cannot be loaded or do not describe a valid set of things.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("device address {value:?}: {source}")]
    DeviceAddress {
        value: String,
        #[source]
        source: AddressParseError,
    },
    #[error("foreignTTL must be greater than zero")]
    ZeroForeignTtl,
    #[error("unknown segmentationSupported value {0:?}")]
    UnknownSegmentation(String),
    #[error("thing #{index} has no name")]
    EmptyThingName { index: usize },
    #[error("thing {thing:?}: interval must be greater than zero")]
    ZeroInterval { thing: String },
    #[error("thing {thing:?}: a point has an empty tag")]
    EmptyTag { thing: String },
    #[error("thing {thing:?}: tag {tag:?} is used more than once")]
    DuplicateTag { thing: String, tag: String },
    #[error("thing {thing:?}, tag {tag:?}: {source}")]
    PointAddress {
        thing: String,
        tag: String,
        #[source]
        source: AddressParseError,
    },
    #[error("thing {thing:?}, tag {tag:?}: unknown object type {value}")]
    UnknownObjectType {
        thing: String,
        tag: String,
        value: String,
    },
    #[error("thing {thing:?}, tag {tag:?}: unknown property {value}")]
    UnknownProperty {
        thing: String,
        tag: String,
        value: String,
    },
    #[error("thing {thing:?}, tag {tag:?}: object instance {instance} out of range")]
    InstanceOutOfRange {
        thing: String,
        tag: String,
        instance: u32,
    },
    #[error("thing {thing:?}, tag {tag:?}: no datatype known for {object_type:?} {property_id:?}")]
    UnknownDatatype {
        thing: String,
        tag: String,
        object_type: ObjectType,
        property_id: PropertyId,
    },
    #[error("thing {thing:?}, tag {tag:?}: {property_id:?} is not an array")]
    IndexOnScalar {
        thing: String,
        tag: String,
        property_id: PropertyId,
    },
}

/// Stops a thing's scheduler; the configuration does not match what the
/// device answers with.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("no datatype known for {object_type:?} property {property_id:?}")]
    UnknownDatatype {
        object_type: ObjectType,
        property_id: PropertyId,
    },
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sink answered {0}")]
    Status(reqwest::StatusCode),
    #[error("cannot serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}
