//! BACnet property-read codec and typed value decoding.
//!
//! `bacdweet-core` holds the protocol-level pieces the poller needs and nothing
//! more: the tag and primitive encoders, the NPDU and confirmed-service APDU
//! headers, the ReadProperty service, and the datatype schema that tells the
//! decoder how to interpret a property's raw encoded value.
//!
//! # Feature flags
//!
//! - **`std`** (default): enables `std::error::Error` implementations.
//! - **`alloc`** (default): enables the [`value`] decoder, which allocates
//!   strings and arrays.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Confirmed-service request header and the response PDUs that resolve it.
pub mod apdu;
/// Datatype descriptors and the (object type, property) schema lookup.
pub mod datatype;
/// Binary encoding primitives, tag system, and zero-copy reader/writer.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// NPDU (Network Protocol Data Unit) encoding and decoding.
pub mod npdu;
/// BACnet service request and response codecs.
pub mod services;
/// Object types, object identifiers, property identifiers, and enumerations.
pub mod types;
/// Datatype-driven decoding of raw property values.
#[cfg(feature = "alloc")]
pub mod value;

pub use datatype::{lookup_datatype, Datatype};
pub use error::{DecodeError, EncodeError, ValueError};
