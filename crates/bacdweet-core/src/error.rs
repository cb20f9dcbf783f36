use core::fmt;
use crate::types::{ObjectType, PropertyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall,
    ValueOutOfRange,
    InvalidLength,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => f.write_str("buffer too small"),
            Self::ValueOutOfRange => f.write_str("value out of range"),
            Self::InvalidLength => f.write_str("invalid length"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    Unsupported,
    /// The encoded value carries a different application tag than the
    /// property's declared datatype calls for.
    DatatypeMismatch,
    /// Bytes were left over after the value was decoded.
    TrailingData,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::InvalidTag => f.write_str("invalid tag"),
            Self::InvalidLength => f.write_str("invalid length"),
            Self::InvalidValue => f.write_str("invalid value"),
            Self::Unsupported => f.write_str("operation unsupported"),
            Self::DatatypeMismatch => f.write_str("value does not match declared datatype"),
            Self::TrailingData => f.write_str("trailing data after value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Failure to turn a ReadProperty response into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueError {
    /// The datatype schema has no entry for the pair.
    UnknownDatatype {
        object_type: ObjectType,
        property_id: PropertyId,
    },
    Decode(DecodeError),
}

impl From<DecodeError> for ValueError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDatatype {
                object_type,
                property_id,
            } => write!(
                f,
                "no datatype known for property {} of object type {}",
                property_id.to_u32(),
                object_type.to_u16()
            ),
            Self::Decode(err) => write!(f, "value decode failed: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::UnknownDatatype { .. } => None,
        }
    }
}
