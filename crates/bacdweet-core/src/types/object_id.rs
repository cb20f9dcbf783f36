use crate::types::ObjectType;
use core::fmt;

/// A packed BACnet object identifier combining an [`ObjectType`] and a 22-bit
/// instance number into a single `u32`.
///
/// The upper 10 bits encode the object type and the lower 22 bits encode the
/// instance number, matching the BACnet wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const MAX_INSTANCE: u32 = 0x3F_FFFF;

    /// Creates an `ObjectId` from a type and instance number.
    pub fn new(object_type: ObjectType, instance: u32) -> Self {
        Self(((u32::from(object_type.to_u16()) & 0x03FF) << 22) | (instance & Self::MAX_INSTANCE))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn object_type(self) -> ObjectType {
        ObjectType::from_u16(((self.0 >> 22) & 0x03FF) as u16)
    }

    pub const fn instance(self) -> u32 {
        self.0 & Self::MAX_INSTANCE
    }
}

/// `analogInput:1`, or `134:7` for proprietary types.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let object_type = self.object_type();
        match object_type.name() {
            Some(name) => write!(f, "{name}:{}", self.instance()),
            None => write!(f, "{}:{}", object_type.to_u16(), self.instance()),
        }
    }
}
