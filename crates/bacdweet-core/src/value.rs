use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::datatype::{lookup_datatype, Datatype};
use crate::encoding::{
    primitives::{decode_signed, decode_unsigned},
    reader::Reader,
    tag::{AppTag, Tag},
};
use crate::types::{Date, ObjectId, ObjectType, PropertyId, Time};
use crate::{DecodeError, ValueError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    pub unused_bits: u8,
    pub data: Vec<u8>,
}

impl BitString {
    pub fn len(&self) -> usize {
        (self.data.len() * 8).saturating_sub(usize::from(self.unused_bits))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit `index`, counted from the most significant bit of the first octet.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len() {
            return None;
        }
        Some(self.data[index / 8] & (0x80 >> (index % 8)) != 0)
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    BitString(BitString),
    /// Enumerated member; `name` is set when the enumeration is known.
    Enumerated {
        value: u32,
        name: Option<&'static str>,
    },
    Date(Date),
    Time(Time),
    ObjectId(ObjectId),
    Array(Vec<Value>),
}

/// Flat text rendering used when a value has no JSON scalar form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Signed(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::OctetString(bytes) => bytes.iter().try_for_each(|b| write!(f, "{b:02x}")),
            Self::CharacterString(s) => f.write_str(s),
            Self::BitString(bits) => (0..bits.len()).try_for_each(|i| {
                f.write_str(if bits.get(i) == Some(true) { "1" } else { "0" })
            }),
            Self::Enumerated { name: Some(name), .. } => f.write_str(name),
            Self::Enumerated { value, name: None } => write!(f, "{value}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::ObjectId(id) => write!(f, "{id}"),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decodes the raw `propertyValue` contents of a ReadProperty ack.
///
/// Array datatypes honour `array_index`: index 0 is the element count and
/// always decodes as an unsigned, any other index decodes as the element
/// type, and no index decodes the whole array.
pub fn decode_value(
    datatype: &Datatype,
    raw: &[u8],
    array_index: Option<u32>,
) -> Result<Value, DecodeError> {
    let mut r = Reader::new(raw);
    let value = match (datatype, array_index) {
        (Datatype::Array(_), Some(0)) => decode_one(&mut r, &Datatype::Unsigned)?,
        (Datatype::Array(element), Some(_)) => decode_one(&mut r, element)?,
        (Datatype::Array(element), None) => {
            let mut items = Vec::new();
            while !r.is_empty() {
                items.push(decode_one(&mut r, element)?);
            }
            Value::Array(items)
        }
        (other, _) => decode_one(&mut r, other)?,
    };
    if !r.is_empty() {
        return Err(DecodeError::TrailingData);
    }
    Ok(value)
}

/// Looks up the datatype of the pair and decodes `raw` with it.
pub fn decode_property(
    object_type: ObjectType,
    property_id: PropertyId,
    raw: &[u8],
    array_index: Option<u32>,
) -> Result<Value, ValueError> {
    let datatype = lookup_datatype(object_type, property_id).ok_or(ValueError::UnknownDatatype {
        object_type,
        property_id,
    })?;
    Ok(decode_value(&datatype, raw, array_index)?)
}

fn expected_tag(datatype: &Datatype) -> Option<AppTag> {
    Some(match datatype {
        Datatype::Null => AppTag::Null,
        Datatype::Boolean => AppTag::Boolean,
        Datatype::Unsigned => AppTag::UnsignedInt,
        Datatype::Signed => AppTag::SignedInt,
        Datatype::Real => AppTag::Real,
        Datatype::Double => AppTag::Double,
        Datatype::OctetString => AppTag::OctetString,
        Datatype::CharacterString => AppTag::CharacterString,
        Datatype::BitString => AppTag::BitString,
        Datatype::Enumerated(_) => AppTag::Enumerated,
        Datatype::Date => AppTag::Date,
        Datatype::Time => AppTag::Time,
        Datatype::ObjectId => AppTag::ObjectId,
        Datatype::Any | Datatype::Array(_) => return None,
    })
}

fn decode_one(r: &mut Reader<'_>, datatype: &Datatype) -> Result<Value, DecodeError> {
    let (tag, len) = match Tag::decode(r)? {
        Tag::Application { tag, len } => (tag, len as usize),
        _ => return Err(DecodeError::InvalidTag),
    };
    match (datatype, expected_tag(datatype)) {
        (Datatype::Array(_), _) => return Err(DecodeError::Unsupported),
        (_, Some(expected)) if expected != tag => return Err(DecodeError::DatatypeMismatch),
        _ => {}
    }

    Ok(match tag {
        AppTag::Null => Value::Null,
        // boolean content lives in the length field
        AppTag::Boolean => match len {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            _ => return Err(DecodeError::InvalidValue),
        },
        AppTag::UnsignedInt => Value::Unsigned(decode_unsigned(r, len)?),
        AppTag::SignedInt => Value::Signed(decode_signed(r, len)?),
        AppTag::Real => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Value::Real(f32::from_bits(r.read_be_u32()?))
        }
        AppTag::Double => {
            if len != 8 {
                return Err(DecodeError::InvalidLength);
            }
            Value::Double(f64::from_bits(r.read_be_u64()?))
        }
        AppTag::OctetString => Value::OctetString(r.read_exact(len)?.to_vec()),
        AppTag::CharacterString => Value::CharacterString(decode_character_string(r, len)?),
        AppTag::BitString => {
            if len == 0 {
                return Err(DecodeError::InvalidLength);
            }
            let unused_bits = r.read_u8()?;
            if unused_bits > 7 {
                return Err(DecodeError::InvalidValue);
            }
            Value::BitString(BitString {
                unused_bits,
                data: r.read_exact(len - 1)?.to_vec(),
            })
        }
        AppTag::Enumerated => {
            let value = decode_unsigned(r, len)?;
            let name = match datatype {
                Datatype::Enumerated(enumeration) => enumeration.name(value),
                _ => None,
            };
            Value::Enumerated { value, name }
        }
        AppTag::Date => {
            let b = fixed4(r, len)?;
            Value::Date(Date {
                year_since_1900: b[0],
                month: b[1],
                day: b[2],
                weekday: b[3],
            })
        }
        AppTag::Time => {
            let b = fixed4(r, len)?;
            Value::Time(Time {
                hour: b[0],
                minute: b[1],
                second: b[2],
                hundredths: b[3],
            })
        }
        AppTag::ObjectId => {
            if len != 4 {
                return Err(DecodeError::InvalidLength);
            }
            Value::ObjectId(ObjectId::from_raw(r.read_be_u32()?))
        }
    })
}

fn fixed4<'a>(r: &mut Reader<'a>, len: usize) -> Result<&'a [u8], DecodeError> {
    if len != 4 {
        return Err(DecodeError::InvalidLength);
    }
    r.read_exact(4)
}

const CHARSET_UTF8: u8 = 0;
const CHARSET_UCS2: u8 = 4;
const CHARSET_ISO_8859_1: u8 = 5;

fn decode_character_string(r: &mut Reader<'_>, len: usize) -> Result<String, DecodeError> {
    if len == 0 {
        return Err(DecodeError::InvalidLength);
    }
    let charset = r.read_u8()?;
    let bytes = r.read_exact(len - 1)?;
    match charset {
        CHARSET_UTF8 => String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidValue),
        CHARSET_ISO_8859_1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        CHARSET_UCS2 => {
            if bytes.len() % 2 != 0 {
                return Err(DecodeError::InvalidLength);
            }
            let units = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
            char::decode_utf16(units)
                .collect::<Result<String, _>>()
                .map_err(|_| DecodeError::InvalidValue)
        }
        _ => Err(DecodeError::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_property, decode_value, BitString, Value};
    use crate::datatype::Datatype;
    use crate::types::{Enumeration, ObjectId, ObjectType, PropertyId};
    use crate::{DecodeError, ValueError};
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn real_present_value() {
        let raw = [0x44, 0x41, 0xAF, 0xAE, 0x14];
        assert_eq!(
            decode_value(&Datatype::Real, &raw, None).unwrap(),
            Value::Real(21.96)
        );
    }

    #[test]
    fn array_index_zero_is_the_length() {
        let raw = [0x21, 0x03];
        assert_eq!(
            decode_value(&Datatype::Array(&Datatype::CharacterString), &raw, Some(0)).unwrap(),
            Value::Unsigned(3)
        );
    }

    #[test]
    fn array_index_uses_element_type() {
        let raw = [0x75, 0x04, 0x00, b'O', b'f', b'f'];
        assert_eq!(
            decode_value(&Datatype::Array(&Datatype::CharacterString), &raw, Some(2)).unwrap(),
            Value::CharacterString("Off".into())
        );
    }

    #[test]
    fn whole_array_without_index() {
        let raw = [0xC4, 0x02, 0x00, 0x00, 0x7B, 0xC4, 0x00, 0x00, 0x00, 0x01];
        let value = decode_value(&Datatype::Array(&Datatype::ObjectId), &raw, None).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::ObjectId(ObjectId::new(ObjectType::Device, 123)),
                Value::ObjectId(ObjectId::new(ObjectType::AnalogInput, 1)),
            ])
        );
        assert_eq!(value.to_string(), "device:123,analogInput:1");
    }

    #[test]
    fn priority_array_slots_accept_any_tag() {
        let raw = [0x00, 0x44, 0x42, 0xC8, 0x00, 0x00];
        let value = decode_value(&Datatype::Array(&Datatype::Any), &raw, None).unwrap();
        assert_eq!(value.to_string(), "null,100");
    }

    #[test]
    fn enumerated_carries_known_name() {
        let datatype = Datatype::Enumerated(Enumeration::BinaryPv);
        assert_eq!(
            decode_value(&datatype, &[0x91, 0x01], None).unwrap(),
            Value::Enumerated {
                value: 1,
                name: Some("active"),
            }
        );
    }

    #[test]
    fn mismatched_tag_is_rejected() {
        assert_eq!(
            decode_value(&Datatype::Real, &[0x21, 0x05], None).unwrap_err(),
            DecodeError::DatatypeMismatch
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        assert_eq!(
            decode_value(&Datatype::Unsigned, &[0x21, 0x05, 0x00], None).unwrap_err(),
            DecodeError::TrailingData
        );
    }

    #[test]
    fn status_flags_render_as_bits() {
        let value = decode_value(&Datatype::BitString, &[0x82, 0x04, 0x40], None).unwrap();
        assert_eq!(
            value,
            Value::BitString(BitString {
                unused_bits: 4,
                data: vec![0x40],
            })
        );
        assert_eq!(value.to_string(), "0100");
    }

    #[test]
    fn boolean_lives_in_length_bits() {
        assert_eq!(
            decode_value(&Datatype::Boolean, &[0x11], None).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn latin1_and_ucs2_strings() {
        let latin1 = [0x73, 0x05, 0xB0, b'C'];
        assert_eq!(
            decode_value(&Datatype::CharacterString, &latin1, None).unwrap(),
            Value::CharacterString("\u{b0}C".into())
        );
        let ucs2 = [0x75, 0x05, 0x04, 0x00, b'h', 0x00, b'i'];
        assert_eq!(
            decode_value(&Datatype::CharacterString, &ucs2, None).unwrap(),
            Value::CharacterString("hi".into())
        );
    }

    #[test]
    fn octet_string_renders_hex() {
        let value = decode_value(&Datatype::OctetString, &[0x62, 0xC0, 0xA8], None).unwrap();
        assert_eq!(value.to_string(), "c0a8");
    }

    #[test]
    fn unknown_pair_is_reported() {
        assert_eq!(
            decode_property(ObjectType::Calendar, PropertyId::PresentValue, &[0x10], None)
                .unwrap_err(),
            ValueError::UnknownDatatype {
                object_type: ObjectType::Calendar,
                property_id: PropertyId::PresentValue,
            }
        );
    }
}
