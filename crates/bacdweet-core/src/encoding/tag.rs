use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// Application tag numbers (ASHRAE 135 clause 20.2.1.4).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTag {
    Null = 0,
    Boolean = 1,
    UnsignedInt = 2,
    SignedInt = 3,
    Real = 4,
    Double = 5,
    OctetString = 6,
    CharacterString = 7,
    BitString = 8,
    Enumerated = 9,
    Date = 10,
    Time = 11,
    ObjectId = 12,
}

impl AppTag {
    pub fn from_u8(value: u8) -> Result<Self, DecodeError> {
        Ok(match value {
            0 => Self::Null,
            1 => Self::Boolean,
            2 => Self::UnsignedInt,
            3 => Self::SignedInt,
            4 => Self::Real,
            5 => Self::Double,
            6 => Self::OctetString,
            7 => Self::CharacterString,
            8 => Self::BitString,
            9 => Self::Enumerated,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::ObjectId,
            _ => return Err(DecodeError::InvalidTag),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Application { tag: AppTag, len: u32 },
    Context { tag_num: u8, len: u32 },
    Opening { tag_num: u8 },
    Closing { tag_num: u8 },
}

const CLASS_CONTEXT: u8 = 0b0000_1000;
const LVT_OPENING: u8 = 6;
const LVT_CLOSING: u8 = 7;
const LVT_EXTENDED: u8 = 5;

impl Tag {
    pub fn encode(self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        match self {
            Tag::Application { tag, len } => encode_header(w, tag as u8, 0, Some(len)),
            Tag::Context { tag_num, len } => encode_header(w, tag_num, CLASS_CONTEXT, Some(len)),
            Tag::Opening { tag_num } => {
                encode_header(w, tag_num, CLASS_CONTEXT | LVT_OPENING, None)
            }
            Tag::Closing { tag_num } => {
                encode_header(w, tag_num, CLASS_CONTEXT | LVT_CLOSING, None)
            }
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let first = r.read_u8()?;
        let context = (first & CLASS_CONTEXT) != 0;

        let mut tag_num = first >> 4;
        if tag_num == 0x0f {
            tag_num = r.read_u8()?;
        }

        let lvt = first & 0x07;
        if context && lvt == LVT_OPENING {
            return Ok(Tag::Opening { tag_num });
        }
        if context && lvt == LVT_CLOSING {
            return Ok(Tag::Closing { tag_num });
        }

        let len = decode_len(r, lvt)?;
        if context {
            Ok(Tag::Context { tag_num, len })
        } else {
            Ok(Tag::Application {
                tag: AppTag::from_u8(tag_num)?,
                len,
            })
        }
    }
}

/// Writes the initial octet, the extended tag number, and (when `len` is
/// given) the extended length octets.
fn encode_header(
    w: &mut Writer<'_>,
    tag_num: u8,
    flags: u8,
    len: Option<u32>,
) -> Result<(), EncodeError> {
    let number_bits = if tag_num <= 14 { tag_num << 4 } else { 0xF0 };
    let lvt = match len {
        Some(len) if len <= 4 => len as u8,
        Some(_) => LVT_EXTENDED,
        None => 0,
    };
    w.write_u8(number_bits | flags | lvt)?;

    if tag_num > 14 {
        w.write_u8(tag_num)?;
    }

    match len {
        Some(len) if len > 4 && len <= 253 => w.write_u8(len as u8),
        Some(len) if len > 253 && len <= 0xFFFF => {
            w.write_u8(254)?;
            w.write_be_u16(len as u16)
        }
        Some(len) if len > 0xFFFF => {
            w.write_u8(255)?;
            w.write_be_u32(len)
        }
        _ => Ok(()),
    }
}

fn decode_len(r: &mut Reader<'_>, lvt: u8) -> Result<u32, DecodeError> {
    match lvt {
        0..=4 => Ok(u32::from(lvt)),
        LVT_EXTENDED => match r.read_u8()? {
            254 => Ok(u32::from(r.read_be_u16()?)),
            255 => r.read_be_u32(),
            v => Ok(u32::from(v)),
        },
        _ => Err(DecodeError::InvalidLength),
    }
}
