use crate::apdu::ConfirmedRequestHeader;
use crate::encoding::{
    primitives::{decode_unsigned, encode_ctx_object_id, encode_ctx_unsigned},
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::types::{ObjectId, PropertyId};
use crate::{DecodeError, EncodeError};

pub const SERVICE_READ_PROPERTY: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyRequest {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub invoke_id: u8,
    /// Encoded max-APDU code advertised to the peer.
    pub max_apdu: u8,
}

impl ReadPropertyRequest {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        ConfirmedRequestHeader {
            segmented_response_accepted: false,
            max_segments: 0,
            max_apdu: self.max_apdu,
            invoke_id: self.invoke_id,
            service_choice: SERVICE_READ_PROPERTY,
        }
        .encode(w)?;

        encode_ctx_object_id(w, 0, self.object_id.raw())?;
        encode_ctx_unsigned(w, 1, self.property_id.to_u32())?;
        if let Some(idx) = self.array_index {
            encode_ctx_unsigned(w, 2, idx)?;
        }
        Ok(())
    }
}

/// ReadProperty-ACK with the property value left encoded. The value's
/// datatype depends on the schema, so decoding it is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyAck<'a> {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    /// Everything between opening and closing tag 3.
    pub value: &'a [u8],
}

impl<'a> ReadPropertyAck<'a> {
    pub fn decode_after_header(r: &mut Reader<'a>) -> Result<Self, DecodeError> {
        let object_id = match Tag::decode(r)? {
            Tag::Context { tag_num: 0, len: 4 } => ObjectId::from_raw(r.read_be_u32()?),
            _ => return Err(DecodeError::InvalidTag),
        };

        let property_id = match Tag::decode(r)? {
            Tag::Context { tag_num: 1, len } => {
                PropertyId::from_u32(decode_unsigned(r, len as usize)?)
            }
            _ => return Err(DecodeError::InvalidTag),
        };

        let (array_index, value_start_tag) = match Tag::decode(r)? {
            Tag::Context { tag_num: 2, len } => {
                let idx = decode_unsigned(r, len as usize)?;
                (Some(idx), Tag::decode(r)?)
            }
            other => (None, other),
        };
        if value_start_tag != (Tag::Opening { tag_num: 3 }) {
            return Err(DecodeError::InvalidTag);
        }

        let value = take_until_closing(r, 3)?;
        if !r.is_empty() {
            return Err(DecodeError::TrailingData);
        }

        Ok(Self {
            object_id,
            property_id,
            array_index,
            value,
        })
    }
}

/// Returns the bytes up to the closing tag matching an already consumed
/// opening tag, skipping over nested constructed values, and consumes the
/// closing tag itself.
fn take_until_closing<'a>(r: &mut Reader<'a>, tag_num: u8) -> Result<&'a [u8], DecodeError> {
    let body = r.rest();
    let start = r.position();
    let mut depth = 0usize;
    loop {
        let before = r.position() - start;
        match Tag::decode(r)? {
            Tag::Opening { .. } => depth += 1,
            Tag::Closing { tag_num: n } if depth == 0 => {
                return if n == tag_num {
                    Ok(&body[..before])
                } else {
                    Err(DecodeError::InvalidTag)
                };
            }
            Tag::Closing { .. } => depth -= 1,
            // boolean content lives in the length bits
            Tag::Application {
                tag: AppTag::Boolean,
                ..
            } => {}
            Tag::Application { len, .. } | Tag::Context { len, .. } => {
                r.read_exact(len as usize)?;
            }
        }
    }
}
