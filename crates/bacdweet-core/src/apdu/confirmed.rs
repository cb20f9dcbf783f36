use crate::apdu::ApduType;
use crate::encoding::{
    primitives::decode_unsigned,
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::{DecodeError, EncodeError};

const PDU_FLAG_SEGMENTED: u8 = 0b0000_1000;
const PDU_FLAG_MORE_FOLLOWS: u8 = 0b0000_0100;
const PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED: u8 = 0b0000_0010;
const PDU_FLAG_SERVER: u8 = 0b0000_0001;

/// Header of an unsegmented confirmed-service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRequestHeader {
    pub segmented_response_accepted: bool,
    pub max_segments: u8,
    /// Encoded max-APDU-length-accepted code (0..=5).
    pub max_apdu: u8,
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ConfirmedRequestHeader {
    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = ApduType::ConfirmedRequest.header_bits();
        if self.segmented_response_accepted {
            b0 |= PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED;
        }
        w.write_u8(b0)?;
        w.write_u8((self.max_segments << 4) | (self.max_apdu & 0x0f))?;
        w.write_u8(self.invoke_id)?;
        w.write_u8(self.service_choice)
    }

    /// Decodes a request header. Segmented requests are refused, the poller
    /// never sends them.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if ApduType::from_first_octet(b0) != Some(ApduType::ConfirmedRequest) {
            return Err(DecodeError::InvalidValue);
        }
        if (b0 & PDU_FLAG_SEGMENTED) != 0 {
            return Err(DecodeError::Unsupported);
        }
        let seg_apdu = r.read_u8()?;
        Ok(Self {
            segmented_response_accepted: (b0 & PDU_FLAG_SEGMENTED_RESPONSE_ACCEPTED) != 0,
            max_segments: seg_apdu >> 4,
            max_apdu: seg_apdu & 0x0f,
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexAckHeader {
    pub segmented: bool,
    pub more_follows: bool,
    pub invoke_id: u8,
    pub sequence_number: Option<u8>,
    pub proposed_window_size: Option<u8>,
    pub service_choice: u8,
}

impl ComplexAckHeader {
    /// Header of an unsegmented ack.
    pub const fn new(invoke_id: u8, service_choice: u8) -> Self {
        Self {
            segmented: false,
            more_follows: false,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice,
        }
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut b0 = ApduType::ComplexAck.header_bits();
        if self.segmented {
            b0 |= PDU_FLAG_SEGMENTED;
        }
        if self.more_follows {
            b0 |= PDU_FLAG_MORE_FOLLOWS;
        }
        w.write_u8(b0)?;
        w.write_u8(self.invoke_id)?;
        if self.segmented {
            w.write_u8(self.sequence_number.unwrap_or(0))?;
            w.write_u8(self.proposed_window_size.unwrap_or(1))?;
        }
        w.write_u8(self.service_choice)
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if ApduType::from_first_octet(b0) != Some(ApduType::ComplexAck) {
            return Err(DecodeError::InvalidValue);
        }

        let segmented = (b0 & PDU_FLAG_SEGMENTED) != 0;
        let invoke_id = r.read_u8()?;
        let (sequence_number, proposed_window_size) = if segmented {
            (Some(r.read_u8()?), Some(r.read_u8()?))
        } else {
            (None, None)
        };

        Ok(Self {
            segmented,
            more_follows: (b0 & PDU_FLAG_MORE_FOLLOWS) != 0,
            invoke_id,
            sequence_number,
            proposed_window_size,
            service_choice: r.read_u8()?,
        })
    }
}

/// Error PDU. Class and code are kept raw; unknown values are common in the
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacnetError {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub error_class: Option<u32>,
    pub error_code: Option<u32>,
}

impl BacnetError {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = r.read_u8()?;
        if ApduType::from_first_octet(b0) != Some(ApduType::Error) {
            return Err(DecodeError::InvalidValue);
        }
        let invoke_id = r.read_u8()?;
        let service_choice = r.read_u8()?;
        let mut error = Self {
            invoke_id,
            service_choice,
            error_class: None,
            error_code: None,
        };
        if r.is_empty() {
            return Ok(error);
        }

        let mut first = Tag::decode(r)?;
        let wrapped = first == (Tag::Opening { tag_num: 0 });
        if wrapped {
            first = Tag::decode(r)?;
        }
        error.error_class = Some(decode_error_field(r, first, 0)?);
        let second = Tag::decode(r)?;
        error.error_code = Some(decode_error_field(r, second, 1)?);
        if wrapped && Tag::decode(r)? != (Tag::Closing { tag_num: 0 }) {
            return Err(DecodeError::InvalidTag);
        }
        Ok(error)
    }
}

/// Error class/code may arrive context-tagged or as application enumerated,
/// depending on the vendor.
fn decode_error_field(
    r: &mut Reader<'_>,
    tag: Tag,
    expected_ctx_tag: u8,
) -> Result<u32, DecodeError> {
    match tag {
        Tag::Context { tag_num, len } if tag_num == expected_ctx_tag => {
            decode_unsigned(r, len as usize)
        }
        Tag::Application {
            tag: AppTag::Enumerated,
            len,
        } => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectPdu {
    pub invoke_id: u8,
    pub reason: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPdu {
    pub server: bool,
    pub invoke_id: u8,
    pub reason: u8,
}

/// Any APDU that answers a confirmed request, borrowed from the received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmedResponse<'a> {
    ComplexAck {
        header: ComplexAckHeader,
        /// Service-specific payload following the header.
        payload: &'a [u8],
    },
    SimpleAck {
        invoke_id: u8,
        service_choice: u8,
    },
    SegmentAck {
        invoke_id: u8,
        server: bool,
    },
    Error(BacnetError),
    Reject(RejectPdu),
    Abort(AbortPdu),
}

impl<'a> ConfirmedResponse<'a> {
    /// Decodes the APDU at the reader's position. Requests sent *to* us
    /// (confirmed or unconfirmed) yield `Ok(None)`.
    pub fn decode(r: &mut Reader<'a>) -> Result<Option<Self>, DecodeError> {
        let b0 = r.peek_u8()?;
        let response = match ApduType::from_first_octet(b0) {
            Some(ApduType::ComplexAck) => {
                let header = ComplexAckHeader::decode(r)?;
                Self::ComplexAck {
                    header,
                    payload: r.rest(),
                }
            }
            Some(ApduType::SimpleAck) => {
                r.read_u8()?;
                Self::SimpleAck {
                    invoke_id: r.read_u8()?,
                    service_choice: r.read_u8()?,
                }
            }
            Some(ApduType::SegmentAck) => {
                r.read_u8()?;
                Self::SegmentAck {
                    server: (b0 & PDU_FLAG_SERVER) != 0,
                    invoke_id: r.read_u8()?,
                }
            }
            Some(ApduType::Error) => Self::Error(BacnetError::decode(r)?),
            Some(ApduType::Reject) => {
                r.read_u8()?;
                Self::Reject(RejectPdu {
                    invoke_id: r.read_u8()?,
                    reason: r.read_u8()?,
                })
            }
            Some(ApduType::Abort) => {
                r.read_u8()?;
                Self::Abort(AbortPdu {
                    server: (b0 & PDU_FLAG_SERVER) != 0,
                    invoke_id: r.read_u8()?,
                    reason: r.read_u8()?,
                })
            }
            Some(ApduType::ConfirmedRequest | ApduType::UnconfirmedRequest) => return Ok(None),
            None => return Err(DecodeError::InvalidValue),
        };
        Ok(Some(response))
    }

    pub const fn invoke_id(&self) -> u8 {
        match self {
            Self::ComplexAck { header, .. } => header.invoke_id,
            Self::SimpleAck { invoke_id, .. } | Self::SegmentAck { invoke_id, .. } => *invoke_id,
            Self::Error(err) => err.invoke_id,
            Self::Reject(rej) => rej.invoke_id,
            Self::Abort(abort) => abort.invoke_id,
        }
    }
}
