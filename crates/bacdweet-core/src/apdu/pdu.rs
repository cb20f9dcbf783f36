#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl ApduType {
    /// Classifies an APDU by the high nibble of its first octet.
    pub fn from_first_octet(first: u8) -> Option<Self> {
        Some(match first >> 4 {
            0 => Self::ConfirmedRequest,
            1 => Self::UnconfirmedRequest,
            2 => Self::SimpleAck,
            3 => Self::ComplexAck,
            4 => Self::SegmentAck,
            5 => Self::Error,
            6 => Self::Reject,
            7 => Self::Abort,
            _ => return None,
        })
    }

    pub(crate) const fn header_bits(self) -> u8 {
        (self as u8) << 4
    }
}
