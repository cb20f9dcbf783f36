use crate::encoding::{reader::Reader, writer::Writer};
use crate::{DecodeError, EncodeError};

/// BACnet network layer protocol version (always `0x01`).
pub const NPDU_VERSION: u8 = 0x01;

const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
const CONTROL_HAS_DESTINATION: u8 = 0x20;
const CONTROL_HAS_SOURCE: u8 = 0x08;
const CONTROL_EXPECTING_REPLY: u8 = 0x04;

/// A remote network address: network number plus MAC (up to 6 octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpduAddress {
    pub network: u16,
    pub mac: [u8; 6],
    pub mac_len: u8,
}

impl NpduAddress {
    pub fn mac(&self) -> &[u8] {
        &self.mac[..usize::from(self.mac_len).min(self.mac.len())]
    }
}

/// NPDU header preceding every APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npdu {
    pub control: u8,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: Option<u8>,
    pub message_type: Option<u8>,
}

impl Npdu {
    pub const fn new(control: u8) -> Self {
        Self {
            control,
            destination: None,
            source: None,
            hop_count: None,
            message_type: None,
        }
    }

    /// Local-network header for a confirmed request; the peer is told a reply
    /// is expected.
    pub const fn expecting_reply() -> Self {
        Self::new(CONTROL_EXPECTING_REPLY)
    }

    /// `true` when the frame carries a network-layer message instead of an APDU.
    pub const fn is_network_message(&self) -> bool {
        (self.control & CONTROL_NETWORK_MESSAGE) != 0
    }

    pub fn encode(&self, w: &mut Writer<'_>) -> Result<(), EncodeError> {
        let mut control = self.control & !(CONTROL_HAS_DESTINATION | CONTROL_HAS_SOURCE);
        if self.destination.is_some() {
            control |= CONTROL_HAS_DESTINATION;
        }
        if self.source.is_some() {
            control |= CONTROL_HAS_SOURCE;
        }
        w.write_u8(NPDU_VERSION)?;
        w.write_u8(control)?;

        if let Some(dest) = self.destination {
            encode_addr(w, dest)?;
        }
        if let Some(src) = self.source {
            encode_addr(w, src)?;
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count.unwrap_or(255))?;
        }
        if self.is_network_message() {
            w.write_u8(self.message_type.unwrap_or(0))?;
        }
        Ok(())
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }

        let control = r.read_u8()?;
        let destination = if (control & CONTROL_HAS_DESTINATION) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let source = if (control & CONTROL_HAS_SOURCE) != 0 {
            Some(decode_addr(r)?)
        } else {
            None
        };
        let hop_count = match destination {
            Some(_) => Some(r.read_u8()?),
            None => None,
        };

        let message_type = if (control & CONTROL_NETWORK_MESSAGE) != 0 {
            let mt = r.read_u8()?;
            if mt >= 0x80 {
                // proprietary network message: vendor id follows
                r.read_be_u16()?;
            }
            Some(mt)
        } else {
            None
        };

        Ok(Self {
            control,
            destination,
            source,
            hop_count,
            message_type,
        })
    }
}

fn encode_addr(w: &mut Writer<'_>, addr: NpduAddress) -> Result<(), EncodeError> {
    if usize::from(addr.mac_len) > addr.mac.len() {
        return Err(EncodeError::InvalidLength);
    }
    w.write_be_u16(addr.network)?;
    w.write_u8(addr.mac_len)?;
    w.write_all(addr.mac())
}

fn decode_addr(r: &mut Reader<'_>) -> Result<NpduAddress, DecodeError> {
    let network = r.read_be_u16()?;
    let mac_len = r.read_u8()?;
    if usize::from(mac_len) > 6 {
        return Err(DecodeError::InvalidLength);
    }
    let mut mac = [0u8; 6];
    mac[..usize::from(mac_len)].copy_from_slice(r.read_exact(usize::from(mac_len))?);
    Ok(NpduAddress {
        network,
        mac,
        mac_len,
    })
}
