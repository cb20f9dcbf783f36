use crate::encoding::{
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::{DecodeError, EncodeError};

/// Minimal number of octets needed to carry `value` as a BACnet unsigned.
const fn unsigned_len(value: u32) -> usize {
    if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFF_FFFF {
        3
    } else {
        4
    }
}

pub fn encode_unsigned(w: &mut Writer<'_>, value: u32) -> Result<usize, EncodeError> {
    let len = unsigned_len(value);
    w.write_all(&value.to_be_bytes()[4 - len..])?;
    Ok(len)
}

pub fn decode_unsigned(r: &mut Reader<'_>, len: usize) -> Result<u32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    Ok(bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
}

pub fn decode_signed(r: &mut Reader<'_>, len: usize) -> Result<i32, DecodeError> {
    if len == 0 || len > 4 {
        return Err(DecodeError::InvalidLength);
    }
    let bytes = r.read_exact(len)?;
    let fill = if (bytes[0] & 0x80) != 0 { 0xFF } else { 0x00 };
    let mut out = [fill; 4];
    out[4 - len..].copy_from_slice(bytes);
    Ok(i32::from_be_bytes(out))
}

fn encode_unsigned_with_tag(w: &mut Writer<'_>, tag: Tag, value: u32) -> Result<(), EncodeError> {
    tag.encode(w)?;
    encode_unsigned(w, value).map(|_| ())
}

pub fn encode_ctx_unsigned(w: &mut Writer<'_>, tag_num: u8, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_with_tag(w, Tag::Context { tag_num, len }, value)
}

pub fn encode_ctx_object_id(
    w: &mut Writer<'_>,
    tag_num: u8,
    object_id_raw: u32,
) -> Result<(), EncodeError> {
    Tag::Context { tag_num, len: 4 }.encode(w)?;
    w.write_be_u32(object_id_raw)
}

pub fn encode_app_unsigned(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_with_tag(
        w,
        Tag::Application {
            tag: AppTag::UnsignedInt,
            len,
        },
        value,
    )
}

pub fn encode_app_enumerated(w: &mut Writer<'_>, value: u32) -> Result<(), EncodeError> {
    let len = unsigned_len(value) as u32;
    encode_unsigned_with_tag(
        w,
        Tag::Application {
            tag: AppTag::Enumerated,
            len,
        },
        value,
    )
}

pub fn encode_app_real(w: &mut Writer<'_>, value: f32) -> Result<(), EncodeError> {
    Tag::Application {
        tag: AppTag::Real,
        len: 4,
    }
    .encode(w)?;
    w.write_all(&value.to_bits().to_be_bytes())
}

pub fn encode_app_character_string(w: &mut Writer<'_>, value: &str) -> Result<(), EncodeError> {
    let len = u32::try_from(value.len() + 1).map_err(|_| EncodeError::ValueOutOfRange)?;
    Tag::Application {
        tag: AppTag::CharacterString,
        len,
    }
    .encode(w)?;
    // character set 0: ANSI X3.4 / UTF-8
    w.write_u8(0)?;
    w.write_all(value.as_bytes())
}

pub fn encode_opening_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Opening { tag_num }.encode(w)
}

pub fn encode_closing_tag(w: &mut Writer<'_>, tag_num: u8) -> Result<(), EncodeError> {
    Tag::Closing { tag_num }.encode(w)
}

#[cfg(test)]
mod tests {
    use super::{decode_signed, decode_unsigned, encode_unsigned};
    use crate::encoding::{reader::Reader, writer::Writer};
    use crate::DecodeError;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn unsigned_roundtrip(v in any::<u32>()) {
            let mut b = [0u8; 8];
            let mut w = Writer::new(&mut b);
            let len = encode_unsigned(&mut w, v).unwrap();
            let mut r = Reader::new(w.as_written());
            prop_assert_eq!(decode_unsigned(&mut r, len).unwrap(), v);
        }

        #[test]
        fn signed_sign_extends(v in any::<i8>()) {
            let bytes = [v as u8];
            let mut r = Reader::new(&bytes);
            prop_assert_eq!(decode_signed(&mut r, 1).unwrap(), i32::from(v));
        }
    }

    #[test]
    fn unsigned_uses_minimal_octets() {
        let mut b = [0u8; 8];
        let mut w = Writer::new(&mut b);
        assert_eq!(encode_unsigned(&mut w, 0x1_0000).unwrap(), 3);
        assert_eq!(w.as_written(), &[0x01, 0x00, 0x00]);
    }

    #[test]
    fn oversized_lengths_are_rejected() {
        let mut r = Reader::new(&[0; 8]);
        assert_eq!(decode_unsigned(&mut r, 5).unwrap_err(), DecodeError::InvalidLength);
        assert_eq!(decode_signed(&mut r, 0).unwrap_err(), DecodeError::InvalidLength);
    }
}
