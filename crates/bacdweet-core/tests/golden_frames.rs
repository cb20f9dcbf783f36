use bacdweet_core::apdu::ConfirmedResponse;
use bacdweet_core::encoding::reader::Reader;
use bacdweet_core::encoding::writer::Writer;
use bacdweet_core::npdu::Npdu;
use bacdweet_core::services::{ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY};
use bacdweet_core::types::{ObjectId, ObjectType, PropertyId};
use bacdweet_core::value::{decode_property, Value};
use bacdweet_core::DecodeError;

#[test]
fn read_property_frame_matches_fixture() {
    let mut buf = [0u8; 64];
    let mut w = Writer::new(&mut buf);
    Npdu::expecting_reply().encode(&mut w).unwrap();
    ReadPropertyRequest {
        object_id: ObjectId::new(ObjectType::Device, 123),
        property_id: PropertyId::ObjectName,
        array_index: None,
        invoke_id: 1,
        max_apdu: 5,
    }
    .encode(&mut w)
    .unwrap();

    assert_eq!(
        w.as_written(),
        &[0x01, 0x04, 0x00, 0x05, 0x01, 0x0C, 0x0C, 0x02, 0x00, 0x00, 0x7B, 0x19, 0x4D]
    );
}

/// analogInput:1 presentValue = 21.96, followed by one stray octet.
const ANALOG_ACK: [u8; 20] = [
    0x01, 0x00, 0x30, 0x01, 0x0C, 0x0C, 0x00, 0x00, 0x00, 0x01, 0x19, 0x55, 0x3E, 0x44, 0x41, 0xAF,
    0xAE, 0x14, 0x3F, 0x00,
];

fn ack_payload(frame: &[u8]) -> &[u8] {
    let mut r = Reader::new(frame);
    let npdu = Npdu::decode(&mut r).unwrap();
    assert!(!npdu.is_network_message());
    let Some(ConfirmedResponse::ComplexAck { header, payload }) =
        ConfirmedResponse::decode(&mut r).unwrap()
    else {
        panic!("expected complex ack");
    };
    assert_eq!(header.service_choice, SERVICE_READ_PROPERTY);
    payload
}

fn decode_frame(frame: &[u8]) -> Value {
    let mut r = Reader::new(ack_payload(frame));
    let ack = ReadPropertyAck::decode_after_header(&mut r).unwrap();
    decode_property(
        ack.object_id.object_type(),
        ack.property_id,
        ack.value,
        ack.array_index,
    )
    .unwrap()
}

#[test]
fn analog_present_value_decodes() {
    assert_eq!(decode_frame(&ANALOG_ACK[..19]), Value::Real(21.96));
}

#[test]
fn trailing_octet_after_ack_is_rejected() {
    let mut r = Reader::new(ack_payload(&ANALOG_ACK));
    assert_eq!(
        ReadPropertyAck::decode_after_header(&mut r).unwrap_err(),
        DecodeError::TrailingData
    );
}

#[test]
fn binary_present_value_decodes_to_state_name() {
    let frame = [
        0x01, 0x00, 0x30, 0x02, 0x0C, 0x0C, 0x00, 0xC0, 0x00, 0x02, 0x19, 0x55, 0x3E, 0x91, 0x01,
        0x3F,
    ];
    assert_eq!(
        decode_frame(&frame),
        Value::Enumerated {
            value: 1,
            name: Some("active"),
        }
    );
}

#[test]
fn state_text_length_via_index_zero() {
    // multiStateValue:4 stateText[0] = 3
    let frame = [
        0x01, 0x00, 0x30, 0x03, 0x0C, 0x0C, 0x04, 0xC0, 0x00, 0x04, 0x19, 0x6E, 0x29, 0x00, 0x3E,
        0x21, 0x03, 0x3F,
    ];
    assert_eq!(decode_frame(&frame), Value::Unsigned(3));
}

#[test]
fn routed_reply_decodes_like_local_one() {
    // same ack relayed from network 5, MAC 0x21
    let mut frame = vec![0x01, 0x08, 0x00, 0x05, 0x01, 0x21];
    frame.extend_from_slice(&ANALOG_ACK[2..19]);
    assert_eq!(decode_frame(&frame), Value::Real(21.96));
}
