#![no_main]

use bacdweet_core::apdu::ConfirmedResponse;
use bacdweet_core::encoding::reader::Reader;
use bacdweet_core::services::{ReadPropertyAck, SERVICE_READ_PROPERTY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    if let Ok(Some(ConfirmedResponse::ComplexAck { header, payload })) =
        ConfirmedResponse::decode(&mut r)
    {
        if header.service_choice == SERVICE_READ_PROPERTY {
            let mut r = Reader::new(payload);
            let _ = ReadPropertyAck::decode_after_header(&mut r);
        }
    }
});
