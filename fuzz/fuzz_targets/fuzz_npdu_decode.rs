#![no_main]

use bacdweet_core::encoding::reader::Reader;
use bacdweet_core::npdu::Npdu;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    let _ = Npdu::decode(&mut r);
});
