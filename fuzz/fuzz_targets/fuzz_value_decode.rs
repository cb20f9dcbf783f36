#![no_main]

use bacdweet_core::types::{ObjectType, PropertyId};
use bacdweet_core::value::decode_property;
use libfuzzer_sys::fuzz_target;

const PAIRS: [(ObjectType, PropertyId); 8] = [
    (ObjectType::AnalogInput, PropertyId::PresentValue),
    (ObjectType::BinaryInput, PropertyId::PresentValue),
    (ObjectType::MultiStateValue, PropertyId::StateText),
    (ObjectType::AnalogOutput, PropertyId::PriorityArray),
    (ObjectType::Device, PropertyId::ObjectList),
    (ObjectType::Device, PropertyId::LocalDate),
    (ObjectType::Device, PropertyId::LocalTime),
    (ObjectType::AnalogValue, PropertyId::StatusFlags),
];

// first octet picks the property, second the array index (0xFF: none)
fuzz_target!(|data: &[u8]| {
    let [pick, index, raw @ ..] = data else {
        return;
    };
    let (object_type, property_id) = PAIRS[usize::from(*pick) % PAIRS.len()];
    let array_index = (*index != 0xFF).then_some(u32::from(*index));
    let _ = decode_property(object_type, property_id, raw, array_index);
});
