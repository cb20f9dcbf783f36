pub mod read_property;

pub use read_property::{ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY};
