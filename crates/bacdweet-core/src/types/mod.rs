pub mod date_time;
pub mod enumeration;
pub mod object_id;
pub mod object_type;
pub mod property_id;

pub use date_time::{Date, Time};
pub use enumeration::Enumeration;
pub use object_id::ObjectId;
pub use object_type::ObjectType;
pub use property_id::PropertyId;
