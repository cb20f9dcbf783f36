/// Confirmed-service request header and the PDUs that answer it.
pub mod confirmed;
/// APDU type discriminant.
pub mod pdu;

pub use confirmed::{
    AbortPdu, BacnetError, ComplexAckHeader, ConfirmedRequestHeader, ConfirmedResponse, RejectPdu,
};
pub use pdu::ApduType;
