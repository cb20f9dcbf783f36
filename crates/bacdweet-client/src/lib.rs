pub mod client;
pub mod error;
pub mod pending;

pub use client::{BacnetClient, ForeignDeviceRenewal};
pub use error::ClientError;
pub use pending::{PendingRead, ReadPropertyResponse, ReadRequest};
