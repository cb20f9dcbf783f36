pub mod address;
pub mod bip;
pub mod traits;

pub use address::{AddressParseError, DataLinkAddress};
pub use bip::transport::BacnetIpTransport;
pub use traits::{DataLink, DataLinkError};
