use crate::DataLinkAddress;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur at the data-link layer.
#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame too large")]
    FrameTooLarge,
    #[error("invalid frame")]
    InvalidFrame,
    #[error("unsupported BVLC function 0x{0:02x}")]
    UnsupportedBvlcFunction(u8),
    /// A BVLC-Result frame; code 0 is a successful registration.
    #[error("BVLC result code 0x{0:04x}")]
    BvlcResult(u16),
    #[error("bbmd not configured")]
    BbmdNotConfigured,
}

/// Sends and receives NPDUs. The returned futures are `Send` so a
/// receive loop can run on its own task.
pub trait DataLink: Send + Sync + 'static {
    fn send(
        &self,
        address: DataLinkAddress,
        payload: &[u8],
    ) -> impl Future<Output = Result<(), DataLinkError>> + Send;

    /// Receives one NPDU into `buf`, returning `(bytes_read, source_address)`.
    fn recv(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, DataLinkAddress), DataLinkError>> + Send;
}
