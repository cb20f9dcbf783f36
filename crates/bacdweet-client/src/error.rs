use bacdweet_datalink::DataLinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("datalink error: {0}")]
    DataLink(#[from] DataLinkError),
    #[error("encode error: {0}")]
    Encode(#[from] bacdweet_core::EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] bacdweet_core::DecodeError),
    #[error("request timed out")]
    Timeout,
    #[error("remote service error for service choice {service_choice} (class {error_class:?}, code {error_code:?})")]
    RemoteServiceError {
        service_choice: u8,
        error_class: Option<u32>,
        error_code: Option<u32>,
    },
    #[error("remote reject reason {reason}")]
    RemoteReject { reason: u8 },
    #[error("remote abort reason {reason} (server={server})")]
    RemoteAbort { reason: u8, server: bool },
    #[error("peer answered with a segmented response")]
    SegmentedResponseUnsupported,
    #[error("all invoke ids for the peer are in flight")]
    InvokeIdsExhausted,
    #[error("unsupported response")]
    UnsupportedResponse,
    #[error("client closed")]
    Closed,
}
