use bacdweet_client::{BacnetClient, ClientError, PendingRead, ReadPropertyResponse, ReadRequest};
use bacdweet_datalink::DataLink;
use std::future::Future;

/// Issues property reads and hands back their correlated results.
///
/// Implementations are shared by every thing's task, so many requests may be
/// outstanding at once; each handle resolves only with the response to its
/// own request.
pub trait ProtocolClient: Send + Sync + 'static {
    type Handle: Send;

    fn submit(
        &self,
        request: ReadRequest,
    ) -> impl Future<Output = Result<Self::Handle, ClientError>> + Send;

    /// Resolves with the response, or an error once the client's response
    /// timeout has elapsed.
    fn await_result(
        &self,
        handle: Self::Handle,
    ) -> impl Future<Output = Result<ReadPropertyResponse, ClientError>> + Send;
}

impl<D: DataLink> ProtocolClient for BacnetClient<D> {
    type Handle = PendingRead;

    async fn submit(&self, request: ReadRequest) -> Result<PendingRead, ClientError> {
        BacnetClient::submit(self, request).await
    }

    async fn await_result(&self, handle: PendingRead) -> Result<ReadPropertyResponse, ClientError> {
        handle.wait().await
    }
}
