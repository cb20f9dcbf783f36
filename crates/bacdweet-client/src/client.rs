use crate::pending::{
    lock, Outcome, PendingRead, PendingTable, ReadPropertyResponse, ReadRequest, SharedTable,
};
use crate::ClientError;
use bacdweet_core::apdu::ConfirmedResponse;
use bacdweet_core::encoding::{reader::Reader, writer::Writer};
use bacdweet_core::npdu::Npdu;
use bacdweet_core::services::{ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY};
use bacdweet_core::EncodeError;
use bacdweet_datalink::bip::transport::BacnetIpTransport;
use bacdweet_datalink::{DataLink, DataLinkAddress, DataLinkError};
use log::{debug, warn};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

const MAX_NPDU_LEN: usize = 1500;
const DEFAULT_MAX_APDU_CODE: u8 = 5;
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Shared BACnet client. Any number of tasks may have requests in flight at
/// once; a background dispatcher routes each response to the request it
/// answers by peer address and invoke id.
#[derive(Debug)]
pub struct BacnetClient<D: DataLink> {
    datalink: Arc<D>,
    pending: SharedTable,
    dispatcher: JoinHandle<()>,
    response_timeout: Duration,
    max_apdu: u8,
}

#[derive(Debug)]
pub struct ForeignDeviceRenewal {
    task: JoinHandle<()>,
}

impl ForeignDeviceRenewal {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ForeignDeviceRenewal {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl BacnetClient<BacnetIpTransport> {
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, ClientError> {
        let datalink = BacnetIpTransport::bind(bind_addr).await?;
        Ok(Self::with_datalink(datalink))
    }

    /// Binds, registers with `bbmd_addr` and waits for the registration to
    /// be accepted before the dispatcher takes over the socket.
    pub async fn bind_foreign(
        bind_addr: SocketAddr,
        bbmd_addr: SocketAddr,
        ttl_seconds: u16,
    ) -> Result<Self, ClientError> {
        let datalink = BacnetIpTransport::bind_foreign(bind_addr, bbmd_addr).await?;
        datalink.register_foreign_device(ttl_seconds).await?;
        Ok(Self::with_datalink(datalink))
    }

    /// Re-registers every 3/4 of `ttl_seconds`. The BBMD's acknowledgements
    /// are consumed by the dispatcher.
    pub fn start_foreign_device_renewal(
        &self,
        ttl_seconds: u16,
    ) -> Result<ForeignDeviceRenewal, ClientError> {
        if ttl_seconds == 0 {
            return Err(EncodeError::ValueOutOfRange.into());
        }

        let datalink = Arc::clone(&self.datalink);
        let refresh_seconds = u64::from(ttl_seconds).saturating_mul(3) / 4;
        let interval = Duration::from_secs(refresh_seconds.max(1));
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if let Err(err) = datalink.register_foreign_device_no_wait(ttl_seconds).await {
                    warn!("foreign device renewal send failed: {err}");
                }
            }
        });
        Ok(ForeignDeviceRenewal { task })
    }
}

impl<D: DataLink> BacnetClient<D> {
    /// Wraps `datalink` and starts the response dispatcher. Must be called
    /// from within a tokio runtime.
    pub fn with_datalink(datalink: D) -> Self {
        let datalink = Arc::new(datalink);
        let pending: SharedTable = Arc::new(Mutex::new(PendingTable::default()));
        let dispatcher = tokio::spawn(dispatch(Arc::clone(&datalink), Arc::clone(&pending)));
        Self {
            datalink,
            pending,
            dispatcher,
            response_timeout: Duration::from_secs(3),
            max_apdu: DEFAULT_MAX_APDU_CODE,
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Advertises the largest APDU this client accepts, in octets.
    pub fn with_max_apdu_length(mut self, octets: u16) -> Self {
        self.max_apdu = max_apdu_code(octets);
        self
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Sends a ReadProperty request and returns the handle its response will
    /// be delivered to.
    pub async fn submit(&self, request: ReadRequest) -> Result<PendingRead, ClientError> {
        let (invoke_id, token, rx, in_flight) = {
            let mut table = lock(&self.pending);
            let (invoke_id, token, rx) = table.register(request.address)?;
            (invoke_id, token, rx, table.len())
        };
        // from here on the guard releases the invoke id on any early return
        let pending = PendingRead {
            address: request.address,
            invoke_id,
            token,
            rx: Some(rx),
            table: Arc::clone(&self.pending),
            timeout: self.response_timeout,
        };

        let mut buf = [0u8; 32];
        let mut w = Writer::new(&mut buf);
        Npdu::expecting_reply().encode(&mut w)?;
        ReadPropertyRequest {
            object_id: request.object_id,
            property_id: request.property_id,
            array_index: request.array_index,
            invoke_id,
            max_apdu: self.max_apdu,
        }
        .encode(&mut w)?;

        debug!(
            "read {} {:?}[{:?}] from {} (invoke id {invoke_id}, {in_flight} in flight)",
            request.object_id, request.property_id, request.array_index, request.address
        );
        self.datalink.send(request.address, w.as_written()).await?;
        Ok(pending)
    }
}

impl<D: DataLink> Drop for BacnetClient<D> {
    fn drop(&mut self) {
        self.dispatcher.abort();
        lock(&self.pending).close_all();
    }
}

/// Encoded max-APDU-length-accepted for the largest standard size that
/// fits in `octets`.
pub const fn max_apdu_code(octets: u16) -> u8 {
    match octets {
        0..=127 => 0,
        128..=205 => 1,
        206..=479 => 2,
        480..=1023 => 3,
        1024..=1475 => 4,
        _ => 5,
    }
}

async fn dispatch<D: DataLink>(datalink: Arc<D>, pending: SharedTable) {
    let mut rx = [0u8; MAX_NPDU_LEN];
    loop {
        let (n, src) = match datalink.recv(&mut rx).await {
            Ok(v) => v,
            Err(DataLinkError::InvalidFrame) => continue,
            Err(DataLinkError::BvlcResult(0)) => {
                debug!("bbmd accepted foreign device registration");
                continue;
            }
            Err(err @ DataLinkError::Io(_)) => {
                warn!("receive failed: {err}");
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                continue;
            }
            Err(err) => {
                warn!("receive failed: {err}");
                continue;
            }
        };
        route(&pending, src, &rx[..n]);
    }
}

/// Decodes one received NPDU and resolves the request it answers.
fn route(pending: &Mutex<PendingTable>, src: DataLinkAddress, frame: &[u8]) {
    let mut r = Reader::new(frame);
    let response = match Npdu::decode(&mut r) {
        Ok(npdu) if npdu.is_network_message() => return,
        Ok(_) => ConfirmedResponse::decode(&mut r),
        Err(err) => Err(err),
    };
    let response = match response {
        Ok(Some(response)) => response,
        // requests addressed to us; this client serves nothing
        Ok(None) => return,
        Err(err) => {
            debug!("dropping undecodable frame from {src}: {err}");
            return;
        }
    };

    let invoke_id = response.invoke_id();
    if !lock(pending).resolve(src, invoke_id, outcome(response)) {
        debug!("no request waiting for invoke id {invoke_id} from {src}");
    }
}

fn outcome(response: ConfirmedResponse<'_>) -> Outcome {
    match response {
        ConfirmedResponse::ComplexAck { header, .. } if header.segmented => {
            Err(ClientError::SegmentedResponseUnsupported)
        }
        ConfirmedResponse::ComplexAck { header, payload } => {
            if header.service_choice != SERVICE_READ_PROPERTY {
                return Err(ClientError::UnsupportedResponse);
            }
            let mut r = Reader::new(payload);
            let ack = ReadPropertyAck::decode_after_header(&mut r)?;
            Ok(ReadPropertyResponse {
                object_id: ack.object_id,
                property_id: ack.property_id,
                array_index: ack.array_index,
                value: ack.value.to_vec(),
            })
        }
        ConfirmedResponse::Error(err) => Err(ClientError::RemoteServiceError {
            service_choice: err.service_choice,
            error_class: err.error_class,
            error_code: err.error_code,
        }),
        ConfirmedResponse::Reject(rej) => Err(ClientError::RemoteReject { reason: rej.reason }),
        ConfirmedResponse::Abort(abort) => Err(ClientError::RemoteAbort {
            reason: abort.reason,
            server: abort.server,
        }),
        ConfirmedResponse::SimpleAck { .. } | ConfirmedResponse::SegmentAck { .. } => {
            Err(ClientError::UnsupportedResponse)
        }
    }
}
