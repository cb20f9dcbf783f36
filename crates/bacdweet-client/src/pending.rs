use crate::ClientError;
use bacdweet_core::types::{ObjectId, PropertyId};
use bacdweet_datalink::DataLinkAddress;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// One ReadProperty to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub address: DataLinkAddress,
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
}

/// A ReadProperty-ACK with the value still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPropertyResponse {
    pub object_id: ObjectId,
    pub property_id: PropertyId,
    pub array_index: Option<u32>,
    pub value: Vec<u8>,
}

pub(crate) type Outcome = Result<ReadPropertyResponse, ClientError>;

type Key = (DataLinkAddress, u8);

#[derive(Debug)]
struct Waiter {
    token: u64,
    tx: oneshot::Sender<Outcome>,
}

/// In-flight requests keyed by peer and invoke id.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    waiters: HashMap<Key, Waiter>,
    next_invoke_id: HashMap<DataLinkAddress, u8>,
    next_token: u64,
}

pub(crate) type SharedTable = Arc<Mutex<PendingTable>>;

pub(crate) fn lock(table: &Mutex<PendingTable>) -> MutexGuard<'_, PendingTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PendingTable {
    /// Reserves an invoke id for `address` that no outstanding request to
    /// the same peer holds.
    pub(crate) fn register(
        &mut self,
        address: DataLinkAddress,
    ) -> Result<(u8, u64, oneshot::Receiver<Outcome>), ClientError> {
        let start = self.next_invoke_id.get(&address).copied().unwrap_or(0);
        let invoke_id = (0..=u8::MAX)
            .map(|offset| start.wrapping_add(offset))
            .find(|id| !self.waiters.contains_key(&(address, *id)))
            .ok_or(ClientError::InvokeIdsExhausted)?;
        self.next_invoke_id
            .insert(address, invoke_id.wrapping_add(1));

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        let (tx, rx) = oneshot::channel();
        self.waiters.insert((address, invoke_id), Waiter { token, tx });
        Ok((invoke_id, token, rx))
    }

    /// Hands `outcome` to the request waiting on `(address, invoke_id)`.
    /// Returns `false` when nobody is waiting.
    pub(crate) fn resolve(
        &mut self,
        address: DataLinkAddress,
        invoke_id: u8,
        outcome: Outcome,
    ) -> bool {
        match self.waiters.remove(&(address, invoke_id)) {
            Some(waiter) => {
                // receiver may already be gone after a timeout race
                let _ = waiter.tx.send(outcome);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_waiting(&self, address: DataLinkAddress, invoke_id: u8) -> bool {
        self.waiters.contains_key(&(address, invoke_id))
    }

    /// Drops the entry only if it still belongs to `token`; the invoke id
    /// may have been handed to a newer request in the meantime.
    pub(crate) fn forget(&mut self, address: DataLinkAddress, invoke_id: u8, token: u64) {
        let key = (address, invoke_id);
        if self.waiters.get(&key).is_some_and(|w| w.token == token) {
            self.waiters.remove(&key);
        }
    }

    /// Fails every outstanding request with [`ClientError::Closed`].
    pub(crate) fn close_all(&mut self) {
        for (_, waiter) in self.waiters.drain() {
            let _ = waiter.tx.send(Err(ClientError::Closed));
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.waiters.len()
    }
}

/// Correlation handle for one submitted request; resolves exactly once.
///
/// Dropping it without waiting releases the invoke id.
pub struct PendingRead {
    pub(crate) address: DataLinkAddress,
    pub(crate) invoke_id: u8,
    pub(crate) token: u64,
    pub(crate) rx: Option<oneshot::Receiver<Outcome>>,
    pub(crate) table: SharedTable,
    pub(crate) timeout: Duration,
}

impl PendingRead {
    pub fn invoke_id(&self) -> u8 {
        self.invoke_id
    }

    /// Waits for the response, or [`ClientError::Timeout`] once the
    /// client's response timeout elapses.
    pub async fn wait(mut self) -> Result<ReadPropertyResponse, ClientError> {
        let rx = self.rx.take().ok_or(ClientError::Closed)?;
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ClientError::Closed),
            Err(_) => Err(ClientError::Timeout),
        }
    }
}

impl Drop for PendingRead {
    fn drop(&mut self) {
        lock(&self.table).forget(self.address, self.invoke_id, self.token);
    }
}

impl std::fmt::Debug for PendingRead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRead")
            .field("address", &self.address)
            .field("invoke_id", &self.invoke_id)
            .finish_non_exhaustive()
    }
}
