use crate::{
    Clock, ForwardError, Point, ProtocolClient, TelemetryDocument, TelemetrySink, Thing,
};
use bacdweet_client::{ClientError, ReadPropertyResponse, ReadRequest};
use bacdweet_core::types::{ObjectId, ObjectType, PropertyId};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn point(tag: &str) -> Point {
    Point {
        address: "192.168.1.20".parse().unwrap(),
        object_id: ObjectId::new(ObjectType::AnalogInput, 1),
        property_id: PropertyId::PresentValue,
        array_index: None,
        tag: tag.to_owned(),
        active_label: None,
        inactive_label: None,
        precision: None,
    }
}

pub(crate) fn point_on(tag: &str, object_type: ObjectType, instance: u32) -> Point {
    Point {
        object_id: ObjectId::new(object_type, instance),
        ..point(tag)
    }
}

pub(crate) fn thing(name: &str, interval_secs: u64, points: Vec<Point>) -> Thing {
    Thing {
        name: name.to_owned(),
        interval: Duration::from_secs(interval_secs),
        points,
    }
}

pub(crate) fn real(v: f32) -> Vec<u8> {
    let mut raw = vec![0x44];
    raw.extend_from_slice(&v.to_be_bytes());
    raw
}

pub(crate) fn enumerated(v: u8) -> Vec<u8> {
    vec![0x91, v]
}

pub(crate) enum Reply {
    Value(Vec<u8>),
    Timeout,
    Reject,
    /// Acknowledges with a different object identifier than requested.
    Relabelled(ObjectId, Vec<u8>),
}

/// Answers each read from a fixed table keyed by object identifier and
/// records every request it was given.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    replies: HashMap<ObjectId, Reply>,
    requests: Mutex<Vec<ReadRequest>>,
}

impl ScriptedClient {
    pub(crate) fn reply(mut self, object_id: ObjectId, reply: Reply) -> Self {
        self.replies.insert(object_id, reply);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ReadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProtocolClient for ScriptedClient {
    type Handle = ReadRequest;

    async fn submit(&self, request: ReadRequest) -> Result<ReadRequest, ClientError> {
        self.requests.lock().unwrap().push(request);
        Ok(request)
    }

    async fn await_result(
        &self,
        request: ReadRequest,
    ) -> Result<ReadPropertyResponse, ClientError> {
        let respond = |object_id: ObjectId, raw: &[u8]| ReadPropertyResponse {
            object_id,
            property_id: request.property_id,
            array_index: request.array_index,
            value: raw.to_vec(),
        };
        match self.replies.get(&request.object_id) {
            Some(Reply::Value(raw)) => Ok(respond(request.object_id, raw)),
            Some(Reply::Relabelled(object_id, raw)) => Ok(respond(*object_id, raw)),
            Some(Reply::Reject) => Err(ClientError::RemoteReject { reason: 9 }),
            Some(Reply::Timeout) | None => Err(ClientError::Timeout),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    pushed: Mutex<Vec<(String, TelemetryDocument)>>,
    failing: bool,
}

impl RecordingSink {
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub(crate) fn pushed(&self) -> Vec<(String, TelemetryDocument)> {
        self.pushed.lock().unwrap().clone()
    }

    pub(crate) fn count_for(&self, subject: &str) -> usize {
        self.pushed
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == subject)
            .count()
    }
}

impl TelemetrySink for RecordingSink {
    async fn push(&self, subject: &str, document: &TelemetryDocument) -> Result<(), ForwardError> {
        self.pushed
            .lock()
            .unwrap()
            .push((subject.to_owned(), document.clone()));
        if self.failing {
            return Err(ForwardError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }
}

/// Wall clock that follows tokio's (pausable) time.
pub(crate) struct TestClock {
    origin: tokio::time::Instant,
    start: Duration,
}

impl TestClock {
    pub(crate) fn starting_at(start: Duration) -> Self {
        Self {
            origin: tokio::time::Instant::now(),
            start,
        }
    }
}

impl Clock for TestClock {
    fn since_epoch(&self) -> Duration {
        self.start + self.origin.elapsed()
    }
}
