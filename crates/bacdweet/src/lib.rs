//! Periodic BACnet point polling with telemetry forwarding.
//!
//! Each configured [`Thing`] is a group of points read on one interval. A
//! scheduling task per thing wakes on wall-clock boundaries of that interval,
//! reads every point in order through a shared [`ProtocolClient`], decodes
//! and transforms the values, and pushes the resulting
//! [`TelemetryDocument`] to a [`TelemetrySink`]. A failed read only drops
//! that point from the cycle's document; a property with no known datatype
//! stops the process.

pub mod cycle;
pub mod document;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod settings;
pub mod signals;
pub mod sink;
pub mod supervisor;
pub mod thing;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use cycle::run_cycle;
pub use document::{DisplayValue, TelemetryDocument};
pub use error::{ForwardError, PollError, SettingsError};
pub use protocol::ProtocolClient;
pub use scheduler::{spawn_thing, Clock, PollContext, SystemClock, ThingFailure, ThingTask};
pub use settings::Settings;
pub use sink::{ConfiguredSink, DweetSink, LogSink, SinkKind, TelemetrySink};
pub use supervisor::Supervisor;
pub use thing::{Point, Thing};
pub use transform::transform;
