use crate::sink::forward;
use crate::{run_cycle, PollError, ProtocolClient, TelemetrySink, Thing};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn since_epoch(&self) -> Duration;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn since_epoch(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Time left until the next multiple of `interval` since the epoch. Exactly
/// on a boundary waits a full interval.
pub fn delay_until_next_boundary(since_epoch: Duration, interval: Duration) -> Duration {
    let interval_nanos = interval.as_nanos();
    if interval_nanos == 0 {
        return Duration::ZERO;
    }
    let remaining = interval_nanos - since_epoch.as_nanos() % interval_nanos;
    Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX))
}

/// What every thing's task shares: the protocol client, the sink and the
/// clock.
pub struct PollContext<C, S> {
    pub client: Arc<C>,
    pub sink: Arc<S>,
    pub clock: Arc<dyn Clock>,
}

impl<C, S> PollContext<C, S> {
    pub fn new(client: Arc<C>, sink: Arc<S>) -> Self {
        Self {
            client,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<C, S> Clone for PollContext<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            sink: Arc::clone(&self.sink),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// A thing whose scheduler stopped on a fatal error.
#[derive(Debug)]
pub struct ThingFailure {
    pub thing: String,
    pub error: PollError,
}

/// Owns one thing's scheduling task. Stopping or dropping it aborts the
/// task wherever it is suspended.
#[derive(Debug)]
pub struct ThingTask {
    name: String,
    task: JoinHandle<()>,
}

impl ThingTask {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for ThingTask {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts polling `thing` on its own task. A fatal error ends the task and
/// is reported on `failures`.
pub fn spawn_thing<C, S>(
    ctx: PollContext<C, S>,
    thing: Thing,
    failures: mpsc::UnboundedSender<ThingFailure>,
) -> ThingTask
where
    C: ProtocolClient,
    S: TelemetrySink,
{
    let name = thing.name.clone();
    let task = tokio::spawn(async move {
        let error = run_thing(&ctx, &thing).await;
        error!("{}: polling stopped: {error}", thing.name);
        let _ = failures.send(ThingFailure {
            thing: thing.name,
            error,
        });
    });
    ThingTask { name, task }
}

/// Polls `thing` on every interval boundary until a fatal error.
///
/// The next wake-up is computed from the clock after each cycle, so a cycle
/// that overruns its interval resumes on the following boundary.
pub async fn run_thing<C, S>(ctx: &PollContext<C, S>, thing: &Thing) -> PollError
where
    C: ProtocolClient,
    S: TelemetrySink,
{
    info!(
        "{}: polling {} points every {}s",
        thing.name,
        thing.points.len(),
        thing.interval.as_secs()
    );
    loop {
        let delay = delay_until_next_boundary(ctx.clock.since_epoch(), thing.interval);
        tokio::time::sleep(delay).await;
        debug!("{}: awake", thing.name);

        let document = match run_cycle(ctx.client.as_ref(), thing).await {
            Ok(document) => document,
            Err(error) => return error,
        };
        if document.is_empty() {
            debug!("{}: no values this cycle", thing.name);
            continue;
        }
        forward(ctx.sink.as_ref(), &thing.name, &document).await;
    }
}
