use crate::scheduler::{spawn_thing, PollContext, ThingFailure, ThingTask};
use crate::{ProtocolClient, Settings, SettingsError, TelemetrySink, Thing};
use log::info;
use std::path::Path;
use tokio::sync::mpsc;

/// Owns the running set of thing tasks and replaces it on reload.
pub struct Supervisor<C, S> {
    ctx: PollContext<C, S>,
    tasks: Vec<ThingTask>,
    failures: mpsc::UnboundedSender<ThingFailure>,
}

impl<C, S> Supervisor<C, S>
where
    C: ProtocolClient,
    S: TelemetrySink,
{
    /// The receiver yields every thing whose polling stopped on a fatal
    /// error.
    pub fn new(ctx: PollContext<C, S>) -> (Self, mpsc::UnboundedReceiver<ThingFailure>) {
        let (failures, rx) = mpsc::unbounded_channel();
        let supervisor = Self {
            ctx,
            tasks: Vec::new(),
            failures,
        };
        (supervisor, rx)
    }

    /// Stops every running task, then starts one per thing.
    pub fn start(&mut self, things: Vec<Thing>) {
        self.stop_all();
        self.tasks = things
            .into_iter()
            .map(|thing| spawn_thing(self.ctx.clone(), thing, self.failures.clone()))
            .collect();
        info!("{} things scheduled", self.tasks.len());
    }

    /// Re-reads `path` and swaps in its things. On error the running tasks
    /// are left alone.
    pub fn reload(&mut self, path: &Path) -> Result<usize, SettingsError> {
        let things = Settings::load(path)?.things()?;
        let count = things.len();
        self.start(things);
        Ok(count)
    }

    pub fn running(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(ThingTask::name)
    }

    pub fn stop_all(&mut self) {
        for task in self.tasks.drain(..) {
            info!("{}: stopping", task.name());
            task.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Supervisor;
    use crate::scheduler::PollContext;
    use crate::testing::{point_on, real, thing, RecordingSink, Reply, ScriptedClient, TestClock};
    use crate::{SettingsError, Thing};
    use bacdweet_core::types::{ObjectId, ObjectType};
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn supervisor(sink: &Arc<RecordingSink>) -> Supervisor<ScriptedClient, RecordingSink> {
        let client = ScriptedClient::default().reply(
            ObjectId::new(ObjectType::AnalogInput, 1),
            Reply::Value(real(1.0)),
        );
        let ctx = PollContext::new(Arc::new(client), Arc::clone(sink))
            .with_clock(Arc::new(TestClock::starting_at(secs(0))));
        Supervisor::new(ctx).0
    }

    fn one_point(name: &str) -> Thing {
        thing(name, 10, vec![point_on("a", ObjectType::AnalogInput, 1)])
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_superseded_things() {
        let sink = Arc::new(RecordingSink::default());
        let mut supervisor = supervisor(&sink);
        supervisor.start(vec![one_point("old")]);

        tokio::time::sleep(secs(25)).await;
        assert_eq!(sink.count_for("old"), 2);

        supervisor.start(vec![one_point("new")]);
        assert_eq!(supervisor.running().collect::<Vec<_>>(), ["new"]);
        tokio::time::sleep(secs(30)).await;
        assert_eq!(sink.count_for("old"), 2);
        assert_eq!(sink.count_for("new"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reload_keeps_running_things() {
        let sink = Arc::new(RecordingSink::default());
        let mut supervisor = supervisor(&sink);
        supervisor.start(vec![one_point("kept")]);

        let (path, mut file) = scratch_file("bad-settings.json");
        file.write_all(b"{ not json").unwrap();
        let err = supervisor.reload(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));

        tokio::time::sleep(secs(15)).await;
        assert_eq!(supervisor.running().collect::<Vec<_>>(), ["kept"]);
        assert_eq!(sink.count_for("kept"), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_replaces_things_from_file() {
        let sink = Arc::new(RecordingSink::default());
        let mut supervisor = supervisor(&sink);
        supervisor.start(vec![one_point("old")]);

        let (path, mut file) = scratch_file("good-settings.json");
        file.write_all(
            br#"{ "config": { "objectName": "x", "address": "10.0.0.1",
                  "objectIdentifier": 1, "vendorIdentifier": 15 },
                  "dweets": [
                    { "thingName": "east", "interval": 10, "tagList": [
                      { "address": "192.168.1.20", "objectType": "analogInput",
                        "objectInstance": 1, "tag": "a" } ] },
                    { "thingName": "west", "interval": 20, "tagList": [] } ] }"#,
        )
        .unwrap();
        assert_eq!(supervisor.reload(&path).unwrap(), 2);
        assert_eq!(supervisor.running().collect::<Vec<_>>(), ["east", "west"]);

        tokio::time::sleep(secs(15)).await;
        assert_eq!(sink.count_for("east"), 1);
        assert_eq!(sink.count_for("old"), 0);
        // no points, nothing to forward
        assert_eq!(sink.count_for("west"), 0);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn stop_all_empties_the_set() {
        let sink = Arc::new(RecordingSink::default());
        let mut supervisor = supervisor(&sink);
        supervisor.start(vec![one_point("a"), one_point("b")]);
        supervisor.stop_all();
        assert_eq!(supervisor.running().count(), 0);
    }

    fn scratch_file(name: &str) -> (PathBuf, File) {
        let path = std::env::temp_dir().join(format!("bacdweet-{}-{name}", std::process::id()));
        let file = File::create(&path).unwrap();
        (path, file)
    }
}
