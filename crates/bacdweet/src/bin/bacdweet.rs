use bacdweet::signals::{Control, ControlSignals};
use bacdweet::{ConfiguredSink, DweetSink, LogSink, PollContext, Settings, SinkKind, Supervisor};
use bacdweet_client::BacnetClient;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "bacdweet", version, about = "Poll BACnet points and push them as telemetry")]
struct Args {
    /// Settings file; SIGHUP re-reads it.
    #[arg(long, env = "SETTINGS", default_value = "bacpypes-dweet.json")]
    settings: PathBuf,
    #[arg(long, value_enum, default_value_t = SinkKind::Dweet)]
    sink: SinkKind,
    #[arg(long, default_value = DweetSink::DEFAULT_BASE_URL)]
    dweet_url: String,
    #[arg(long, default_value_t = 3000)]
    response_timeout_ms: u64,
    #[arg(long, default_value_t = 10_000)]
    forward_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = Settings::load(&args.settings)?;
    let device = &settings.config;
    device.check()?;
    let things = settings.things()?;
    info!(
        "device {} ({}) vendor {} on {}",
        device.object_name, device.object_identifier, device.vendor_identifier, device.address
    );

    let bind_addr = device.bind_address()?;
    let (client, _renewal) = match device.foreign_registration()? {
        Some((bbmd, ttl)) => {
            info!("registering with bbmd {bbmd} for {ttl}s");
            let client = BacnetClient::bind_foreign(bind_addr, bbmd, ttl).await?;
            let renewal = client.start_foreign_device_renewal(ttl)?;
            (client, Some(renewal))
        }
        None => (BacnetClient::bind(bind_addr).await?, None),
    };
    let client = client
        .with_response_timeout(Duration::from_millis(args.response_timeout_ms))
        .with_max_apdu_length(device.max_apdu_length_accepted);
    info!("responses time out after {:?}", client.response_timeout());

    let sink = match args.sink {
        SinkKind::Dweet => ConfiguredSink::Dweet(DweetSink::new(
            &args.dweet_url,
            Duration::from_millis(args.forward_timeout_ms),
        )?),
        SinkKind::Log => ConfiguredSink::Log(LogSink),
    };

    let mut signals = ControlSignals::install()?;
    let (mut supervisor, mut failures) =
        Supervisor::new(PollContext::new(Arc::new(client), Arc::new(sink)));
    supervisor.start(things);

    loop {
        tokio::select! {
            control = signals.next() => match control {
                Control::Reload => {
                    info!("reloading {}", args.settings.display());
                    if let Err(err) = supervisor.reload(&args.settings) {
                        error!("reload rejected, keeping current things: {err}");
                    }
                }
                Control::Shutdown => {
                    info!("shutting down");
                    break;
                }
            },
            Some(failure) = failures.recv() => {
                supervisor.stop_all();
                return Err(format!("{}: {}", failure.thing, failure.error).into());
            }
        }
    }

    supervisor.stop_all();
    Ok(())
}
