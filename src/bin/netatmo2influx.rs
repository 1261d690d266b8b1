use anyhow::Context;
use argh::FromArgs;
use netatmo2influx::{Config, CycleOutcome, Poller, SyncMode};

#[derive(FromArgs)]
/// Copies Netatmo weather station readings into InfluxDB
struct Args {
    /// run a single cycle and exit
    #[argh(switch)]
    once: bool,

    /// write only the current dashboard values instead of the history since the last stored point
    #[argh(switch)]
    latest: bool,

    /// dotenv file to load instead of ./.env
    #[argh(option)]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    match &args.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("Failed to load '{path}'"))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let config = Config::from_env().context("Invalid configuration")?;
    let mode = if args.latest {
        SyncMode::Latest
    } else {
        SyncMode::Interval
    };
    log::info!(
        "Polling every {} minutes, timestamps in {}",
        config.poll.interval.as_secs() / 60,
        config.timezone
    );

    let poller = Poller::from_config(config, mode)?;
    let result = if args.once {
        poller.run_cycle().await.map(|outcome| {
            if outcome == CycleOutcome::StationUnavailable {
                log::warn!("No station data this cycle");
            }
        })
    } else {
        poller.run_until_interrupted().await
    };

    if let Err(e) = &result {
        log::error!("Stopping: {e}");
    }
    result?;
    log::info!("Shut down");
    Ok(())
}
