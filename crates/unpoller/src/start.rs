// Startup and mode dispatch
//
// Load settings, set up logging, register the UniFi input and the outputs
// the mode asks for, then hand control to the poller.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use unpoller_config::{ConfigError, Mode, Settings, find_config, load_env, load_file};
use unpoller_core::{Poller, UnifiInput};
use unpoller_influx::InfluxOutput;
use unpoller_prom::PromOutput;

use crate::cli::Cli;
use crate::dump::dump_json;
use crate::error::CliError;

/// Settings from the first readable file, or from defaults and the
/// environment when none of the listed files exist.
fn load_settings(cli: &Cli) -> Result<(Option<PathBuf>, Settings), CliError> {
    let (path, mut settings) = match find_config(&cli.config) {
        Ok(path) => {
            let settings = load_file(&path)?;
            (Some(path), settings)
        }
        Err(ConfigError::NoConfigFile { .. }) => (None, load_env()?),
        Err(err) => return Err(err.into()),
    };

    settings.poller.debug |= cli.debug;
    settings.poller.quiet |= cli.quiet;
    if cli.verify_ssl {
        settings.force_verify_ssl();
    }
    Ok((path, settings))
}

fn init_tracing(debug: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if debug {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let (path, settings) = load_settings(&cli)?;
    let (debug, quiet) = (settings.poller.debug, settings.poller.quiet);
    init_tracing(debug, quiet);

    let unifi = Arc::new(UnifiInput::new(settings.unifi_config()?));

    if let Some(spec) = &cli.dumpjson {
        return dump_json(&unifi, spec).await;
    }

    let mode = settings.mode()?;
    info!(
        "unpoller v{} Starting Up! PID: {}",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );
    match &path {
        Some(path) => info!("Loaded Configuration: {}", path.display()),
        None => warn!(
            "No readable config file in '{}'; using defaults and environment",
            cli.config
        ),
    }
    info!("Mode: {mode}");

    let mut poller = Poller::new(debug, quiet);
    poller.register_input(unifi);

    if mode == Mode::Lambda {
        if let Err(err) = poller.initialize_inputs().await {
            error!("{err}");
        }
        let influx = InfluxOutput::new(settings.influx_config()?);
        influx.run_once(&poller).await?;
        return Ok(());
    }

    if mode.push() {
        poller.register_output(Arc::new(InfluxOutput::new(settings.influx_config()?)));
    }
    if mode.pull() {
        poller.register_output(Arc::new(PromOutput::new(settings.prom_config())));
    }

    if let Err(err) = poller.initialize_inputs().await {
        error!("{err}");
    }

    Arc::new(poller).run_outputs().await?;
    Ok(())
}
