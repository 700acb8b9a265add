pub mod command;
pub mod config;
pub mod error;
pub mod options;
pub mod output;
pub mod prelude;
pub mod solax;
pub mod utils;

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::command::Command;
use crate::prelude::*;

use std::io::Write;

fn init_logging(level: &str) {
    if let Err(e) = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .try_init()
    {
        // an earlier logger stays in place and reports this
        error!("Failed to initialise logging at level {}: {}", level, e);
    }
}

/// Command-line entry point: parse, configure, run one command, print.
pub async fn app() -> anyhow::Result<()> {
    let options = Options::new();

    let config = Config::load_or_default(&options.config_file)?;
    let config = ConfigWrapper::from_config(config);
    if options.verbose {
        config.set_loglevel("debug");
    }
    if let Some(device) = &options.device {
        config.set_device(device.clone());
    }

    init_logging(&config.loglevel());
    debug!("solax {} starting", CARGO_PKG_VERSION);
    config.log_summary();

    let command = Command::from_options(&options, &config)?;

    let device = config
        .device()
        .ok_or_else(|| anyhow!("no serial device given, use --device or set device in {}", options.config_file))?;

    let transport = SerialTransport::open(&device, config.baud_rate(), config.read_timeout())
        .map_err(|err| anyhow!("failed to open {}: {}", device, err))?;
    let mut client = Client::with_dwell(transport, config.dwell());

    let result = command.execute(&mut client, options.json).await;

    if options.verbose {
        info!("Raw response: {}", Utils::hex(client.last_response()));
    }

    if let Some(output) = result? {
        println!("{}", output);
    }

    Ok(())
}
