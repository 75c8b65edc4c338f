//! `dooya`: send one command to a Dooya shutter motor from a Raspberry Pi.
//!
//! Wire the data input of a 433 MHz OOK transmitter to a GPIO pin (BCM 17 by
//! default) and run e.g. `dooya up -r 0x42 -c 1`.

use std::num::ParseIntError;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rppal::gpio::Gpio;
use tracing::{debug, info};

use dooya433::consts::{DEFAULT_CHANNEL, DEFAULT_REMOTE_ID};
use dooya433::delay::SpinDelay;
use dooya433::lock::{DEFAULT_LOCK_PATH, DEFAULT_RETRIES, DEFAULT_RETRY_INTERVAL, PidLock};
use dooya433::{Action, Header, PulseDriver, Remote};

const DEFAULT_PIN: u8 = 17;

#[derive(Parser, Debug)]
#[command(name = "dooya")]
#[command(
    about = "Control Dooya (and derivative) window shutter motors over their 433MHz RF protocol"
)]
struct Cli {
    /// The command to execute: up, down, stop, learn, p2, pair, change_direction
    command: Action,

    /// The id of the remote control to emulate (decimal or 0x-prefixed hex)
    #[arg(short, long, value_parser = parse_remote_id, default_value_t = DEFAULT_REMOTE_ID)]
    remote_id: u16,

    /// The channel to send on
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=15), default_value_t = DEFAULT_CHANNEL)]
    channel: u8,

    /// BCM number of the GPIO pin wired to the transmitter
    #[arg(short, long, default_value_t = DEFAULT_PIN)]
    pin: u8,

    /// Pid file used to keep concurrent invocations off the transmitter
    #[arg(long, default_value = DEFAULT_LOCK_PATH)]
    lock: PathBuf,

    /// How many times to wait for a busy transmitter before giving up
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    retries: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_remote_id(s: &str) -> Result<u16, ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The library logs through `log`; `init` also installs the `tracing-log`
    // bridge so those records reach the same subscriber.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let header = Header::new(cli.remote_id, cli.channel);
    debug!("header {:#012x}", header.bits());

    let _guard = PidLock::new(&cli.lock)
        .with_retries(cli.retries, DEFAULT_RETRY_INTERVAL)
        .acquire()
        .context("transmitter is busy")?;

    let pin = Gpio::new()
        .context("failed to open GPIO")?
        .get(cli.pin)
        .with_context(|| format!("failed to claim GPIO {}", cli.pin))?
        .into_output_low();

    let driver = PulseDriver::new(pin, SpinDelay::new())?;
    let mut remote = Remote::new(driver, header);
    remote
        .perform(cli.command)
        .with_context(|| format!("failed to send {}", cli.command))?;

    let driver = remote.into_sink();
    info!(
        "sent {} as remote {:#06x} on channel {} ({} pulses)",
        cli.command, cli.remote_id, cli.channel, driver.pulses_sent
    );
    let _ = driver.release()?;
    Ok(())
}
