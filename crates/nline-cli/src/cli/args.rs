use clap::{Parser, Subcommand};
use nline_core::{DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nline",
    version,
    about = "N-in-a-row on an N×N board: match server, online client and hot-seat play"
)]
pub struct Cli {
    /// Game server base URL
    #[arg(long, global = true, env = "NLINE_SERVER_URL")]
    pub server: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the match server
    Serve(ServeArgs),
    /// Register this device and print its id
    Register(RegisterArgs),
    /// List connected devices
    Devices,
    /// Show a device's wins, losses and ratio
    Stats(StatsArgs),
    /// Find an opponent and play online
    Play(PlayArgs),
    /// Two players on one terminal
    Local(LocalArgs),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ServeArgs {
    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(long)]
    pub bind: Option<String>,

    /// Seconds of inactivity before a device is dropped
    #[arg(long, value_name = "SECS")]
    pub disconnect_timeout: Option<u64>,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RegisterArgs {
    /// Display name (defaults to the first 8 characters of the id)
    #[arg(long)]
    pub alias: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Device id
    pub device_id: String,

    /// Print the raw JSON response
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayArgs {
    /// Board size
    #[arg(long, default_value_t = DEFAULT_SIZE, value_parser = parse_size)]
    pub size: usize,

    /// Reuse an already registered device instead of registering a new one
    #[arg(long)]
    pub device_id: Option<String>,

    /// Alias used when registering
    #[arg(long)]
    pub alias: Option<String>,

    /// Polling interval in milliseconds
    #[arg(long, env = "NLINE_POLL_INTERVAL_MS")]
    pub poll_ms: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct LocalArgs {
    /// Board size
    #[arg(long, default_value_t = DEFAULT_SIZE, value_parser = parse_size)]
    pub size: usize,
}

fn parse_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if (MIN_SIZE..=MAX_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!("size must be between {MIN_SIZE} and {MAX_SIZE}"))
    }
}
