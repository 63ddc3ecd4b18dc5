use super::args::*;
use nline_client::{ClientConfig, ClientError, GameClient};

pub mod devices;
mod input;
pub mod local;
pub mod play;
pub mod register;
pub mod serve;
pub mod stats;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let server = cli.server;
    match cli.cmd {
        Command::Serve(args) => serve::run(args).await,
        Command::Register(args) => register::run(server, args).await,
        Command::Devices => devices::run(server).await,
        Command::Stats(args) => stats::run(server, args).await,
        Command::Play(args) => play::run(server, args).await,
        Command::Local(args) => local::run(args),
    }
}

/// Client from `NLINE_*` env, with `--server` taking precedence.
pub(crate) fn client_config(server: Option<String>) -> ClientConfig {
    let config = ClientConfig::from_env();
    match server {
        Some(url) => config.with_url(url),
        None => config,
    }
}

pub(crate) fn connect(server: Option<String>) -> Result<GameClient, ClientError> {
    GameClient::new(client_config(server))
}

/// Print a client failure and pick the exit code.
pub(crate) fn report(err: &ClientError) -> i32 {
    eprintln!("error: {err}");
    err.exit_code()
}
