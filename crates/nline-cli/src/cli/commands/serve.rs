use anyhow::Result;
use nline_server::ServerConfig;
use std::time::Duration;

use crate::cli::args::ServeArgs;
use crate::exit_codes;

/// File (or defaults), then `NLINE_*` env, then flags.
pub fn resolve_config(args: &ServeArgs) -> Result<ServerConfig, nline_server::ConfigError> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    }
    .with_env_overrides();

    if let Some(bind) = &args.bind {
        config = config.with_bind(bind.clone());
    }
    if let Some(secs) = args.disconnect_timeout {
        config = config.with_disconnect_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

pub async fn run(args: ServeArgs) -> Result<i32> {
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e}");
            return Ok(exit_codes::INTERNAL_ERROR);
        }
    };
    nline_server::serve(config).await?;
    Ok(exit_codes::SUCCESS)
}
