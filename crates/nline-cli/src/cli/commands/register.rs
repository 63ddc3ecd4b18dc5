use anyhow::Result;

use super::{connect, report};
use crate::cli::args::RegisterArgs;
use crate::exit_codes;

pub async fn run(server: Option<String>, args: RegisterArgs) -> Result<i32> {
    let client = match connect(server) {
        Ok(client) => client,
        Err(e) => return Ok(report(&e)),
    };
    match client.register(args.alias.as_deref()).await {
        Ok(device_id) => {
            println!("{device_id}");
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(report(&e)),
    }
}
