use anyhow::Result;

use super::{connect, report};
use crate::exit_codes;

pub async fn run(server: Option<String>) -> Result<i32> {
    let client = match connect(server) {
        Ok(client) => client,
        Err(e) => return Ok(report(&e)),
    };
    match client.list_devices().await {
        Ok(devices) => {
            if devices.is_empty() {
                eprintln!("No connected devices.");
            }
            for device in devices {
                println!("{device}");
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => Ok(report(&e)),
    }
}
