use anyhow::Result;
use nline_core::{DeviceId, DeviceInfo};

use super::{connect, report};
use crate::cli::args::StatsArgs;
use crate::exit_codes;

pub async fn run(server: Option<String>, args: StatsArgs) -> Result<i32> {
    let client = match connect(server) {
        Ok(client) => client,
        Err(e) => return Ok(report(&e)),
    };
    let info = match client.stats(&DeviceId::new(args.device_id)).await {
        Ok(info) => info,
        Err(e) => return Ok(report(&e)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", format_stats(&info));
    }
    Ok(exit_codes::SUCCESS)
}

fn format_stats(info: &DeviceInfo) -> String {
    format!(
        "{}: {} wins, {} losses, ratio {:.2}",
        info.alias, info.wins, info.losses, info.ratio
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stats() {
        let info = DeviceInfo {
            connected: true,
            alias: "ana".into(),
            wins: 2,
            losses: 1,
            ratio: 2.0 / 3.0,
        };
        assert_eq!(format_stats(&info), "ana: 2 wins, 1 losses, ratio 0.67");
    }
}
