//! Operator input: one integer measurement per line

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use beatchain_core::{BeatError, BeatResult};
use beatchain_runtime::SyncNode;

/// Read measurements from stdin until EOF, re-prompting on bad input
pub async fn run(node: &SyncNode) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            tracing::info!("stdin closed");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let measurement = match parse_measurement(&line) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        if let Err(e) = node.submit_measurement(measurement) {
            tracing::warn!("measurement {} not recorded: {}", measurement, e);
        }
    }
}

/// Parse one line of operator input as a base-10 integer
pub fn parse_measurement(input: &str) -> BeatResult<i64> {
    let input = input.trim();
    input
        .parse::<i64>()
        .map_err(|e| BeatError::InvalidMeasurement(format!("{:?}: {}", input, e)))
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
