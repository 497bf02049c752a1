// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, Context, Result};
use flexi_logger::{Logger, LoggerHandle};
use log::info;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

pub fn normalize_level(level: &str) -> Result<&'static str> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|l| **l == wanted)
        .copied()
        .ok_or_else(|| anyhow!("Unsupported log level '{}'", level))
}

/// Starts stderr logging. Keep the returned handle alive for the whole run.
pub fn init_logging(level: &str) -> Result<LoggerHandle> {
    let level = normalize_level(level)?;
    let handle = Logger::try_with_str(level)
        .with_context(|| format!("Invalid log level '{}'", level))?
        .log_to_stderr()
        .format_for_stderr(flexi_logger::detailed_format)
        .start()
        .context("Failed to start logger")?;
    info!(
        "event=app_start module=logging status=ok level={} version={}",
        level,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" WARN ").unwrap(), "warn");
        assert!(normalize_level("verbose").is_err());
    }
}
