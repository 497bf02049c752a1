// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{default_db_path, DEFAULT_BUSY_TIMEOUT};
use crate::resilience::RetryPolicy;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    pub retry: RetryPolicy,
    pub log_level: String,
}

impl Config {
    /// Resolves global flags; clap already folded in the environment fallbacks.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Config> {
        let db_path = match m.get_one::<String>("db") {
            Some(p) => PathBuf::from(p.trim()),
            None => default_db_path()?,
        };
        let retries = *m.get_one::<u32>("retries").unwrap_or(&3);
        let delay_ms = *m.get_one::<u64>("retry-delay-ms").unwrap_or(&1000);
        let log_level = m
            .get_one::<String>("log-level")
            .cloned()
            .unwrap_or_else(|| "warn".to_string());
        Ok(Config {
            db_path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            retry: RetryPolicy::new(retries, delay_ms),
            log_level,
        })
    }
}
