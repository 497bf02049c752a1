// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod projects;
pub mod transactions;
pub mod reports;
pub mod exporter;
pub mod doctor;

use anyhow::{Context, Result};

/// Value of an argument clap already marked as required.
pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .with_context(|| format!("--{} is required", name))
}

pub(crate) fn optional(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
