// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod balance;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod projects;
pub mod reports;
pub mod resilience;
pub mod service;
pub mod settlement;
pub mod store;
pub mod utils;

pub use error::{LedgerError, LedgerResult};
pub use service::Ledger;
