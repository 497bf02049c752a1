// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Retry with exponential backoff around store calls.
//!
//! Before every attempt a trivial read (`SELECT 1`) wakes the backend.
//! The wake query is read-only and is always safe to repeat; if it fails for good
//! its error is returned and the operation never runs. The wrapped operation
//! is only repeated in [`RetryMode::Replayable`]; callers pick that mode for
//! reads and for writes that carry an idempotency key.

use crate::error::{LedgerError, LedgerResult};
use log::{info, warn};
use rusqlite::Connection;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay_ms,
        }
    }

    /// `base × 2^(attempt−1)` for a 1-based attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 2_u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(exp))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryMode {
    /// Safe to run the operation again after a transient failure.
    Replayable,
    /// Only the wake query is retried; the operation runs at most once.
    WakeOnly,
}

pub fn wake(conn: &Connection) -> LedgerResult<()> {
    let _: i64 = conn.query_row("SELECT 1", [], |r| r.get(0))?;
    Ok(())
}

pub fn wrap<T, F>(conn: &Connection, policy: &RetryPolicy, mode: RetryMode, op: F) -> LedgerResult<T>
where
    F: FnMut(&Connection) -> LedgerResult<T>,
{
    wrap_with(conn, policy, mode, op, std::thread::sleep)
}

/// [`wrap`] with an injectable sleep.
pub fn wrap_with<T, F, S>(
    conn: &Connection,
    policy: &RetryPolicy,
    mode: RetryMode,
    op: F,
    sleep: S,
) -> LedgerResult<T>
where
    F: FnMut(&Connection) -> LedgerResult<T>,
    S: FnMut(Duration),
{
    retry_loop(conn, policy, mode, wake, op, sleep)
}

fn retry_loop<T, P, F, S>(
    conn: &Connection,
    policy: &RetryPolicy,
    mode: RetryMode,
    mut ping: P,
    mut op: F,
    mut sleep: S,
) -> LedgerResult<T>
where
    P: FnMut(&Connection) -> LedgerResult<()>,
    F: FnMut(&Connection) -> LedgerResult<T>,
    S: FnMut(Duration),
{
    let mut attempt: u32 = 1;
    loop {
        if let Err(err) = ping(conn) {
            if err.is_transient() && attempt < policy.max_retries {
                backoff(policy, attempt, "wake", &err, &mut sleep);
                attempt += 1;
                continue;
            }
            warn!("event=db_wake module=resilience status=error attempt={} error={}", attempt, err);
            return Err(err);
        }

        match op(conn) {
            Ok(v) => {
                if attempt > 1 {
                    info!("event=db_retry module=resilience status=recovered attempt={}", attempt);
                }
                return Ok(v);
            }
            Err(err)
                if err.is_transient()
                    && mode == RetryMode::Replayable
                    && attempt < policy.max_retries =>
            {
                backoff(policy, attempt, "operation", &err, &mut sleep);
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    warn!(
                        "event=db_retry module=resilience status=exhausted attempt={} mode={:?} error={}",
                        attempt, mode, err
                    );
                }
                return Err(err);
            }
        }
    }
}

fn backoff<S: FnMut(Duration)>(
    policy: &RetryPolicy,
    attempt: u32,
    stage: &str,
    err: &LedgerError,
    sleep: &mut S,
) {
    let delay = policy.delay_for(attempt);
    warn!(
        "event=db_retry module=resilience status=retry stage={} attempt={}/{} delay_ms={} error={}",
        stage,
        attempt,
        policy.max_retries,
        delay.as_millis(),
        err
    );
    sleep(delay);
}
