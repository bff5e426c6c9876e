// Copyright 2024-2026 The mqjms Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deferred-error tracking for asynchronous puts.
//!
//! An asynchronous put returns before the provider confirms acceptance, so
//! its failure is only observable later, through a delivery-statistics
//! probe. The tracker decides when that probe runs:
//!
//! * outside a transaction, on the first send (to surface configuration
//!   errors quickly) and then every `check_interval` sends;
//! * inside a transaction, exactly once at commit, and only when a
//!   persistent message was put asynchronously. Non-persistent async puts
//!   under a transaction are fire-and-forget by design.

use crate::error::{Error, ErrorKind, Result};

/// Counts reported by the provider for asynchronous puts since the last
/// probe. Reading the statistics resets them on the provider side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Puts accepted cleanly.
    pub completed: u64,
    /// Puts accepted with a warning.
    pub warnings: u64,
    /// Puts the provider rejected.
    pub failures: u64,
    /// Native reason code of the first rejection, when there was one.
    pub first_failure: Option<i32>,
}

/// Tracker state. An explicit tag, owned by the session and shared with its
/// producers and commit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncPutState {
    /// No asynchronous put is outstanding.
    Idle,
    /// Sends remaining before the next delivery-statistics probe.
    CountingDown(u32),
    /// A persistent message was put asynchronously inside the current
    /// transaction; one probe is owed at commit.
    TransactionPending,
}

#[derive(Debug)]
pub(crate) struct AsyncPutTracker {
    state: AsyncPutState,
    check_interval: u32,
}

impl AsyncPutTracker {
    /// Creates a tracker probing every `check_interval` async sends. An
    /// interval of zero is clamped to one so the countdown always
    /// terminates.
    pub(crate) fn new(check_interval: u32) -> AsyncPutTracker {
        AsyncPutTracker {
            state: AsyncPutState::Idle,
            check_interval: check_interval.max(1),
        }
    }

    pub(crate) fn state(&self) -> AsyncPutState {
        self.state
    }

    /// Records one asynchronous send and reports whether a
    /// delivery-statistics probe is due now.
    pub(crate) fn record_send(&mut self, transacted: bool, persistent: bool) -> bool {
        if transacted {
            if persistent && self.state != AsyncPutState::TransactionPending {
                log::debug!("first transactional async put, probe deferred to commit");
                self.state = AsyncPutState::TransactionPending;
            }
            return false;
        }

        match self.state {
            AsyncPutState::Idle => {
                // Probe immediately so a misconfiguration fails the first
                // send, not the fiftieth.
                self.state = AsyncPutState::CountingDown(self.check_interval);
                true
            }
            AsyncPutState::CountingDown(n) if n <= 1 => {
                self.state = AsyncPutState::CountingDown(self.check_interval);
                true
            }
            AsyncPutState::CountingDown(n) => {
                self.state = AsyncPutState::CountingDown(n - 1);
                false
            }
            AsyncPutState::TransactionPending => {
                // A commit or rollback left this behind; start over.
                log::warn!("async put tracker found stale transaction state");
                self.state = AsyncPutState::CountingDown(self.check_interval);
                true
            }
        }
    }

    /// Consulted once by commit. Returns whether a probe is owed, and
    /// resets the transactional flag either way.
    pub(crate) fn take_commit_check(&mut self) -> bool {
        let pending = self.state == AsyncPutState::TransactionPending;
        if pending {
            self.state = AsyncPutState::Idle;
        }
        pending
    }
}

/// Turns a delivery-statistics probe result into the aggregated error
/// surfaced to the application. Any warning or failure aggregates into one
/// error naming both counts; the first native reason, when the provider
/// reported one, is linked as the source so callers can distinguish a
/// probe-detected failure from a failure of the send call itself.
pub(crate) fn check_outcome(stats: DeliveryStats) -> Result<()> {
    if stats.failures == 0 && stats.warnings == 0 {
        log::debug!("async put probe clean, {} completed", stats.completed);
        return Ok(());
    }
    log::warn!(
        "async put probe found {} failures, {} warnings",
        stats.failures,
        stats.warnings
    );
    let kind = ErrorKind::AsyncPutFailed {
        failures: stats.failures,
        warnings: stats.warnings,
    };
    Err(match stats.first_failure {
        Some(reason) => {
            Error::with_source(kind, Error::new(ErrorKind::Provider(reason)))
        }
        None => Error::new(kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_send_probes_immediately() {
        let mut tracker = AsyncPutTracker::new(10);
        assert!(tracker.record_send(false, false));
        assert_eq!(tracker.state(), AsyncPutState::CountingDown(10));
    }

    #[test]
    fn countdown_probes_every_interval() {
        let mut tracker = AsyncPutTracker::new(3);
        assert!(tracker.record_send(false, false));
        assert!(!tracker.record_send(false, false));
        assert!(!tracker.record_send(false, false));
        assert!(tracker.record_send(false, false));
        assert_eq!(tracker.state(), AsyncPutState::CountingDown(3));
    }

    #[test]
    fn interval_one_probes_every_send() {
        let mut tracker = AsyncPutTracker::new(1);
        for _ in 0..3 {
            assert!(tracker.record_send(false, false));
        }
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut tracker = AsyncPutTracker::new(0);
        assert!(tracker.record_send(false, false));
        assert!(tracker.record_send(false, false));
    }

    #[test]
    fn transactional_persistent_defers_to_commit() {
        let mut tracker = AsyncPutTracker::new(1);
        assert!(!tracker.record_send(true, true));
        assert_eq!(tracker.state(), AsyncPutState::TransactionPending);
        // More sends change nothing.
        assert!(!tracker.record_send(true, true));

        assert!(tracker.take_commit_check());
        assert_eq!(tracker.state(), AsyncPutState::Idle);
        // Exactly once.
        assert!(!tracker.take_commit_check());
    }

    #[test]
    fn transactional_non_persistent_is_fire_and_forget() {
        let mut tracker = AsyncPutTracker::new(1);
        assert!(!tracker.record_send(true, false));
        assert_eq!(tracker.state(), AsyncPutState::Idle);
        assert!(!tracker.take_commit_check());
    }

    #[test]
    fn clean_stats_pass() {
        assert!(check_outcome(DeliveryStats {
            completed: 5,
            ..DeliveryStats::default()
        })
        .is_ok());
    }

    #[test]
    fn failures_aggregate_with_reason() {
        let err = check_outcome(DeliveryStats {
            completed: 3,
            warnings: 1,
            failures: 2,
            first_failure: Some(2053),
        })
        .unwrap_err();

        assert_eq!(
            err.kind(),
            ErrorKind::AsyncPutFailed {
                failures: 2,
                warnings: 1
            }
        );
        let source = std::error::Error::source(&err).expect("native reason linked");
        assert!(source.to_string().contains("2053"));
    }

    #[test]
    fn warnings_alone_still_surface() {
        let err = check_outcome(DeliveryStats {
            completed: 4,
            warnings: 1,
            ..DeliveryStats::default()
        })
        .unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::AsyncPutFailed {
                failures: 0,
                warnings: 1
            }
        );
        assert!(std::error::Error::source(&err).is_none());
    }
}
