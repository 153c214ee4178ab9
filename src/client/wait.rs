//! Fixed-budget polling for server state transitions.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::CloudError;
use crate::http::Transport;

use super::{CloudClient, Record};

const DEFAULT_POLL_ATTEMPTS: u32 = 60;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Number of polls and the fixed delay between them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollPolicy {
    /// Polls made before giving up.
    pub attempts: u32,
    /// Delay between two consecutive polls.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Blocks the calling thread between polls.
pub trait Sleeper {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

impl<T: Transport, S: Sleeper> CloudClient<T, S> {
    /// Polls server `mbpkgid` until `condition` accepts its record.
    ///
    /// An API error on a poll (including "not found") is seen by
    /// `condition` as an empty record, so a condition can wait for a server
    /// to disappear. The record that satisfied `condition` is returned.
    /// Polls are separated by the configured interval; the call blocks for
    /// at most `attempts - 1` intervals plus request time.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::WaitTimeout`] when the budget is exhausted, and
    /// propagates transport and decode errors immediately.
    pub fn server_wait_for<F>(&self, mbpkgid: &str, mut condition: F) -> Result<Record, CloudError>
    where
        F: FnMut(&Record) -> bool,
    {
        for attempt in 1..=self.poll.attempts {
            let record = match self.server(mbpkgid) {
                Ok(record) => record,
                Err(CloudError::Api { status, .. }) => {
                    debug!(mbpkgid, attempt, status, "server lookup failed; treating as absent");
                    Record::new()
                }
                Err(other) => return Err(other),
            };

            if condition(&record) {
                debug!(mbpkgid, attempt, "server reached the awaited condition");
                return Ok(record);
            }

            if attempt < self.poll.attempts {
                self.sleeper.sleep(self.poll.interval);
            }
        }

        Err(CloudError::WaitTimeout {
            mbpkgid: mbpkgid.to_owned(),
        })
    }
}
