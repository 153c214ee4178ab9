//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::env;
use std::ffi::OsString;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::client::Sleeper;
use crate::http::{ApiRequest, ApiResponse, Transport, TransportError};

type ScriptedOutcome = Result<ApiResponse, TransportError>;

/// Scripted transport that returns pre-seeded responses in FIFO order.
///
/// Every request is recorded, so tests can assert on the exact calls a
/// client made without touching the network. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    responses: Rc<RefCell<VecDeque<ScriptedOutcome>>>,
    fallback: Rc<RefCell<Option<ApiResponse>>>,
    requests: Rc<RefCell<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    /// Creates a transport with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a JSON body.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_raw(status, &body.to_string());
    }

    /// Queues a response with an arbitrary text body.
    pub fn push_raw(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(ApiResponse {
            status,
            body: body.to_owned(),
        }));
    }

    /// Queues a transport failure (no HTTP response at all).
    pub fn push_transport_error(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError::new(message)));
    }

    /// Sets the JSON response returned once the queue is drained.
    pub fn set_fallback_json(&self, status: u16, body: &Value) {
        *self.fallback.borrow_mut() = Some(ApiResponse {
            status,
            body: body.to_string(),
        });
    }

    /// Returns a snapshot of all requests recorded so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Returns the number of requests recorded so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Returns the paths of all recorded requests, prefixed by their method.
    #[must_use]
    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(outcome) = self.responses.borrow_mut().pop_front() {
            return outcome;
        }
        self.fallback
            .borrow()
            .clone()
            .ok_or_else(|| TransportError::new("no scripted response available"))
    }
}

/// [`Sleeper`] that records requested delays instead of blocking.
#[derive(Clone, Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Creates a sleeper with no recorded delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delay requested so far.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Applies each `(key, value)` pair while holding a global mutex; a
    /// `None` value removes the variable.
    #[must_use]
    pub fn set_vars(pairs: &[(&str, Option<&str>)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe {
                match value {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
