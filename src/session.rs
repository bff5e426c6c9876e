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

//! Sessions, producers and consumers over an external transport.
//!
//! The transport is a collaborator, not part of this crate: connection
//! establishment, the physical put/get calls and transaction execution all
//! live behind the [`Transport`] trait. What this layer owns is the
//! translation work around those calls: stamping descriptors on send,
//! normalizing bodies on receive, compiling selectors up front, and the
//! deferred-error bookkeeping for asynchronous puts.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::async_put::{check_outcome, AsyncPutTracker, DeliveryStats};
use crate::descriptor::DeliveryMode;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::selector::Selector;

/// Default number of asynchronous sends between delivery-statistics probes.
pub const DEFAULT_ASYNC_PUT_CHECK_INTERVAL: u32 = 50;

/// Per-call options for [`Transport::put`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// When set, the call may return before the provider confirms
    /// acceptance; failures surface later through
    /// [`Transport::delivery_stats`].
    pub async_put: bool,
}

/// The boundary to the external queueing provider.
///
/// Implementations do the actual I/O. Everything this crate guarantees is
/// computed client-side around these five calls.
pub trait Transport: Send {
    /// Enqueues `message` on `queue`.
    fn put(&mut self, queue: &str, message: &Message, options: &PutOptions) -> Result<()>;

    /// Dequeues the next message from `queue` matching `selector`, or
    /// `None` when nothing is available. The returned message's descriptor
    /// and properties are provider-populated.
    fn get(&mut self, queue: &str, selector: &Selector) -> Result<Option<Message>>;

    /// Reports counts for asynchronous puts since the last call, resetting
    /// them.
    fn delivery_stats(&mut self) -> Result<DeliveryStats>;

    /// Commits the current unit of work.
    fn commit(&mut self) -> Result<()>;

    /// Rolls back the current unit of work.
    fn rollback(&mut self) -> Result<()>;
}

/// Session options.
///
/// # Example
///
/// ```no_run
/// # fn transport() -> Box<dyn mqjms::Transport> { unimplemented!() }
/// let session = mqjms::SessionOptions::new()
///     .transacted(true)
///     .async_put_check_interval(25)
///     .session(transport());
/// ```
#[derive(Debug, Clone)]
pub struct SessionOptions {
    transacted: bool,
    async_put_check_interval: u32,
    application_name: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> SessionOptions {
        SessionOptions {
            transacted: false,
            async_put_check_interval: DEFAULT_ASYNC_PUT_CHECK_INTERVAL,
            application_name: None,
        }
    }
}

impl SessionOptions {
    pub fn new() -> SessionOptions {
        SessionOptions::default()
    }

    /// Makes sends and receives part of a unit of work completed by
    /// [`Session::commit`] or [`Session::rollback`].
    pub fn transacted(mut self, transacted: bool) -> SessionOptions {
        self.transacted = transacted;
        self
    }

    /// Number of asynchronous sends between delivery-statistics probes.
    /// Zero is treated as one.
    pub fn async_put_check_interval(mut self, interval: u32) -> SessionOptions {
        self.async_put_check_interval = interval;
        self
    }

    /// Application name stamped into the descriptor of sent messages and
    /// visible to receivers through the `AppID` property.
    pub fn application_name(mut self, name: &str) -> SessionOptions {
        self.application_name = Some(name.to_string());
        self
    }

    /// Builds a [`Session`] over `transport`.
    pub fn session(self, transport: Box<dyn Transport>) -> Session {
        Session {
            shared: Arc::new(SharedState {
                transport: Mutex::new(transport),
                tracker: Mutex::new(AsyncPutTracker::new(self.async_put_check_interval)),
                transacted: self.transacted,
                application_name: self.application_name,
            }),
        }
    }
}

struct SharedState {
    transport: Mutex<Box<dyn Transport>>,
    tracker: Mutex<AsyncPutTracker>,
    transacted: bool,
    application_name: Option<String>,
}

/// A session: the message factory and the home of the per-session
/// bookkeeping shared by its producers and its commit path.
///
/// Sessions are intended for single-threaded use; the only internal lock is
/// the one the async-put tracker needs, because a send and a commit on the
/// same session both read-modify-write its state.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SharedState>,
}

impl Session {
    /// Creates a session with default options. See [`SessionOptions`] for
    /// the configurable form.
    pub fn new(transport: Box<dyn Transport>) -> Session {
        SessionOptions::new().session(transport)
    }

    /// True when this session is part of a unit of work.
    pub fn is_transacted(&self) -> bool {
        self.shared.transacted
    }

    /// The current async-put tracker state, for observability.
    pub fn async_put_state(&self) -> crate::async_put::AsyncPutState {
        self.shared.tracker.lock().state()
    }

    /// Creates an empty text message.
    pub fn create_text_message(&self) -> Message {
        Message::text()
    }

    /// Creates a text message pre-populated with `body`.
    pub fn create_text_message_with(&self, body: impl Into<String>) -> Message {
        Message::text_with(body)
    }

    /// Creates an empty bytes message.
    pub fn create_bytes_message(&self) -> Message {
        Message::bytes()
    }

    /// Creates a bytes message pre-populated with `payload`.
    pub fn create_bytes_message_with(&self, payload: impl AsRef<[u8]>) -> Message {
        Message::bytes_with(payload)
    }

    /// Creates a producer for `queue`.
    pub fn create_producer(&self, queue: &str) -> Producer {
        Producer {
            session: self.clone(),
            queue: queue.to_string(),
            delivery_mode: DeliveryMode::default(),
            priority: None,
            time_to_live_ms: 0,
            async_put: false,
        }
    }

    /// Creates an unfiltered consumer for `queue`.
    pub fn create_consumer(&self, queue: &str) -> Consumer {
        Consumer {
            session: self.clone(),
            queue: queue.to_string(),
            selector: Selector::none(),
        }
    }

    /// Creates a consumer for `queue` delivering only messages matching
    /// `selector`. The selector is compiled here; a bad selector fails the
    /// consumer creation, never a receive.
    pub fn create_consumer_with_selector(
        &self,
        queue: &str,
        selector: &str,
    ) -> Result<Consumer> {
        let selector = Selector::compile(selector)?;
        Ok(Consumer {
            session: self.clone(),
            queue: queue.to_string(),
            selector,
        })
    }

    /// Commits the current unit of work.
    ///
    /// If a persistent message was put asynchronously in this transaction,
    /// exactly one delivery-statistics probe runs first; a failure it finds
    /// is linked into the commit error rather than replacing it.
    pub fn commit(&self) -> Result<()> {
        let mut tracker = self.shared.tracker.lock();
        let check_due = tracker.take_commit_check();
        let mut transport = self.shared.transport.lock();

        let async_outcome = if check_due {
            transport
                .delivery_stats()
                .and_then(check_outcome)
        } else {
            Ok(())
        };

        let commit_outcome = transport.commit();

        match (commit_outcome, async_outcome) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(async_err)) => Err(Error::with_source(
                crate::error::ErrorKind::CommitIncomplete,
                async_err,
            )),
            (Err(commit_err), Ok(())) => Err(commit_err),
            (Err(commit_err), Err(async_err)) => {
                // The commit failure stays primary; the async failure rides
                // along as its cause chain.
                Err(Error::with_source(commit_err.kind(), async_err))
            }
        }
    }

    /// Rolls back the current unit of work. Any deferred async-put check
    /// pending for this transaction is discarded with it.
    pub fn rollback(&self) -> Result<()> {
        let mut tracker = self.shared.tracker.lock();
        let _ = tracker.take_commit_check();
        let mut transport = self.shared.transport.lock();
        transport.rollback()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("transacted", &self.shared.transacted)
            .field("application_name", &self.shared.application_name)
            .field("tracker", &*self.shared.tracker.lock())
            .finish()
    }
}

/// Sends messages to one queue.
#[derive(Debug, Clone)]
pub struct Producer {
    session: Session,
    queue: String,
    delivery_mode: DeliveryMode,
    priority: Option<i32>,
    time_to_live_ms: i64,
    async_put: bool,
}

impl Producer {
    /// Persistence applied to sent messages.
    pub fn delivery_mode(mut self, mode: DeliveryMode) -> Producer {
        self.delivery_mode = mode;
        self
    }

    /// Priority stamped on sent messages. Unset leaves each message's own
    /// priority in place.
    pub fn priority(mut self, priority: i32) -> Producer {
        self.priority = Some(priority);
        self
    }

    /// Time to live in milliseconds, translated to the native tenths of a
    /// second on send. Zero means messages never expire.
    pub fn time_to_live(mut self, millis: i64) -> Producer {
        self.time_to_live_ms = millis;
        self
    }

    /// Requests asynchronous puts: sends return before the provider
    /// confirms acceptance, and failures surface through periodic
    /// delivery-statistics probes or at commit.
    pub fn async_put(mut self, enabled: bool) -> Producer {
        self.async_put = enabled;
        self
    }

    /// Sends `message` to this producer's queue.
    ///
    /// The message descriptor is stamped with this producer's delivery
    /// options and the put instant before the transport call.
    pub fn send(&self, message: &mut Message) -> Result<()> {
        self.stamp(message);

        let shared = &self.session.shared;
        if !self.async_put {
            let mut transport = shared.transport.lock();
            return transport.put(
                &self.queue,
                message,
                &PutOptions { async_put: false },
            );
        }

        // The tracker lock spans the put and any probe it triggers; a
        // concurrent commit on the same session reads the same state.
        let mut tracker = shared.tracker.lock();
        let persistent = self.delivery_mode == DeliveryMode::Persistent;
        let check_due = tracker.record_send(shared.transacted, persistent);

        let mut transport = shared.transport.lock();
        transport.put(&self.queue, message, &PutOptions { async_put: true })?;

        if check_due {
            let stats = transport.delivery_stats()?;
            check_outcome(stats)?;
        }
        Ok(())
    }

    fn stamp(&self, message: &mut Message) {
        let md = &mut message.descriptor;
        md.delivery_mode = self.delivery_mode;
        if let Some(priority) = self.priority {
            md.priority = priority;
        }
        md.expiry = if self.time_to_live_ms == 0 {
            0
        } else {
            // Never let a short but positive time to live round down to
            // "never expires".
            ((self.time_to_live_ms / 100) as i32).max(1)
        };
        if let Some(name) = &self.session.shared.application_name {
            md.put_appl_name = name.clone();
        }
        md.stamp_put_instant(OffsetDateTime::now_utc());
    }
}

/// Receives messages from one queue, optionally through a compiled
/// selector.
#[derive(Debug, Clone)]
pub struct Consumer {
    session: Session,
    queue: String,
    selector: Selector,
}

impl Consumer {
    /// The compiled selector this consumer filters with.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Receives the next available matching message, or `None` when the
    /// queue has nothing for this consumer.
    pub fn receive(&self) -> Result<Option<Message>> {
        let mut transport = self.session.shared.transport.lock();
        let message = transport.get(&self.queue, &self.selector)?;
        drop(transport);

        Ok(message.map(|mut message| {
            message.normalize_received_body();
            message
        }))
    }
}
