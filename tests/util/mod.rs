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

//! An in-memory transport double for integration tests.
//!
//! Delivers by descending priority with FIFO order inside each priority,
//! the way the real provider does. Supports staging under a unit of work
//! and failure injection for asynchronous puts.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use mqjms::{DeliveryStats, Message, PutOptions, Result, Selector, Transport};

/// Native reason code used for injected put failures.
pub const REASON_QUEUE_FULL: i32 = 2053;

/// Enables log capture for a test. Honors `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct QueuedMessage {
    priority: i32,
    seq: u64,
    message: Message,
}

impl PartialEq for QueuedMessage {
    fn eq(&self, other: &QueuedMessage) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedMessage {}

impl PartialOrd for QueuedMessage {
    fn partial_cmp(&self, other: &QueuedMessage) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedMessage {
    fn cmp(&self, other: &QueuedMessage) -> Ordering {
        // Max-heap: higher priority first, then lower sequence (FIFO).
        self.priority
            .cmp(&other.priority)
            .then(other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
pub struct MemoryTransport {
    queues: HashMap<String, BinaryHeap<QueuedMessage>>,
    staged: Vec<(String, QueuedMessage)>,
    transacted: bool,
    seq: u64,
    async_puts: u64,
    fail_async: HashSet<u64>,
    stats: DeliveryStats,
}

impl MemoryTransport {
    pub fn new() -> MemoryTransport {
        MemoryTransport::default()
    }

    /// Stages puts until `commit` instead of delivering them directly.
    pub fn transacted(mut self) -> MemoryTransport {
        self.transacted = true;
        self
    }

    /// Rejects the `n`th asynchronous put (1-based), recording the failure
    /// in the delivery statistics the way a deferred provider error is.
    pub fn fail_async_put(mut self, n: u64) -> MemoryTransport {
        self.fail_async.insert(n);
        self
    }

    pub fn boxed(self) -> Box<dyn Transport> {
        Box::new(self)
    }

    /// Boxes this transport while keeping a handle for inspection.
    pub fn shared(self) -> (Box<dyn Transport>, SharedMemoryTransport) {
        let shared = SharedMemoryTransport {
            inner: Arc::new(Mutex::new(self)),
        };
        (Box::new(shared.clone()), shared)
    }

    /// Number of messages currently deliverable on `queue`.
    pub fn depth(&self, queue: &str) -> usize {
        self.queues.get(queue).map_or(0, BinaryHeap::len)
    }
}

impl Transport for MemoryTransport {
    fn put(&mut self, queue: &str, message: &Message, options: &PutOptions) -> Result<()> {
        if options.async_put {
            self.async_puts += 1;
            if self.fail_async.contains(&self.async_puts) {
                // The call itself still succeeds; the rejection is only
                // visible through the statistics probe.
                self.stats.failures += 1;
                if self.stats.first_failure.is_none() {
                    self.stats.first_failure = Some(REASON_QUEUE_FULL);
                }
                return Ok(());
            }
            self.stats.completed += 1;
        }

        self.seq += 1;
        let queued = QueuedMessage {
            priority: message.descriptor.priority,
            seq: self.seq,
            message: message.clone(),
        };
        if self.transacted {
            self.staged.push((queue.to_string(), queued));
        } else {
            self.queues
                .entry(queue.to_string())
                .or_insert_with(BinaryHeap::new)
                .push(queued);
        }
        Ok(())
    }

    fn get(&mut self, queue: &str, selector: &Selector) -> Result<Option<Message>> {
        let heap = match self.queues.get_mut(queue) {
            Some(heap) => heap,
            None => return Ok(None),
        };

        // Pop in delivery order until a message matches, keeping the rest.
        let mut skipped = Vec::new();
        let mut found = None;
        while let Some(queued) = heap.pop() {
            if selector.matches(&queued.message.descriptor) {
                found = Some(queued.message);
                break;
            }
            skipped.push(queued);
        }
        heap.extend(skipped);
        Ok(found)
    }

    fn delivery_stats(&mut self) -> Result<DeliveryStats> {
        Ok(mem::take(&mut self.stats))
    }

    fn commit(&mut self) -> Result<()> {
        for (queue, queued) in self.staged.drain(..) {
            self.queues
                .entry(queue)
                .or_insert_with(BinaryHeap::new)
                .push(queued);
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.staged.clear();
        Ok(())
    }
}

/// A cloneable handle over a [`MemoryTransport`], so a test can hand the
/// transport to a session and still inspect it.
#[derive(Clone)]
pub struct SharedMemoryTransport {
    inner: Arc<Mutex<MemoryTransport>>,
}

impl SharedMemoryTransport {
    pub fn depth(&self, queue: &str) -> usize {
        self.inner.lock().depth(queue)
    }
}

impl Transport for SharedMemoryTransport {
    fn put(&mut self, queue: &str, message: &Message, options: &PutOptions) -> Result<()> {
        self.inner.lock().put(queue, message, options)
    }

    fn get(&mut self, queue: &str, selector: &Selector) -> Result<Option<Message>> {
        self.inner.lock().get(queue, selector)
    }

    fn delivery_stats(&mut self) -> Result<DeliveryStats> {
        self.inner.lock().delivery_stats()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.lock().commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.lock().rollback()
    }
}
