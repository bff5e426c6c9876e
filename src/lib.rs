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

//! A JMS-shaped, typed messaging layer over a native queue transport.
//!
//! Applications describe messages and selection criteria through a typed
//! model: named properties with dynamic types, text or bytes bodies, and
//! equality selectors on the correlation identifier. The provider
//! underneath speaks a fixed-layout message descriptor and a separate
//! property surface. This crate is the translation between the two:
//! lossless where the formats allow it, documented and deterministic where
//! they do not.
//!
//! The physical transport is a collaborator behind the [`Transport`]
//! trait; connection establishment, the put/get calls themselves and
//! transaction execution belong to it.
//!
//! ## Sending
//!
//! ```no_run
//! # fn transport() -> Box<dyn mqjms::Transport> { unimplemented!() }
//! # fn main() -> Result<(), mqjms::Error> {
//! let session = mqjms::SessionOptions::new()
//!     .application_name("billing")
//!     .session(transport());
//!
//! let producer = session.create_producer("DEV.QUEUE.1").priority(7);
//!
//! let mut msg = session.create_text_message_with("pay invoice 42");
//! msg.set_correlation_id("invoice-42");
//! msg.set_string_property("region", Some("emea"))?;
//! producer.send(&mut msg)?;
//! # Ok(()) }
//! ```
//!
//! ## Receiving with a selector
//!
//! ```no_run
//! # fn transport() -> Box<dyn mqjms::Transport> { unimplemented!() }
//! # fn main() -> Result<(), mqjms::Error> {
//! let session = mqjms::Session::new(transport());
//! let consumer =
//!     session.create_consumer_with_selector("DEV.QUEUE.1", "JMSCorrelationID = 'invoice-42'")?;
//!
//! if let Some(reply) = consumer.receive()? {
//!     println!("got {:?}", reply.text_body()?);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Asynchronous puts
//!
//! A producer with [`Producer::async_put`] enabled returns from `send`
//! before the provider confirms acceptance. Failures are never dropped:
//! outside a transaction they surface on a periodic delivery-statistics
//! probe (configured with [`SessionOptions::async_put_check_interval`]);
//! inside one, a single probe runs at [`Session::commit`] and its findings
//! are linked into the commit outcome.

pub mod correlation;
pub mod headers;

mod async_put;
mod descriptor;
mod error;
mod message;
mod properties;
mod selector;
mod session;

pub use async_put::{AsyncPutState, DeliveryStats};
pub use descriptor::{DeliveryMode, Descriptor, DEFAULT_PRIORITY};
pub use error::{Error, ErrorKind, Result};
pub use message::{Body, Message};
pub use properties::{PropertyBag, PropertyValue};
pub use selector::Selector;
pub use session::{
    Consumer, Producer, PutOptions, Session, SessionOptions, Transport,
    DEFAULT_ASYNC_PUT_CHECK_INTERVAL,
};
