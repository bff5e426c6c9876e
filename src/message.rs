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

use std::fmt;

use time::OffsetDateTime;

use crate::correlation;
use crate::descriptor::{DeliveryMode, Descriptor};
use crate::error::{Error, ErrorKind, Result};
use crate::headers;
use crate::properties::{PropertyBag, PropertyValue};

/// The message body. A message is a text message or a bytes message for its
/// whole lifetime; the variant is fixed when the message is created.
///
/// An absent payload and an empty payload are the same thing on the wire,
/// so received messages always report an empty payload as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
}

/// A message: a native descriptor, a named-property collection, and one
/// body variant.
///
/// Properties whose names are "special" (see [`headers`]) are transparently
/// routed to descriptor fields; everything else lives in the generic,
/// insertion-ordered property collection.
#[derive(Clone, PartialEq)]
pub struct Message {
    /// The native header record for this message.
    pub descriptor: Descriptor,
    properties: PropertyBag,
    body: Body,
}

impl Message {
    /// Creates an empty text message.
    pub fn text() -> Message {
        Message {
            descriptor: Descriptor::new(),
            properties: PropertyBag::new(),
            body: Body::Text(None),
        }
    }

    /// Creates a text message carrying `body`.
    pub fn text_with(body: impl Into<String>) -> Message {
        let mut msg = Message::text();
        msg.body = Body::Text(Some(body.into()));
        msg
    }

    /// Creates an empty bytes message.
    pub fn bytes() -> Message {
        Message {
            descriptor: Descriptor::new(),
            properties: PropertyBag::new(),
            body: Body::Bytes(None),
        }
    }

    /// Creates a bytes message carrying `payload`.
    pub fn bytes_with(payload: impl AsRef<[u8]>) -> Message {
        let mut msg = Message::bytes();
        msg.body = Body::Bytes(Some(payload.as_ref().to_vec()));
        msg
    }

    /// Assembles a message from provider-populated parts. Intended for
    /// [`Transport`][crate::Transport] implementations reconstructing a
    /// received message.
    pub fn from_parts(
        descriptor: Descriptor,
        properties: PropertyBag,
        body: Body,
    ) -> Message {
        Message {
            descriptor,
            properties,
            body,
        }
    }

    /// True when this is a text message.
    pub fn is_text(&self) -> bool {
        matches!(self.body, Body::Text(_))
    }

    /// True when this is a bytes message.
    pub fn is_bytes(&self) -> bool {
        matches!(self.body, Body::Bytes(_))
    }

    /// The body variant and payload, as a transport sees it.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The text body, or `None` for an absent body. Reading the body of a
    /// bytes message is a "bad type" error.
    pub fn text_body(&self) -> Result<Option<&str>> {
        match &self.body {
            Body::Text(text) => Ok(text.as_deref()),
            Body::Bytes(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// Replaces the text body. Fails with a "bad type" error on a bytes
    /// message; the body variant is fixed at creation.
    pub fn set_text_body(&mut self, body: Option<String>) -> Result<()> {
        match &mut self.body {
            Body::Text(text) => {
                *text = body;
                Ok(())
            }
            Body::Bytes(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// The byte body, or `None` for an absent body. Reading the body of a
    /// text message is a "bad type" error.
    pub fn bytes_body(&self) -> Result<Option<&[u8]>> {
        match &self.body {
            Body::Bytes(payload) => Ok(payload.as_deref()),
            Body::Text(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// Replaces the byte body. Fails with a "bad type" error on a text
    /// message.
    pub fn set_bytes_body(&mut self, payload: Option<Vec<u8>>) -> Result<()> {
        match &mut self.body {
            Body::Bytes(existing) => {
                *existing = payload;
                Ok(())
            }
            Body::Text(_) => Err(Error::new(ErrorKind::BadType)),
        }
    }

    /// An empty payload received from the wire is indistinguishable from no
    /// payload, so it is reported as absent.
    pub(crate) fn normalize_received_body(&mut self) {
        match &mut self.body {
            Body::Text(text) => {
                if text.as_deref() == Some("") {
                    *text = None;
                }
            }
            Body::Bytes(payload) => {
                if payload.as_deref() == Some(&[]) {
                    *payload = None;
                }
            }
        }
    }

    /// The correlation identifier, decoded back to string form, or `None`
    /// when no correlation id is set.
    pub fn correlation_id(&self) -> Option<String> {
        let decoded = correlation::decode(&self.descriptor.correlation_id);
        if decoded.is_empty() {
            None
        } else {
            Some(decoded)
        }
    }

    /// Sets the correlation identifier. Text longer than
    /// [`correlation::CORREL_ID_TEXT_MAX`] bytes is truncated to the native
    /// field width; the empty string clears the field.
    pub fn set_correlation_id(&mut self, correlation_id: &str) {
        self.descriptor.correlation_id = correlation::encode(correlation_id);
    }

    /// The reply destination, if any.
    pub fn reply_to(&self) -> Option<&str> {
        self.descriptor.reply_to.as_deref()
    }

    /// Sets or clears the reply destination.
    pub fn set_reply_to(&mut self, queue: Option<String>) {
        self.descriptor.reply_to = queue;
    }

    /// The delivery priority.
    pub fn priority(&self) -> i32 {
        self.descriptor.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.descriptor.priority = priority;
    }

    /// The persistence requested for this message.
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.descriptor.delivery_mode
    }

    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.descriptor.delivery_mode = mode;
    }

    /// The instant the provider accepted this message, derived from the
    /// descriptor's put date and time fields. `None` until the message has
    /// been through a send.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.descriptor.put_timestamp()
    }

    /// The instant this message expires, or `None` when it never expires.
    pub fn expiration(&self) -> Option<OffsetDateTime> {
        self.descriptor.expiration()
    }

    /// Sets a string property, or deletes the property when `value` is
    /// `None`. Special names are routed to their descriptor field.
    pub fn set_string_property(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.set_property(name, PropertyValue::from(v)),
            None => self.delete_property(name),
        }
    }

    /// Sets an integer property, or deletes it when `value` is `None`.
    pub fn set_int_property(&mut self, name: &str, value: Option<i64>) -> Result<()> {
        match value {
            Some(v) => self.set_property(name, PropertyValue::from(v)),
            None => self.delete_property(name),
        }
    }

    /// Sets a double property, or deletes it when `value` is `None`.
    pub fn set_double_property(&mut self, name: &str, value: Option<f64>) -> Result<()> {
        match value {
            Some(v) => self.set_property(name, PropertyValue::from(v)),
            None => self.delete_property(name),
        }
    }

    /// Sets a boolean property, or deletes it when `value` is `None`.
    pub fn set_bool_property(&mut self, name: &str, value: Option<bool>) -> Result<()> {
        match value {
            Some(v) => self.set_property(name, PropertyValue::from(v)),
            None => self.delete_property(name),
        }
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        if name.is_empty() {
            return Err(Error::new(ErrorKind::BadType));
        }
        if headers::set_special(&mut self.descriptor, name, value.clone())? {
            return Ok(());
        }
        self.properties.set(name, value);
        Ok(())
    }

    fn delete_property(&mut self, name: &str) -> Result<()> {
        // Special properties are descriptor-backed and have no absent
        // state; deleting one is a no-op, like deleting an unset name.
        if !headers::is_special(name) {
            self.properties.remove(name);
        }
        Ok(())
    }

    /// Reads a property as a string. `Ok(None)` means the property is not
    /// set; a present value of an incompatible type is a "bad type" error.
    pub fn get_string_property(&self, name: &str) -> Result<Option<String>> {
        match headers::get_special(&self.descriptor, name)? {
            Some(value) => value.as_string().map(Some),
            None => self.properties.get_string(name),
        }
    }

    /// Reads a property as a 64-bit integer.
    pub fn get_int_property(&self, name: &str) -> Result<Option<i64>> {
        match headers::get_special(&self.descriptor, name)? {
            Some(value) => value.as_int().map(Some),
            None => self.properties.get_int(name),
        }
    }

    /// Reads a property as a double.
    pub fn get_double_property(&self, name: &str) -> Result<Option<f64>> {
        match headers::get_special(&self.descriptor, name)? {
            Some(value) => value.as_double().map(Some),
            None => self.properties.get_double(name),
        }
    }

    /// Reads a property as a boolean.
    pub fn get_bool_property(&self, name: &str) -> Result<Option<bool>> {
        match headers::get_special(&self.descriptor, name)? {
            Some(value) => value.as_bool().map(Some),
            None => self.properties.get_bool(name),
        }
    }

    /// True when `name` is set, including when it is set to a zero value.
    /// Special names always exist; their fields synthesize a default.
    pub fn property_exists(&self, name: &str) -> bool {
        headers::is_special(name) || self.properties.contains(name)
    }

    /// User property names in the order they were first set, without
    /// duplicates. Special properties are descriptor-backed and are not
    /// enumerated.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.names()
    }

    /// Removes every user property and resets the writable special fields
    /// to their defaults. Intrinsic descriptor fields that are not
    /// reachable through a special property name are untouched.
    pub fn clear_properties(&mut self) {
        self.properties.clear();
        self.descriptor.format.clear();
        self.descriptor.msg_type = 0;
        self.descriptor.coded_charset = 0;
        self.descriptor.encoding = 0;
        self.descriptor.put_appl_type = 0;
        self.descriptor.appl_origin_data.clear();
    }

    /// The generic property collection, as a transport sees it. Special
    /// properties live in the descriptor and are not here.
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = match &self.body {
            Body::Text(Some(text)) => text.len(),
            Body::Bytes(Some(payload)) => payload.len(),
            _ => 0,
        };
        f.debug_struct("Message")
            .field("kind", if self.is_text() { &"text" } else { &"bytes" })
            .field("correlation_id", &self.correlation_id())
            .field("priority", &self.descriptor.priority)
            .field("properties", &self.properties.len())
            .field("length", &length)
            .finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::Text(Some(text)) => {
                write!(f, "Message {{ text: \"{}\" }}", text)
            }
            Body::Text(None) => write!(f, "Message {{ text: none }}"),
            Body::Bytes(Some(payload)) => {
                write!(f, "Message {{ bytes: [{} bytes] }}", payload.len())
            }
            Body::Bytes(None) => write!(f, "Message {{ bytes: none }}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_variant_is_fixed() {
        let mut msg = Message::text_with("hello");
        assert!(msg.is_text());
        assert_eq!(msg.text_body().unwrap(), Some("hello"));
        assert_eq!(
            msg.set_bytes_body(Some(vec![1])).unwrap_err().kind(),
            ErrorKind::BadType
        );
        assert_eq!(msg.bytes_body().unwrap_err().kind(), ErrorKind::BadType);

        let mut msg = Message::bytes_with([1u8, 2, 3]);
        assert!(msg.is_bytes());
        assert_eq!(
            msg.set_text_body(Some("x".to_string())).unwrap_err().kind(),
            ErrorKind::BadType
        );
    }

    #[test]
    fn received_empty_body_reads_as_absent() {
        let mut msg = Message::text_with("");
        msg.normalize_received_body();
        assert_eq!(msg.text_body().unwrap(), None);

        let mut msg = Message::bytes_with(b"");
        msg.normalize_received_body();
        assert_eq!(msg.bytes_body().unwrap(), None);
    }

    #[test]
    fn correlation_id_round_trips() {
        let mut msg = Message::text();
        assert_eq!(msg.correlation_id(), None);

        msg.set_correlation_id("request-77");
        assert_eq!(msg.correlation_id(), Some("request-77".to_string()));

        msg.set_correlation_id("");
        assert_eq!(msg.correlation_id(), None);
    }

    #[test]
    fn special_properties_route_to_descriptor() {
        let mut msg = Message::text();
        msg.set_string_property("Format", Some("MQSTR")).unwrap();
        assert_eq!(msg.descriptor.format, "MQSTR");
        // Not in the generic bag, not enumerated.
        assert!(msg.property_names().is_empty());
        // Visible through the alias.
        assert_eq!(
            msg.get_string_property("MQMD_Format").unwrap(),
            Some("MQSTR".to_string())
        );
    }

    #[test]
    fn special_values_coerce_on_read() {
        let mut msg = Message::text();
        msg.set_int_property("CharacterSet", Some(1208)).unwrap();
        // Int field read back as string goes through the same coercion
        // matrix as user properties.
        assert_eq!(
            msg.get_string_property("CharacterSet").unwrap(),
            Some("1208".to_string())
        );
    }

    #[test]
    fn user_properties_keep_order_and_delete() {
        let mut msg = Message::text();
        msg.set_string_property("one", Some("1")).unwrap();
        msg.set_int_property("two", Some(2)).unwrap();
        msg.set_bool_property("three", Some(true)).unwrap();
        assert_eq!(msg.property_names(), vec!["one", "two", "three"]);

        msg.set_int_property("two", None).unwrap();
        assert_eq!(msg.property_names(), vec!["one", "three"]);
        assert!(!msg.property_exists("two"));
        // Deleting again is fine.
        msg.set_int_property("two", None).unwrap();
    }

    #[test]
    fn empty_property_name_is_rejected() {
        let mut msg = Message::text();
        let err = msg.set_string_property("", Some("x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);
    }

    #[test]
    fn clear_resets_writable_special_fields_only() {
        let mut msg = Message::text();
        msg.set_string_property("Format", Some("MQSTR")).unwrap();
        msg.set_string_property("user", Some("v")).unwrap();
        msg.set_priority(7);
        msg.set_correlation_id("keep-me");

        msg.clear_properties();
        assert!(msg.property_names().is_empty());
        assert_eq!(msg.descriptor.format, "");
        // Intrinsics survive.
        assert_eq!(msg.priority(), 7);
        assert_eq!(msg.correlation_id(), Some("keep-me".to_string()));
    }
}
