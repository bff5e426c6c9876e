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

mod util;

use mqjms::{ErrorKind, Session, SessionOptions};
use util::MemoryTransport;

#[test]
fn properties_survive_send_and_receive() {
    let session = Session::new(MemoryTransport::new().boxed());
    let producer = session.create_producer("Q");

    let mut msg = session.create_text_message_with("payload");
    msg.set_string_property("region", Some("emea")).unwrap();
    msg.set_int_property("attempt", Some(3)).unwrap();
    msg.set_double_property("ratio", Some(0.25)).unwrap();
    msg.set_bool_property("urgent", Some(true)).unwrap();
    producer.send(&mut msg).unwrap();

    let consumer = session.create_consumer("Q");
    let received = consumer.receive().unwrap().unwrap();

    assert_eq!(
        received.property_names(),
        vec!["region", "attempt", "ratio", "urgent"]
    );
    assert_eq!(
        received.get_string_property("region").unwrap(),
        Some("emea".to_string())
    );
    assert_eq!(received.get_int_property("attempt").unwrap(), Some(3));
    assert_eq!(received.get_double_property("ratio").unwrap(), Some(0.25));
    assert_eq!(received.get_bool_property("urgent").unwrap(), Some(true));

    // Cross-type reads go through the coercion matrix on the receive side
    // too.
    assert_eq!(
        received.get_string_property("attempt").unwrap(),
        Some("3".to_string())
    );
    assert_eq!(
        received.get_int_property("region").unwrap_err().kind(),
        ErrorKind::BadType
    );
}

#[test]
fn correlation_id_round_trips_over_the_wire() {
    let session = Session::new(MemoryTransport::new().boxed());
    let producer = session.create_producer("Q");

    let mut msg = session.create_text_message_with("ping");
    msg.set_correlation_id("conversation-9");
    producer.send(&mut msg).unwrap();

    let consumer = session.create_consumer("Q");
    let received = consumer.receive().unwrap().unwrap();
    assert_eq!(
        received.correlation_id(),
        Some("conversation-9".to_string())
    );
}

#[test]
fn send_stamps_provider_properties() {
    let session = SessionOptions::new()
        .application_name("inventory")
        .session(MemoryTransport::new().boxed());
    let producer = session.create_producer("Q").time_to_live(60_000);

    let mut msg = session.create_text_message_with("stock level");
    producer.send(&mut msg).unwrap();

    let consumer = session.create_consumer("Q");
    let received = consumer.receive().unwrap().unwrap();

    // Provider-stamped specials are readable as ordinary named properties.
    assert_eq!(
        received.get_string_property("AppID").unwrap(),
        Some("inventory".to_string())
    );
    let put_date = received.get_string_property("PutDate").unwrap().unwrap();
    assert_eq!(put_date.len(), 8);
    let put_time = received.get_string_property("PutTime").unwrap().unwrap();
    assert_eq!(put_time.len(), 8);

    // And the derived instants line up: expiration is one minute after the
    // put timestamp.
    let put = received.timestamp().expect("stamped");
    let expiration = received.expiration().expect("ttl set");
    assert_eq!((expiration - put).whole_seconds(), 60);
}

#[test]
fn group_defaults_synthesize_on_received_messages() {
    let session = Session::new(MemoryTransport::new().boxed());
    let producer = session.create_producer("Q");
    let mut msg = session.create_text_message_with("solo");
    producer.send(&mut msg).unwrap();

    let consumer = session.create_consumer("Q");
    let received = consumer.receive().unwrap().unwrap();

    assert_eq!(received.get_int_property("GroupSeq").unwrap(), Some(1));
    assert_eq!(
        received.get_bool_property("LastMsgInGroup").unwrap(),
        Some(false)
    );
}
