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

//! The native message descriptor: the fixed-layout header record that
//! accompanies every message on the wire.

use std::convert::TryFrom;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Default message priority when the application sets none.
pub const DEFAULT_PRIORITY: i32 = 4;

/// Whether the provider must persist a message across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// The message may be lost if the provider restarts.
    NonPersistent,
    /// The message survives provider restarts.
    Persistent,
}

impl Default for DeliveryMode {
    fn default() -> DeliveryMode {
        DeliveryMode::NonPersistent
    }
}

/// The fixed-layout header record carried with every message.
///
/// Fields are plain and public; the typed surface an application normally
/// uses lives on [`Message`][crate::Message], which routes the "special"
/// named properties here through the header mapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    /// Persistence requested for this message.
    pub delivery_mode: DeliveryMode,

    /// Delivery priority, `0..=9`.
    pub priority: i32,

    /// Expiry in tenths of a second. Zero means the message never expires.
    pub expiry: i32,

    /// Correlation field bytes, as produced by
    /// [`correlation::encode`][crate::correlation::encode].
    pub correlation_id: Vec<u8>,

    /// Queue name replies should be sent to.
    pub reply_to: Option<String>,

    /// Format tag describing the body layout.
    pub format: String,

    /// Put date as an 8-digit `YYYYMMDD` string, empty until the provider
    /// stamps it.
    pub put_date: String,

    /// Put time as an 8-digit `HHMMSSth` string (hundredths of a second,
    /// UTC), empty until the provider stamps it.
    pub put_time: String,

    /// Native message type code.
    pub msg_type: i32,

    /// Coded character set identifier for the body.
    pub coded_charset: i32,

    /// Numeric encoding of binary fields in the body.
    pub encoding: i32,

    /// Type code of the putting application.
    pub put_appl_type: i32,

    /// Name of the putting application.
    pub put_appl_name: String,

    /// Group identifier bytes; empty when the message is not in a group.
    pub group_id: Vec<u8>,

    /// Sequence number within a group. Absent reads as `1`.
    pub msg_seq_number: Option<i32>,

    /// Whether this is the last message of its group. Absent reads as
    /// `false`.
    pub last_in_group: Option<bool>,

    /// Application-supplied origin data. Writable, but the provider may
    /// reject unprivileged writes at send time.
    pub appl_origin_data: String,
}

impl Descriptor {
    pub fn new() -> Descriptor {
        Descriptor {
            priority: DEFAULT_PRIORITY,
            ..Descriptor::default()
        }
    }

    /// Derives the put timestamp from the `put_date` and `put_time` fields.
    ///
    /// The date is required; a missing or unparsable date yields `None`. A
    /// missing time defaults to midnight. The native field only resolves
    /// hundredths of a second, so the derived instant lands in the middle
    /// of the hundredth (`milliseconds = hundredths * 10 + 5`), which
    /// halves the expected error against the unknown true instant.
    pub fn put_timestamp(&self) -> Option<OffsetDateTime> {
        let date = parse_put_date(&self.put_date)?;
        let time = if self.put_time.is_empty() {
            Time::MIDNIGHT
        } else {
            parse_put_time(&self.put_time)?
        };
        Some(PrimitiveDateTime::new(date, time).assume_utc())
    }

    /// Derives the expiration instant: put timestamp plus the native expiry
    /// (tenths of a second). Zero expiry never expires.
    pub fn expiration(&self) -> Option<OffsetDateTime> {
        if self.expiry == 0 {
            return None;
        }
        let put = self.put_timestamp()?;
        Some(put + Duration::milliseconds(i64::from(self.expiry) * 100))
    }

    /// Stamps `put_date`/`put_time` from an instant, in the fixed-width
    /// decimal forms the wire uses.
    pub fn stamp_put_instant(&mut self, instant: OffsetDateTime) {
        let date = instant.date();
        let time = instant.time();
        self.put_date = format!(
            "{:04}{:02}{:02}",
            date.year(),
            date.month() as u8,
            date.day()
        );
        self.put_time = format!(
            "{:02}{:02}{:02}{:02}",
            time.hour(),
            time.minute(),
            time.second(),
            time.millisecond() / 10
        );
    }
}

fn parse_put_date(put_date: &str) -> Option<Date> {
    if put_date.len() != 8 || !put_date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = put_date[0..4].parse().ok()?;
    let month: u8 = put_date[4..6].parse().ok()?;
    let day: u8 = put_date[6..8].parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn parse_put_time(put_time: &str) -> Option<Time> {
    if put_time.len() != 8 || !put_time.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u8 = put_time[0..2].parse().ok()?;
    let minute: u8 = put_time[2..4].parse().ok()?;
    let second: u8 = put_time[4..6].parse().ok()?;
    let hundredths: u16 = put_time[6..8].parse().ok()?;
    // Upsample hundredths to the middle of their span rather than the start.
    let milli = hundredths * 10 + 5;
    Time::from_hms_milli(hour, minute, second, milli).ok()
}
