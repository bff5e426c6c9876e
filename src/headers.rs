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

//! Mapping between "special" named properties and descriptor fields.
//!
//! A small set of property names is not stored in the generic property bag
//! at all: reads and writes are redirected to fields of the message
//! [`Descriptor`], or synthesized when the field has no stored value.
//! Membership is decided by an explicit table, never by name-prefix
//! sniffing, so a user property can never be misclassified.
//!
//! Two names may alias one physical field (a legacy name next to the
//! native-field name); a write through either is visible through both.

use std::collections::HashSet;
use std::convert::TryFrom;

use once_cell::sync::Lazy;

use crate::correlation;
use crate::descriptor::Descriptor;
use crate::error::{Error, ErrorKind, Result};
use crate::properties::PropertyValue;

/// Put date, 8-digit `YYYYMMDD`. Read-only.
pub const PUT_DATE: &str = "PutDate";
/// Put time, 8-digit `HHMMSSth`. Read-only.
pub const PUT_TIME: &str = "PutTime";
/// Body format tag.
pub const FORMAT: &str = "Format";
/// Native-field alias of [`FORMAT`].
pub const MQMD_FORMAT: &str = "MQMD_Format";
/// Native message type code.
pub const MSG_TYPE: &str = "MsgType";
/// Native-field alias of [`MSG_TYPE`].
pub const MQMD_MSG_TYPE: &str = "MQMD_MsgType";
/// Coded character set identifier.
pub const CHARACTER_SET: &str = "CharacterSet";
/// Native-field alias of [`CHARACTER_SET`].
pub const MQMD_CODED_CHAR_SET_ID: &str = "MQMD_CodedCharSetId";
/// Numeric encoding of the body.
pub const ENCODING: &str = "Encoding";
/// Type code of the putting application.
pub const PUT_APPL_TYPE: &str = "PutApplType";
/// Name of the originating application. Read-only.
pub const APP_ID: &str = "AppID";
/// Group identifier. Writes are a known capability gap.
pub const GROUP_ID: &str = "GroupID";
/// Sequence number within a group, synthesized as `1` when absent.
/// Writes are a known capability gap.
pub const GROUP_SEQ: &str = "GroupSeq";
/// Last-message-in-group flag, synthesized as `false` when absent.
/// Writes are a known capability gap.
pub const LAST_MSG_IN_GROUP: &str = "LastMsgInGroup";
/// Application origin data. Writable; an unprivileged write is rejected by
/// the provider at send time, not here.
pub const APPL_ORIGIN_DATA: &str = "ApplOriginData";

static SPECIAL_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        PUT_DATE,
        PUT_TIME,
        FORMAT,
        MQMD_FORMAT,
        MSG_TYPE,
        MQMD_MSG_TYPE,
        CHARACTER_SET,
        MQMD_CODED_CHAR_SET_ID,
        ENCODING,
        PUT_APPL_TYPE,
        APP_ID,
        GROUP_ID,
        GROUP_SEQ,
        LAST_MSG_IN_GROUP,
        APPL_ORIGIN_DATA,
    ]
    .iter()
    .copied()
    .collect()
});

/// True when `name` is backed by a descriptor field instead of the generic
/// property bag. Get and set both consult this, so a name is never
/// partially special.
pub fn is_special(name: &str) -> bool {
    SPECIAL_NAMES.contains(name)
}

/// Reads the special property `name` from `md`.
///
/// Returns `Ok(None)` when `name` is not a special property at all; every
/// special name yields a value, synthesizing the documented default when
/// the backing field is absent.
pub fn get_special(md: &Descriptor, name: &str) -> Result<Option<PropertyValue>> {
    let value = match name {
        PUT_DATE => PropertyValue::String(md.put_date.clone()),
        PUT_TIME => PropertyValue::String(md.put_time.clone()),
        FORMAT | MQMD_FORMAT => PropertyValue::String(md.format.clone()),
        MSG_TYPE | MQMD_MSG_TYPE => PropertyValue::Int(i64::from(md.msg_type)),
        CHARACTER_SET | MQMD_CODED_CHAR_SET_ID => {
            PropertyValue::Int(i64::from(md.coded_charset))
        }
        ENCODING => PropertyValue::Int(i64::from(md.encoding)),
        PUT_APPL_TYPE => PropertyValue::Int(i64::from(md.put_appl_type)),
        APP_ID => PropertyValue::String(md.put_appl_name.clone()),
        GROUP_ID => PropertyValue::String(correlation::decode(&md.group_id)),
        GROUP_SEQ => PropertyValue::Int(i64::from(md.msg_seq_number.unwrap_or(1))),
        LAST_MSG_IN_GROUP => {
            PropertyValue::Bool(md.last_in_group.unwrap_or(false))
        }
        APPL_ORIGIN_DATA => PropertyValue::String(md.appl_origin_data.clone()),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Writes the special property `name` on `md`.
///
/// Returns `Ok(false)` when `name` is not special, in which case the caller
/// stores it in the generic bag instead. A write to a group field fails
/// with a "not yet implemented" error: the underlying fields need wire
/// format support this layer does not carry. A write through either alias
/// of a field is visible through both.
pub fn set_special(md: &mut Descriptor, name: &str, value: PropertyValue) -> Result<bool> {
    if !is_special(name) {
        return Ok(false);
    }
    match name {
        FORMAT | MQMD_FORMAT => md.format = expect_string(value)?,
        MSG_TYPE | MQMD_MSG_TYPE => md.msg_type = expect_i32(value)?,
        CHARACTER_SET | MQMD_CODED_CHAR_SET_ID => {
            md.coded_charset = expect_i32(value)?
        }
        ENCODING => md.encoding = expect_i32(value)?,
        PUT_APPL_TYPE => md.put_appl_type = expect_i32(value)?,
        // Accepted locally; a privilege rejection is the provider's to make
        // at send time.
        APPL_ORIGIN_DATA => md.appl_origin_data = expect_string(value)?,
        GROUP_ID | GROUP_SEQ | LAST_MSG_IN_GROUP => {
            return Err(Error::new(ErrorKind::NotImplemented));
        }
        // Provider-stamped fields have no settable backing.
        PUT_DATE | PUT_TIME | APP_ID => {
            return Err(Error::new(ErrorKind::NotImplemented));
        }
        _ => unreachable!("name vetted by is_special"),
    }
    Ok(true)
}

fn expect_string(value: PropertyValue) -> Result<String> {
    match value {
        PropertyValue::String(s) => Ok(s),
        _ => Err(Error::new(ErrorKind::BadType)),
    }
}

fn expect_i32(value: PropertyValue) -> Result<i32> {
    match value {
        PropertyValue::Int(v) => {
            i32::try_from(v).map_err(|_| Error::new(ErrorKind::UnsupportedType))
        }
        _ => Err(Error::new(ErrorKind::BadType)),
    }
}
