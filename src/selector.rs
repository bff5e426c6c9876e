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

//! Compilation of receive selectors.
//!
//! The supported grammar is a single equality clause on the correlation
//! identifier:
//!
//! ```text
//! JMSCorrelationID = '<literal>'
//! ```
//!
//! The empty string is a valid selector meaning "no filter". Everything is
//! validated at compile time; matching an inbound message can never fail.

use crate::correlation;
use crate::descriptor::Descriptor;
use crate::error::{Error, ErrorKind, Result};

/// The one field this layer selects on.
pub const CORRELATION_ID_FIELD: &str = "JMSCorrelationID";

/// Field names the grammar recognizes but this layer does not select on.
/// Using one fails with a precise "unsupported selector field" error
/// instead of a generic syntax error.
const KNOWN_UNSUPPORTED_FIELDS: &[&str] = &[
    "JMSMessageID",
    "JMSTimestamp",
    "JMSPriority",
    "JMSDeliveryMode",
    "JMSType",
];

/// A compiled receive filter, evaluated against inbound descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    correlation: Option<Vec<u8>>,
}

impl Selector {
    /// The selector that matches every message.
    pub fn none() -> Selector {
        Selector { correlation: None }
    }

    /// Compiles `selector` into a matcher.
    ///
    /// An unparsable or unsupported selector fails here, never at match
    /// time.
    pub fn compile(selector: &str) -> Result<Selector> {
        if selector.trim().is_empty() {
            return Ok(Selector::none());
        }

        let mut parts = selector.splitn(3, '=');
        let lhs = parts.next().unwrap_or("");
        let rhs = match (parts.next(), parts.next()) {
            (Some(rhs), None) => rhs,
            // Zero or more than one `=`.
            _ => return Err(Error::new(ErrorKind::MalformedSelector)),
        };

        let field = lhs.trim();
        if field != CORRELATION_ID_FIELD {
            if KNOWN_UNSUPPORTED_FIELDS.contains(&field) {
                return Err(Error::new(ErrorKind::UnsupportedSelectorField));
            }
            return Err(Error::new(ErrorKind::MalformedSelector));
        }

        let literal = unquote(rhs.trim())?;
        log::debug!(
            "compiled selector on {} = {:?}",
            CORRELATION_ID_FIELD,
            literal
        );

        Ok(Selector {
            correlation: Some(correlation::encode(literal)),
        })
    }

    /// True when this selector filters nothing.
    pub fn is_pass_through(&self) -> bool {
        self.correlation.is_none()
    }

    /// Evaluates this selector against an inbound descriptor.
    pub fn matches(&self, md: &Descriptor) -> bool {
        match &self.correlation {
            None => true,
            Some(wanted) => {
                trim_nuls(wanted) == trim_nuls(&md.correlation_id)
            }
        }
    }
}

/// Strips the single quotes around a selector literal. The literal must be
/// present, quoted on both ends, and non-empty.
fn unquote(quoted: &str) -> Result<&str> {
    if quoted.len() < 3 {
        return Err(Error::new(ErrorKind::MalformedSelector));
    }
    if !quoted.starts_with('\'') || !quoted.ends_with('\'') {
        return Err(Error::new(ErrorKind::MalformedSelector));
    }
    Ok(&quoted[1..quoted.len() - 1])
}

fn trim_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}
