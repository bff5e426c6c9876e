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

use std::error;
use std::fmt;

/// A boxed error source, kept behind the crate [`Error`] so callers can walk
/// the chain with [`std::error::Error::source`].
pub type Source = Box<dyn error::Error + Send + Sync + 'static>;

/// A specialized `Result` type for operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason codes for everything this crate can fail with.
///
/// Kinds are a closed set so callers can match on them instead of string
/// matching a message. `Display` renders the stable reason string.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A property (or special header field) was read or written through an
    /// incompatible type and could not be coerced.
    BadType,

    /// A coercion into a target type this crate cannot represent.
    UnsupportedType,

    /// A known capability gap: the named special field cannot be written
    /// because the underlying wire format support is missing. Distinct from
    /// a real provider fault.
    NotImplemented,

    /// The selector string does not match the supported grammar.
    MalformedSelector,

    /// The selector is syntactically fine but names a field this crate does
    /// not select on.
    UnsupportedSelectorField,

    /// One or more asynchronous puts were reported failed or warned by the
    /// provider since the last confirmation check. The source error carries
    /// the first native reason.
    AsyncPutFailed {
        /// Puts the provider rejected outright.
        failures: u64,
        /// Puts the provider accepted with a warning.
        warnings: u64,
    },

    /// A transaction commit completed but a pending asynchronous-put check
    /// found earlier failures; the source error carries them.
    CommitIncomplete,

    /// A native reason code passed through from the transport.
    Provider(i32),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BadType => write!(f, "bad type"),
            ErrorKind::UnsupportedType => write!(f, "unsupported type"),
            ErrorKind::NotImplemented => write!(f, "not yet implemented"),
            ErrorKind::MalformedSelector => write!(f, "malformed selector"),
            ErrorKind::UnsupportedSelectorField => {
                write!(f, "unsupported selector field")
            }
            ErrorKind::AsyncPutFailed { failures, warnings } => write!(
                f,
                "{} failures and {} warnings from asynchronous puts",
                failures, warnings
            ),
            ErrorKind::CommitIncomplete => {
                write!(f, "commit completed with outstanding async put errors")
            }
            ErrorKind::Provider(reason) => {
                write!(f, "provider error, reason code {}", reason)
            }
        }
    }
}

/// The error type for this crate.
///
/// Every public operation returns its error instead of panicking; the
/// [`ErrorKind`] identifies the failure and an optional source carries the
/// underlying cause (for deferred async-put failures, the native reason).
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<Source>,
}

impl Error {
    /// Creates an error from a reason code. Public so [`Transport`]
    /// implementations can fail with the same error type the rest of the
    /// crate uses.
    ///
    /// [`Transport`]: crate::Transport
    pub fn new(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    /// Creates an error carrying an underlying cause, reachable through
    /// [`std::error::Error::source`].
    pub fn with_source<S>(kind: ErrorKind, source: S) -> Error
    where
        S: Into<Source>,
    {
        Error {
            kind,
            source: Some(source.into()),
        }
    }

    /// Returns the reason code for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}: {}", self.kind, source)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn error::Error + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::new(kind)
    }
}
