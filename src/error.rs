// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Atlas Core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Crate-wide error type.

use std::fmt;

/// Errors surfaced by the Atlas core.
///
/// Loaders surface [`Error::Io`] and [`Error::BadVersion`] immediately and
/// abort the load; a malformed individual record is logged and skipped
/// rather than turned into one of these (see [`crate::loader`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// An I/O failure while reading a file, socket or serial device.
    Io(String),
    /// A line could not be parsed at all.
    Parse { file: String, line: usize },
    /// A database file's version header didn't match what was expected.
    BadVersion {
        file: String,
        expected: &'static str,
        found: String,
    },
    /// A single record was malformed; the caller should log and skip it.
    BadRecord {
        file: String,
        line: usize,
        why: String,
    },
    /// A flight-track source (path, port or device) is already attached.
    DuplicateTrack { source: String },
    /// Spawning an external worker process failed.
    ChildSpawnFailed { cmd: String, cause: String },
    /// A PNG file's signature or `IHDR` chunk could not be read.
    BadPng { file: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { file, line } => write!(f, "{file}:{line}: could not parse line"),
            Self::BadVersion {
                file,
                expected,
                found,
            } => write!(
                f,
                "{file}: expected version \"{expected}\" but found \"{found}\""
            ),
            Self::BadRecord { file, line, why } => write!(f, "{file}:{line}: {why}"),
            Self::DuplicateTrack { source } => {
                write!(f, "a flight track for \"{source}\" is already attached")
            }
            Self::ChildSpawnFailed { cmd, cause } => {
                write!(f, "failed to spawn \"{cmd}\": {cause}")
            }
            Self::BadPng { file } => write!(f, "{file}: not a recognisable PNG"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
