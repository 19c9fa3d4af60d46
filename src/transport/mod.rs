// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Sending queries to nameservers.
//!
//! The resolver is generic over the [`Transport`] trait, which sends a
//! single query to a single server and waits (up to a timeout) for the
//! response. [`UdpTransport`] is the implementation used in
//! production.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use crate::message::{reader, writer, Message};

mod udp;
pub use udp::UdpTransport;

/// A way of exchanging a query for a response with a nameserver.
pub trait Transport {
    /// Sends `query` to `server` and returns its response. If no
    /// response arrives within `timeout`, this returns
    /// [`Error::Timeout`].
    fn query(&mut self, query: &Message, server: SocketAddr, timeout: Duration)
        -> Result<Message, Error>;
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error that occurred while querying a nameserver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// No response arrived before the deadline.
    Timeout,

    /// The socket operation failed.
    Io(io::ErrorKind),

    /// The query could not be serialized.
    Encode(writer::Error),

    /// The response could not be parsed.
    Malformed(reader::Error),
}

impl Error {
    /// Returns whether this is [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            kind => Self::Io(kind),
        }
    }
}

impl From<writer::Error> for Error {
    fn from(err: writer::Error) -> Self {
        Self::Encode(err)
    }
}

impl From<reader::Error> for Error {
    fn from(err: reader::Error) -> Self {
        Self::Malformed(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("query timed out"),
            Self::Io(kind) => write!(f, "I/O error: {kind}"),
            Self::Encode(err) => write!(f, "failed to encode query: {err}"),
            Self::Malformed(err) => write!(f, "malformed response: {err}"),
        }
    }
}

impl std::error::Error for Error {}
