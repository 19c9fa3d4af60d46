// Copyright 2021 Matthew Ingwersen.
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

//! Implementation of the [`Opcode`] type.

use std::fmt;

/// The opcode value of the DNS message header.
///
/// [RFC 1035 § 4.1.1] defines the opcode field as a four-bit field
/// indicating the kind of query being made in the message. The names of
/// each member of the `Opcode` enumeration are those listed by the
/// IANA.
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    Query,
    IQuery,
    Status,
    Notify,
    Update,
    Dso,
    Unassigned(u8),
}

/// Converts the low four bits of a `u8` into an `Opcode`.
impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        match value & 0x0f {
            0 => Self::Query,
            1 => Self::IQuery,
            2 => Self::Status,
            4 => Self::Notify,
            5 => Self::Update,
            6 => Self::Dso,
            other => Self::Unassigned(other),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Dso => 6,
            Opcode::Unassigned(v) => v & 0x0f,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Query => f.write_str("QUERY"),
            Self::IQuery => f.write_str("IQUERY"),
            Self::Status => f.write_str("STATUS"),
            Self::Notify => f.write_str("NOTIFY"),
            Self::Update => f.write_str("UPDATE"),
            Self::Dso => f.write_str("DSO"),
            Self::Unassigned(v) => write!(f, "OPCODE{}", v),
        }
    }
}
