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

//! Implementation of the [`Question`] type.

use std::fmt;

use crate::name::Name;
use crate::rr::{Class, Type};

/// The question of a DNS query.
///
/// Defined in [RFC 1035 § 4.1.2], a DNS question includes the QNAME,
/// which is the domain name whose records are being queried; the
/// QTYPE; and the QCLASS. The resolver only ever asks for data types,
/// so QTYPE and QCLASS reuse [`Type`] and [`Class`] (which have
/// constants for the query-only values it might see, like
/// [`Type::ANY`]).
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    pub qname: Name,
    pub qtype: Type,
    pub qclass: Class,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}
