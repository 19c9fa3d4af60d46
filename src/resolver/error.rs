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

use std::fmt;

use crate::name::Name;

/// A local failure to resolve a question.
///
/// An error response from an upstream nameserver is not an `Error`:
/// it is a final answer like any other.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Every nameserver for `zone` failed to respond.
    NameserversExhausted { zone: Name },

    /// No address is known for a nameserver that had to be queried.
    MissingGlue { nameserver: Name },

    /// The descent followed too many referrals without reaching an
    /// answer.
    TooManyReferrals,

    /// The answer was behind too many CNAMEs.
    CnameChainTooLong,

    /// Not even the root has nameservers in the referral cache.
    NoReferral,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NameserversExhausted { zone } => {
                write!(f, "SERVFAIL: no nameserver for {} responded", zone)
            }
            Self::MissingGlue { nameserver } => {
                write!(f, "no address is known for nameserver {}", nameserver)
            }
            Self::TooManyReferrals => f.write_str("too many referrals"),
            Self::CnameChainTooLong => f.write_str("CNAME chain is too long"),
            Self::NoReferral => f.write_str("the referral cache has no root nameservers"),
        }
    }
}

impl std::error::Error for Error {}
