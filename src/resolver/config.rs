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

use std::time::Duration;

/// The default time to wait for each nameserver.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// The default destination port for queries.
pub const DEFAULT_PORT: u16 = 53;

/// The default number of referrals a single descent may follow.
pub const DEFAULT_MAX_REFERRALS: usize = 32;

/// The default number of CNAMEs that may be chased for one question.
pub const DEFAULT_MAX_CNAME_CHAIN: usize = 8;

/// Tunable parameters of a [`Resolver`](super::Resolver).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// How long to wait for a response from each nameserver.
    pub timeout: Duration,

    /// The port that nameservers are queried on.
    pub port: u16,

    /// How many referrals a descent may follow before giving up.
    pub max_referrals: usize,

    /// How many CNAMEs may be chased for a single question.
    pub max_cname_chain: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            port: DEFAULT_PORT,
            max_referrals: DEFAULT_MAX_REFERRALS,
            max_cname_chain: DEFAULT_MAX_CNAME_CHAIN,
        }
    }
}
