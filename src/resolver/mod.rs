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

//! The iterative resolution engine.
//!
//! A [`Resolver`] answers a question by starting from the closest
//! enclosing zone it knows about (ultimately the root hints) and
//! querying that zone's nameservers, one at a time, until one responds.
//! Referrals in the response are added to the [`ReferralCache`] and the
//! descent continues from the new closest zone. Answers, CNAMEs (which
//! are chased), error RCODEs, and negative responses end the descent.
//! Final results are rendered and kept in the [`AnswerCache`].

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::cache::{AnswerCache, ReferralCache, ReferralValue};
use crate::message::Message;
use crate::name::Name;
use crate::rr::{Rrset, Type};
use crate::transport::Transport;

mod classify;
mod config;
mod error;
use classify::{classify, Classification};
pub use config::{
    Config, DEFAULT_MAX_CNAME_CHAIN, DEFAULT_MAX_REFERRALS, DEFAULT_PORT, DEFAULT_TIMEOUT,
};
pub use error::Error;

////////////////////////////////////////////////////////////////////////
// RESULTS                                                            //
////////////////////////////////////////////////////////////////////////

/// The result of [`Resolver::resolve`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub outcome: Result<Answer, Error>,

    /// The total time spent waiting on nameservers.
    pub latency: Duration,
}

/// A final answer, rendered as text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Answer {
    pub text: String,

    /// Whether the answer came from the [`AnswerCache`].
    pub from_cache: bool,
}

////////////////////////////////////////////////////////////////////////
// RESOLVER                                                           //
////////////////////////////////////////////////////////////////////////

/// An iterative resolver. See the [module-level documentation](self).
pub struct Resolver<T> {
    transport: T,
    referrals: ReferralCache,
    answers: AnswerCache,
    config: Config,
    latencies: Vec<Duration>,
}

impl<T: Transport> Resolver<T> {
    /// Creates a new `Resolver`. The referral cache should already be
    /// seeded with root hints.
    pub fn new(
        transport: T,
        referrals: ReferralCache,
        answers: AnswerCache,
        config: Config,
    ) -> Self {
        Self {
            transport,
            referrals,
            answers,
            config,
            latencies: vec![Duration::ZERO],
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn referrals(&self) -> &ReferralCache {
        &self.referrals
    }

    pub fn answers(&self) -> &AnswerCache {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut AnswerCache {
        &mut self.answers
    }

    /// Resolves `name`/`rr_type`. A cached answer is returned without
    /// any network activity. Otherwise the answer is obtained by an
    /// iterative descent and, unless the descent fails locally, cached.
    pub fn resolve(&mut self, name: &Name, rr_type: Type) -> Resolution {
        self.latencies = vec![Duration::ZERO];
        let outcome = match self.answers.get(name, rr_type) {
            Some(text) => {
                info!("Answer for {} {} found in cache", name, rr_type);
                Ok(Answer {
                    text: text.to_owned(),
                    from_cache: true,
                })
            }
            None => self.descend(name, rr_type, 0).map(|response| {
                let text = response.to_string();
                self.answers.insert(name.clone(), rr_type, text.clone());
                Answer {
                    text,
                    from_cache: false,
                }
            }),
        };
        let latency = self.latencies.iter().sum();
        self.latencies = vec![Duration::ZERO];
        Resolution { outcome, latency }
    }

    /// Runs the iterative descent for `name`/`rr_type` from the deepest
    /// known zone. `chain` is the number of CNAMEs already chased for the
    /// original question.
    fn descend(&mut self, name: &Name, rr_type: Type, chain: usize) -> Result<Message, Error> {
        for hop in 0..self.config.max_referrals {
            let (zone, nameservers) = self.current_referral(name)?;
            if hop == 0 {
                info!("NS records fetched from cache for {}: {}", zone, list(&nameservers));
            } else {
                info!(
                    "Start next iteration with domain {} nameservers {}",
                    zone,
                    list(&nameservers)
                );
            }

            let response = self.query_zone(&zone, &nameservers, name, rr_type)?;
            match classify(&response, &mut self.referrals) {
                Classification::Error | Classification::Answer | Classification::Negative => {
                    return Ok(response)
                }
                Classification::Alias { cname, target } => {
                    return self.chase(cname, &target, chain)
                }
                Classification::Referral => continue,
            }
        }
        warn!("Gave up on {} {} after {} referrals", name, rr_type, self.config.max_referrals);
        Err(Error::TooManyReferrals)
    }

    /// Resolves the target of a CNAME (always for type A) and prepends
    /// the CNAME RRset to the answer.
    fn chase(&mut self, cname: Rrset, target: &Name, chain: usize) -> Result<Message, Error> {
        if chain >= self.config.max_cname_chain {
            warn!("CNAME chain through {} is too long", cname.owner);
            return Err(Error::CnameChainTooLong);
        }
        info!("Chase CNAME {} -> {}", cname.owner, target);
        let mut response = self.descend(target, Type::A, chain + 1)?;
        response.answer.insert(0, cname);
        Ok(response)
    }

    /// Looks up the deepest known zone enclosing `name` and its
    /// nameservers.
    fn current_referral(&self, name: &Name) -> Result<(Name, Vec<Name>), Error> {
        let (zone, entry) = self
            .referrals
            .deepest_match(name)
            .ok_or(Error::NoReferral)?;
        let nameservers = entry
            .get(&Type::NS)
            .into_iter()
            .flatten()
            .filter_map(ReferralValue::as_name)
            .cloned()
            .collect();
        Ok((zone.clone(), nameservers))
    }

    /// Queries the nameservers of `zone` in order until one responds.
    fn query_zone(
        &mut self,
        zone: &Name,
        nameservers: &[Name],
        name: &Name,
        rr_type: Type,
    ) -> Result<Message, Error> {
        let query = Message::query(rand::random(), name.clone(), rr_type, true);
        for nameserver in nameservers {
            let addresses = self.referrals.addresses(nameserver);
            let Some(&address) = addresses.first() else {
                warn!("No address is known for nameserver {}", nameserver);
                return Err(Error::MissingGlue {
                    nameserver: nameserver.clone(),
                });
            };
            info!("Nameserver {} has ip addresses {:?}", nameserver, addresses);
            info!(
                "QUERY name server {} at {} for {} {}",
                nameserver, address, name, rr_type
            );

            let start = Instant::now();
            let result = self.transport.query(
                &query,
                SocketAddr::new(address, self.config.port),
                self.config.timeout,
            );
            let elapsed = start.elapsed();
            self.latencies.push(elapsed);

            match result {
                Ok(response) => {
                    info!("Response received with latency {:?}", elapsed);
                    debug!("Response from {}:\n{}", nameserver, response);
                    return Ok(response);
                }
                Err(err) if err.is_timeout() => {
                    warn!(
                        "Query timed out; error querying nameserver {}; trying next nameserver",
                        nameserver
                    );
                }
                Err(err) => {
                    warn!(
                        "Error querying nameserver {} ({}); trying next nameserver",
                        nameserver, err
                    );
                }
            }
        }
        warn!("SERVFAIL: no nameserver for {} responded", zone);
        Err(Error::NameserversExhausted { zone: zone.clone() })
    }
}

/// Formats a list of names for the trace.
fn list(names: &[Name]) -> String {
    let names: Vec<String> = names.iter().map(Name::to_string).collect();
    format!("[{}]", names.join(", "))
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
